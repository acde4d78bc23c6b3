use crate::{input::NodeDef, node::where_tokens};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

/// `Trackable` impl plus one recorded setter per settable attribute.
pub fn trackable_impl(def: &NodeDef, status: &Ident) -> TokenStream {
    let ident = &def.ident;
    let (impl_generics, ty_generics, _) = def.generics.split_for_impl();
    let where_clause = where_tokens(def);

    let setters = def
        .attributes
        .iter()
        .filter(|attribute| !attribute.no_setter && attribute.lazy.is_none())
        .map(|attribute| {
            let field = &attribute.ident;
            let vis = &attribute.vis;
            let ty = &attribute.ty;
            let setter = format_ident!("set_{}", field);

            quote! {
                #vis fn #setter(&mut self, value: #ty) -> &mut Self {
                    self.#status.record_write(&self.#field, &value);
                    self.#field = value;

                    self
                }
            }
        })
        .collect::<Vec<_>>();

    let setters = if setters.is_empty() {
        quote!()
    } else {
        quote! {
            impl #impl_generics #ident #ty_generics #where_clause {
                #(#setters)*
            }
        }
    };

    quote! {
        impl #impl_generics ::lazytrack::traits::Trackable for #ident #ty_generics #where_clause {
            fn tracking_status(&self) -> &::lazytrack::status::TrackingStatus {
                &self.#status
            }

            fn tracking_status_mut(&mut self) -> &mut ::lazytrack::status::TrackingStatus {
                &mut self.#status
            }

            fn wrapped_object(&self) -> &dyn ::core::any::Any {
                self
            }
        }

        #setters
    }
}
