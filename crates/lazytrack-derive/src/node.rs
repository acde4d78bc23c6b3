use crate::{
    input::{Derived, NodeDef},
    util::where_clause_with_bounds,
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericParam};

// derive_node
pub fn derive_node(input: TokenStream) -> TokenStream {
    expand(input, Derived::Node)
}

// derive_trackable
pub fn derive_trackable(input: TokenStream) -> TokenStream {
    expand(input, Derived::Trackable)
}

fn expand(input: TokenStream, derived: Derived) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let def = match NodeDef::from_derive(&input, derived) {
        Ok(def) => def,
        Err(err) => return err.write_errors(),
    };

    let node = node_impl(&def);
    let slot = slot_impl(&def);
    let accessors = accessors_impl(&def);
    let trackable = match (derived, &def.status) {
        (Derived::Trackable, Some(status)) => crate::trackable::trackable_impl(&def, status),
        _ => quote!(),
    };

    quote! {
        #node
        #slot
        #accessors
        #trackable
    }
}

/// Every type parameter must itself be walkable.
pub fn where_tokens(def: &NodeDef) -> TokenStream {
    let bounds = def
        .generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(ty) => {
                let ident = &ty.ident;
                Some(quote!(#ident: ::lazytrack::traits::Node + ::lazytrack::walk::AttributeSlot))
            }
            _ => None,
        })
        .collect::<Vec<_>>();

    where_clause_with_bounds(def.generics.where_clause.as_ref(), &bounds)
}

fn node_impl(def: &NodeDef) -> TokenStream {
    let ident = &def.ident;
    let (impl_generics, ty_generics, _) = def.generics.split_for_impl();
    let where_clause = where_tokens(def);
    let path = def.path_tokens();

    let models = def.attributes.iter().map(|attribute| attribute.model_tokens());
    let count = def.attributes.len();

    let children_arms = def.attributes.iter().enumerate().map(|(index, attribute)| {
        let field = &attribute.ident;
        if attribute.is_traversable() {
            quote!(#index => ::core::option::Option::Some(::lazytrack::walk::AttributeSlot::slot(&self.#field)),)
        } else {
            quote!(#index => ::core::option::Option::Some(::lazytrack::walk::Children::Absent),)
        }
    });
    let children_mut_arms = def.attributes.iter().enumerate().map(|(index, attribute)| {
        let field = &attribute.ident;
        if attribute.is_traversable() {
            quote!(#index => ::core::option::Option::Some(::lazytrack::walk::AttributeSlot::slot_mut(&mut self.#field)),)
        } else {
            quote!(#index => ::core::option::Option::Some(::lazytrack::walk::ChildrenMut::Absent),)
        }
    });
    let remember = def
        .attributes
        .iter()
        .filter(|attribute| attribute.is_traversable())
        .map(|attribute| {
            let field = &attribute.ident;
            quote!(::lazytrack::walk::AttributeSlot::remember_flags(&mut self.#field, flags);)
        });

    let capability = if def.status.is_some() {
        quote! {
            fn as_trackable(&self) -> ::core::option::Option<&(dyn ::lazytrack::traits::Trackable + 'static)> {
                ::core::option::Option::Some(self)
            }

            fn as_trackable_mut(&mut self) -> ::core::option::Option<&mut (dyn ::lazytrack::traits::Trackable + 'static)> {
                ::core::option::Option::Some(self)
            }
        }
    } else {
        quote!()
    };

    quote! {
        impl #impl_generics ::lazytrack::traits::Node for #ident #ty_generics #where_clause {
            fn model(&self) -> &'static ::lazytrack::model::NodeModel {
                static ATTRIBUTES: [::lazytrack::model::AttributeModel; #count] = [#(#models),*];
                static MODEL: ::lazytrack::model::NodeModel = ::lazytrack::model::NodeModel {
                    path: #path,
                    attributes: &ATTRIBUTES,
                };

                &MODEL
            }

            #[allow(clippy::match_same_arms)]
            fn children(&self, index: usize) -> ::core::option::Option<::lazytrack::walk::Children<'_>> {
                match index {
                    #(#children_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(clippy::match_same_arms)]
            fn children_mut(&mut self, index: usize) -> ::core::option::Option<::lazytrack::walk::ChildrenMut<'_>> {
                match index {
                    #(#children_mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #capability

            #[allow(unused_variables)]
            fn remember_container_flags(&mut self, flags: ::lazytrack::status::TrackingFlags) {
                #(#remember)*
            }
        }
    }
}

fn slot_impl(def: &NodeDef) -> TokenStream {
    let ident = &def.ident;
    let (impl_generics, ty_generics, _) = def.generics.split_for_impl();
    let where_clause = where_tokens(def);

    quote! {
        impl #impl_generics ::lazytrack::walk::AttributeSlot for #ident #ty_generics #where_clause {
            fn slot(&self) -> ::lazytrack::walk::Children<'_> {
                ::lazytrack::walk::Children::Single(self)
            }

            fn slot_mut(&mut self) -> ::lazytrack::walk::ChildrenMut<'_> {
                ::lazytrack::walk::ChildrenMut::Single(self)
            }
        }
    }
}

/// One resolving accessor per lazy attribute, named after the field.
fn accessors_impl(def: &NodeDef) -> TokenStream {
    let ident = &def.ident;
    let (impl_generics, ty_generics, _) = def.generics.split_for_impl();
    let where_clause = where_tokens(def);

    let accessors = def
        .attributes
        .iter()
        .enumerate()
        .filter_map(|(index, attribute)| {
            let lazy = attribute.lazy.as_ref()?;
            let field = &attribute.ident;
            let vis = &attribute.vis;
            let factory = &lazy.factory;
            let value = &lazy.value;
            let doc = format!(" Resolve the lazy attribute `{field}` on first access.");

            Some(quote! {
                #[doc = #doc]
                #vis fn #field(
                    &mut self,
                ) -> ::core::result::Result<::core::option::Option<&mut #value>, ::lazytrack::error::TrackError> {
                    ::lazytrack::lazy::resolve::<Self, #factory, #value>(self, #index, |owner| &mut owner.#field)
                }
            })
        })
        .collect::<Vec<_>>();

    if accessors.is_empty() {
        return quote!();
    }

    quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#accessors)*
        }
    }
}
