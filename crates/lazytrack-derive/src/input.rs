use crate::shape::{Classified, classify};
use darling::{Error as DarlingError, FromDeriveInput, FromField, ast};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{DeriveInput, Generics, Ident, Path, Type, Visibility};

///
/// TrackInput
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(track), supports(struct_named))]
struct TrackInput {
    ident: Ident,
    generics: Generics,
    data: ast::Data<(), TrackField>,
}

///
/// TrackField
/// Markers accepted under `#[track(...)]`.
///

#[derive(Debug, FromField)]
#[darling(attributes(track))]
struct TrackField {
    ident: Option<Ident>,
    vis: Visibility,
    ty: Type,

    #[darling(default)]
    status: bool,
    #[darling(default)]
    skip: bool,
    #[darling(default)]
    transient: bool,
    #[darling(default)]
    force: bool,
    #[darling(default)]
    shared: bool,
    #[darling(default)]
    composition: bool,
    #[darling(default)]
    immutable: bool,
    #[darling(default)]
    no_setter: bool,
    #[darling(default)]
    lazy: Option<Path>,
}

///
/// Derived
///
/// Which derive is expanding; `Trackable` requires a status field.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Derived {
    Node,
    Trackable,
}

///
/// NodeDef
///

pub struct NodeDef {
    pub ident: Ident,
    pub generics: Generics,
    pub status: Option<Ident>,
    pub attributes: Vec<AttributeDef>,
}

impl NodeDef {
    pub fn from_derive(input: &DeriveInput, derived: Derived) -> Result<Self, DarlingError> {
        let input = TrackInput::from_derive_input(input)?;
        let fields = input
            .data
            .take_struct()
            .ok_or_else(|| DarlingError::unsupported_shape("enum"))?
            .fields;

        let mut errors = DarlingError::accumulator();
        let mut status = Vec::new();
        let mut attributes = Vec::new();

        for field in fields {
            let Some(ident) = field.ident.clone() else {
                continue;
            };

            if field.status {
                if field.marks_attribute() {
                    errors.push(
                        DarlingError::custom("the status field takes no other markers")
                            .with_span(&ident),
                    );
                }
                status.push(ident);
                continue;
            }

            if let Some(attribute) = errors.handle(AttributeDef::new(ident, field)) {
                attributes.push(attribute);
            }
        }

        match (derived, status.len()) {
            (Derived::Trackable, 1) | (Derived::Node, 0) => {}
            (Derived::Trackable, 0) => errors.push(
                DarlingError::custom(
                    "#[derive(Trackable)] needs exactly one field marked #[track(status)]",
                )
                .with_span(&input.ident),
            ),
            (Derived::Trackable, _) => {
                for extra in &status[1..] {
                    errors.push(
                        DarlingError::custom("only one field may be marked #[track(status)]")
                            .with_span(extra),
                    );
                }
            }
            (Derived::Node, _) => {
                for field in &status {
                    errors.push(
                        DarlingError::custom("#[track(status)] requires #[derive(Trackable)]")
                            .with_span(field),
                    );
                }
            }
        }

        errors.finish()?;

        Ok(Self {
            ident: input.ident,
            generics: input.generics,
            status: status.into_iter().next(),
            attributes,
        })
    }

    /// Model path, as seen from the defining module.
    pub fn path_tokens(&self) -> TokenStream {
        let name = self.ident.to_string();

        quote!(::core::concat!(::core::module_path!(), "::", #name))
    }
}

impl TrackField {
    const fn marks_attribute(&self) -> bool {
        self.skip
            || self.transient
            || self.force
            || self.shared
            || self.composition
            || self.immutable
            || self.no_setter
            || self.lazy.is_some()
    }
}

///
/// AttributeDef
///

pub struct AttributeDef {
    pub ident: Ident,
    pub vis: Visibility,
    pub ty: Type,
    pub class: Classified,
    pub transient: bool,
    pub force: bool,
    pub shared: bool,
    pub no_traverse: bool,
    pub composition: bool,
    pub immutable: bool,
    pub no_setter: bool,
    pub lazy: Option<LazyDef>,
}

///
/// LazyDef
///

pub struct LazyDef {
    pub factory: Path,
    pub value: Type,
}

impl AttributeDef {
    fn new(ident: Ident, field: TrackField) -> Result<Self, DarlingError> {
        let class = classify(&field.ty);

        if field.force && !field.transient {
            return Err(
                DarlingError::custom("#[track(force)] only applies to transient attributes")
                    .with_span(&ident),
            );
        }

        let lazy = match (field.lazy, class.lazy_inner.clone()) {
            (Some(factory), Some(value)) => Some(LazyDef { factory, value }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(DarlingError::custom(
                    "#[track(lazy = \"...\")] requires a field of type `Lazy<T>`",
                )
                .with_span(&ident));
            }
            (None, Some(_)) => {
                return Err(DarlingError::custom(
                    "`Lazy<T>` fields need a supplier factory: #[track(lazy = \"Factory\")]",
                )
                .with_span(&ident));
            }
        };

        Ok(Self {
            ident,
            vis: field.vis,
            ty: field.ty,
            transient: field.transient,
            force: field.force,
            shared: field.shared || class.shared,
            no_traverse: field.skip,
            composition: field.composition,
            immutable: field.immutable || class.immutable,
            no_setter: field.no_setter,
            class,
            lazy,
        })
    }

    /// Mirrors `AttributeModel::is_traversable`.
    pub const fn is_traversable(&self) -> bool {
        if self.transient && !self.force {
            return false;
        }
        if self.shared || self.no_traverse {
            return false;
        }

        !self.immutable
    }

    pub fn name(&self) -> String {
        self.ident.to_string()
    }

    /// `AttributeModel` literal for this attribute.
    pub fn model_tokens(&self) -> TokenStream {
        let name = self.name();
        let shape = self.class.shape.tokens();
        let value = if self.immutable {
            quote!(::lazytrack::model::ValueKind::Immutable)
        } else {
            quote!(::lazytrack::model::ValueKind::Node)
        };
        let (transient, force, shared, no_traverse, composition) = (
            self.transient,
            self.force,
            self.shared,
            self.no_traverse,
            self.composition,
        );
        let lazy = match &self.lazy {
            Some(def) => {
                let shape = self.class.shape.lazy_tokens();
                let factory = path_string(&def.factory);
                quote! {
                    ::core::option::Option::Some(::lazytrack::model::LazyModel {
                        shape: #shape,
                        factory: #factory,
                    })
                }
            }
            None => quote!(::core::option::Option::None),
        };

        quote! {
            ::lazytrack::model::AttributeModel {
                name: #name,
                shape: #shape,
                value: #value,
                modifiers: ::lazytrack::model::Modifiers {
                    transient: #transient,
                    force_trackable: #force,
                    shared: #shared,
                    no_traverse: #no_traverse,
                    composition: #composition,
                },
                lazy: #lazy,
            }
        }
    }
}

/// `a::b::C` without token spacing.
fn path_string(path: &Path) -> String {
    let segments = path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::");

    if path.leading_colon.is_some() {
        format!("::{segments}")
    } else if segments.is_empty() {
        path.to_token_stream().to_string()
    } else {
        segments
    }
}

///
/// TESTS
///
