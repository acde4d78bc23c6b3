use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type, TypePath};

///
/// ShapeKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShapeKind {
    Single,
    KeyedMapping,
    OrderedCollection,
    FixedArray,
}

impl ShapeKind {
    pub fn tokens(self) -> TokenStream {
        match self {
            Self::Single => quote!(::lazytrack::model::Shape::Single),
            Self::KeyedMapping => quote!(::lazytrack::model::Shape::KeyedMapping),
            Self::OrderedCollection => quote!(::lazytrack::model::Shape::OrderedCollection),
            Self::FixedArray => quote!(::lazytrack::model::Shape::FixedArray),
        }
    }

    /// Supplier shape a lazy attribute of this shape expects.
    pub fn lazy_tokens(self) -> TokenStream {
        match self {
            Self::KeyedMapping => quote!(::lazytrack::model::LazyShape::KeyedMapping),
            _ => quote!(::lazytrack::model::LazyShape::Single),
        }
    }
}

///
/// Classified
///
/// What a field's declared type says about the attribute, before markers
/// are applied.
///

#[derive(Clone, Debug)]
pub struct Classified {
    pub shape: ShapeKind,
    pub immutable: bool,
    pub shared: bool,
    /// Value type of a `Lazy<T>` slot.
    pub lazy_inner: Option<Type>,
}

impl Classified {
    const fn node(shape: ShapeKind) -> Self {
        Self {
            shape,
            immutable: false,
            shared: false,
            lazy_inner: None,
        }
    }

    const fn immutable() -> Self {
        Self {
            shape: ShapeKind::Single,
            immutable: true,
            shared: false,
            lazy_inner: None,
        }
    }

    const fn shared() -> Self {
        Self {
            shape: ShapeKind::Single,
            immutable: true,
            shared: true,
            lazy_inner: None,
        }
    }

    fn container(shape: ShapeKind, element: &Self) -> Self {
        Self {
            shape,
            immutable: element.immutable,
            shared: false,
            lazy_inner: None,
        }
    }
}

const PRIMITIVES: &[&str] = &[
    "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64", "String", "str", "Duration", "PathBuf",
];

const SETS: &[&str] = &["BTreeSet", "HashSet"];
const SHARED: &[&str] = &["Rc", "Arc", "Weak"];
const TRANSPARENT: &[&str] = &["Option", "Box"];
const ORDERED: &[&str] = &["Vec", "VecDeque", "LazyList"];
const KEYED: &[&str] = &["BTreeMap", "HashMap", "LazyMap"];

/// Classify a field type by its outermost path segments.
pub fn classify(ty: &Type) -> Classified {
    match ty {
        Type::Reference(_) => Classified::shared(),
        Type::Array(array) => Classified::container(ShapeKind::FixedArray, &classify(&array.elem)),
        Type::Paren(paren) => classify(&paren.elem),
        Type::Group(group) => classify(&group.elem),
        Type::Path(path) => classify_path(path),
        _ => Classified::immutable(),
    }
}

fn classify_path(path: &TypePath) -> Classified {
    let Some(segment) = path.path.segments.last() else {
        return Classified::immutable();
    };
    let name = segment.ident.to_string();
    let name = name.as_str();
    let args = generic_types(&segment.arguments);

    if PRIMITIVES.contains(&name) || SETS.contains(&name) {
        return Classified::immutable();
    }
    if SHARED.contains(&name) {
        return Classified::shared();
    }

    match (name, args.as_slice()) {
        ("Lazy", [inner]) => Classified {
            lazy_inner: Some((*inner).clone()),
            ..classify(inner)
        },
        (name, [inner]) if TRANSPARENT.contains(&name) => Classified {
            lazy_inner: None,
            ..classify(inner)
        },
        (name, [element]) if ORDERED.contains(&name) => {
            Classified::container(ShapeKind::OrderedCollection, &classify(element))
        }
        (name, [_, value, ..]) if KEYED.contains(&name) => {
            Classified::container(ShapeKind::KeyedMapping, &classify(value))
        }
        _ => Classified::node(ShapeKind::Single),
    }
}

fn generic_types(arguments: &PathArguments) -> Vec<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return Vec::new();
    };

    args.args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn of(ty: Type) -> Classified {
        classify(&ty)
    }

    #[test]
    fn primitives_sets_and_tuples_are_immutable() {
        assert!(of(parse_quote!(u64)).immutable);
        assert!(of(parse_quote!(String)).immutable);
        assert!(of(parse_quote!(std::collections::BTreeSet<u32>)).immutable);
        assert!(of(parse_quote!((u32, String))).immutable);
        assert!(of(parse_quote!(Vec<String>)).immutable);
    }

    #[test]
    fn containers_resolve_to_their_shape() {
        let lines = of(parse_quote!(Vec<Line>));
        assert_eq!(lines.shape, ShapeKind::OrderedCollection);
        assert!(!lines.immutable);

        assert_eq!(
            of(parse_quote!(BTreeMap<String, Line>)).shape,
            ShapeKind::KeyedMapping
        );
        assert_eq!(of(parse_quote!([Line; 3])).shape, ShapeKind::FixedArray);
        assert_eq!(
            of(parse_quote!(Option<Box<Vec<Line>>>)).shape,
            ShapeKind::OrderedCollection
        );
    }

    #[test]
    fn references_and_shared_pointers_are_never_traversed() {
        let reference = of(parse_quote!(&'static Customer));
        assert!(reference.shared && reference.immutable);

        assert!(of(parse_quote!(Rc<Customer>)).shared);
        assert!(of(parse_quote!(std::sync::Arc<Customer>)).shared);
    }

    #[test]
    fn lazy_slots_expose_their_value_type() {
        let lazy = of(parse_quote!(Lazy<LazyList<Line>>));

        assert_eq!(lazy.shape, ShapeKind::OrderedCollection);
        assert!(lazy.lazy_inner.is_some());
        assert_eq!(
            lazy.shape.lazy_tokens().to_string(),
            quote!(::lazytrack::model::LazyShape::Single).to_string()
        );
    }
}
