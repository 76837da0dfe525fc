use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields, LitStr, Member, Type, parse_macro_input};

/// Derive the `Component` trait, generating one field descriptor per field.
///
/// Every described field must be `PartialEq + Clone`, and
/// `Serialize + DeserializeOwned` unless it names a custom codec.
///
/// # Named structs
///
/// ```ignore
/// #[derive(Clone, Default, PartialEq, Component)]
/// struct HealthComponent {
///     hp: i32,
///     #[field(tag = "server_only")]
///     regen: Option<f32>,
///     #[field(skip)]
///     cached: Handle,
///     #[field(codec = Degrees)]
///     heading: f32,
/// }
/// ```
///
/// # Tuple structs
///
/// Fields are named by position: `"0"`, `"1"`, ...
///
/// ```ignore
/// #[derive(Clone, Default, PartialEq, Component)]
/// #[component(name = "Name")]
/// struct DisplayName(pub String);
/// ```
///
/// Fields whose name starts with `_` are never described.
#[proc_macro_derive(Component, attributes(component, field))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_component(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_component(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = component_name(input)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Component can only be derived for structs",
            ));
        }
    };

    let members: Vec<(Member, String, &syn::Field)> = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| {
                let ident = f.ident.clone()?;
                let fname = ident.to_string();
                Some((Member::Named(ident), fname, f))
            })
            .filter(|(_, fname, _)| !fname.starts_with('_'))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (Member::Unnamed(syn::Index::from(i)), i.to_string(), f))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    let mut descriptors = Vec::with_capacity(members.len());
    for (member, fname, field) in &members {
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip {
            continue;
        }
        descriptors.push(field_descriptor(member, fname, &field.ty, &attrs));
    }

    Ok(quote! {
        impl #impl_generics ::ecs_persist::Component for #name #ty_generics #where_clause {
            const NAME: &'static str = #name_str;

            fn field_descriptors() -> ::std::vec::Vec<::ecs_persist::FieldDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }
    })
}

fn field_descriptor(
    member: &Member,
    fname: &str,
    ty: &Type,
    attrs: &FieldAttrs,
) -> proc_macro2::TokenStream {
    let get = quote! { |c: &Self| &c.#member };
    let get_mut = quote! { |c: &mut Self| &mut c.#member };

    let descriptor = match &attrs.codec {
        Some(codec) => quote! {
            ::ecs_persist::FieldDescriptor::with_codec::<Self, #ty, _>(#fname, #get, #get_mut, #codec)
        },
        None => quote! {
            ::ecs_persist::FieldDescriptor::new::<Self, #ty>(#fname, #get, #get_mut)
        },
    };

    if attrs.tags.is_empty() {
        descriptor
    } else {
        let tags = &attrs.tags;
        quote! { #descriptor.with_tags(&[#(#tags),*]) }
    }
}

/// `#[component(name = "...")]` or the struct's identifier.
fn component_name(input: &DeriveInput) -> syn::Result<String> {
    let mut name = input.ident.to_string();
    for attr in &input.attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("component name must not be empty"));
                }
                name = value.value();
                Ok(())
            } else {
                Err(meta.error("unsupported component attribute, expected `name`"))
            }
        })?;
    }
    Ok(name)
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    tags: Vec<LitStr>,
    codec: Option<Expr>,
}

impl FieldAttrs {
    fn parse(field: &syn::Field) -> syn::Result<Self> {
        let mut attrs = Self::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("field") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else if meta.path.is_ident("tag") {
                    attrs.tags.push(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("codec") {
                    if attrs.codec.is_some() {
                        return Err(meta.error("duplicate `codec`"));
                    }
                    attrs.codec = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported field attribute, expected `skip`, `tag` or `codec`"))
                }
            })?;
        }
        Ok(attrs)
    }
}
