//! Derive macro implementation for envschema

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, PathArguments, Type};

mod attrs;

use attrs::{FieldAttrs, StructAttrs};

/// Extract `T` from `Option<T>`
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    match &seg.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// Type expression for field types that map onto a built-in keyword.
///
/// Fixed-width integers are bounded to their range so out-of-range values
/// are reported with the other validation issues.
fn infer_expression(ty: &Type) -> Option<&'static str> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let ident = type_path.path.segments.last()?.ident.to_string();
    match ident.as_str() {
        "String" => Some("string"),
        "bool" => Some("boolean"),
        "u8" => Some("0 <= number.integer <= 255"),
        "u16" => Some("0 <= number.integer <= 65535"),
        "u32" => Some("0 <= number.integer <= 4294967295"),
        "u64" | "u128" | "usize" => Some("0 <= number.integer"),
        "i8" => Some("-128 <= number.integer <= 127"),
        "i16" => Some("-32768 <= number.integer <= 32767"),
        "i32" => Some("-2147483648 <= number.integer <= 2147483647"),
        "i64" | "i128" | "isize" => Some("number.integer"),
        "f32" | "f64" => Some("number"),
        _ => None,
    }
}

/// `EnvSchema` derive macro
///
/// Implements `envschema::EnvSchema` and adds `from_env()` /
/// `from_snapshot()` constructors.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[env(prefix = "PREFIX_")]`: Read every variable with this prefix
///
/// **Field-level**:
/// - `#[env(name = "CUSTOM_NAME")]`: Variable name (default: field name uppercased)
/// - `#[env(ty = "number.port")]`: Type expression (inferred for `String`,
///   `bool`, integer and float fields; integers are bounded to their type's range)
/// - `#[env(default = "8080")]`: Inline default literal
///
/// `Option<T>` fields declare optional keys.
///
/// # Example
///
/// See the `envschema` crate documentation for usage examples.
#[proc_macro_derive(EnvSchema, attributes(env))]
pub fn derive_env_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let struct_attrs = StructAttrs::from_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvSchema only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvSchema only supports structs",
            ))
        }
    };

    let mut declarations = Vec::with_capacity(fields.len());
    let mut initializers = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let attrs = FieldAttrs::from_field(field)?;
        let inner_type = option_inner_type(field_type);

        if inner_type.is_some() && attrs.default.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "Option<T> fields cannot have a default (they are optional keys)",
            ));
        }

        let key = attrs
            .name
            .unwrap_or_else(|| field_name.to_string().to_uppercase());

        let Some(expression) = attrs
            .ty
            .or_else(|| infer_expression(inner_type.unwrap_or(field_type)).map(String::from))
        else {
            return Err(syn::Error::new_spanned(
                field_type,
                "cannot infer a type expression for this field; add #[env(ty = \"...\")]",
            ));
        };

        let expression = match attrs.default {
            Some(default) => format!("{expression} = {default}"),
            None => expression,
        };
        let declared_key = if inner_type.is_some() {
            format!("{key}?")
        } else {
            key.clone()
        };

        declarations.push(quote! {
            .field(#declared_key, #expression)
        });
        initializers.push(quote! {
            #field_name: ::envschema::de::field::<#field_type>(&record, #key)?
        });
    }

    let prefix = match struct_attrs.prefix {
        Some(prefix) => quote! { ::core::option::Option::Some(#prefix) },
        None => quote! { ::core::option::Option::None },
    };

    Ok(quote! {
        impl #impl_generics ::envschema::EnvSchema for #struct_name #ty_generics #where_clause {
            fn schema() -> ::core::result::Result<::envschema::Schema, ::envschema::DefinitionError> {
                ::envschema::Schema::builder()
                    #(#declarations)*
                    .build()
            }

            fn prefix() -> ::core::option::Option<&'static str> {
                #prefix
            }

            fn from_record(
                record: ::envschema::Record,
            ) -> ::core::result::Result<Self, ::envschema::EnvError> {
                ::core::result::Result::Ok(Self {
                    #(#initializers),*
                })
            }
        }

        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Load configuration from the process environment
            ///
            /// # Errors
            ///
            /// - Variables are missing or fail validation
            /// - The schema cannot be realized
            /// - Validated values cannot be converted into field types
            pub fn from_env() -> ::envschema::anyhow::Result<Self> {
                let env = ::envschema::EnvSnapshot::from_process();
                ::core::result::Result::Ok(
                    <Self as ::envschema::EnvSchema>::load(&env)?,
                )
            }

            /// Load configuration from an environment snapshot
            ///
            /// # Errors
            ///
            /// See `from_env`.
            pub fn from_snapshot(
                env: &::envschema::EnvSnapshot,
            ) -> ::core::result::Result<Self, ::envschema::EnvError> {
                <Self as ::envschema::EnvSchema>::load(env)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_infer_scalar_types() {
        assert_eq!(infer_expression(&parse_quote!(String)), Some("string"));
        assert_eq!(infer_expression(&parse_quote!(bool)), Some("boolean"));
        assert_eq!(infer_expression(&parse_quote!(f64)), Some("number"));
        assert_eq!(infer_expression(&parse_quote!(Vec<String>)), None);
    }

    #[test]
    fn test_infer_integer_ranges() {
        assert_eq!(
            infer_expression(&parse_quote!(u8)),
            Some("0 <= number.integer <= 255")
        );
        assert_eq!(
            infer_expression(&parse_quote!(i16)),
            Some("-32768 <= number.integer <= 32767")
        );
        assert_eq!(infer_expression(&parse_quote!(u64)), Some("0 <= number.integer"));
        assert_eq!(infer_expression(&parse_quote!(i64)), Some("number.integer"));
    }

    #[test]
    fn test_option_inner_type() {
        let ty: Type = parse_quote!(Option<u16>);
        let inner: Type = parse_quote!(u16);
        assert_eq!(option_inner_type(&ty), Some(&inner));
        assert_eq!(option_inner_type(&inner), None);
    }
}
