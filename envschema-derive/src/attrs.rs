//! Attribute parsing for `#[env(...)]` annotations.

use syn::{Attribute, Field, LitStr};

/// Parsed `#[env(...)]` attributes from the struct itself.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Prefix prepended to every variable name when reading.
    pub prefix: Option<String>,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("env")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("prefix") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.prefix = Some(lit.value());
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level env attribute"))
            })?;
        }

        Ok(parsed)
    }
}

/// Parsed `#[env(...)]` attributes from a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Variable name override.
    ///
    /// If `None`, the field name is uppercased.
    pub name: Option<String>,

    /// Type expression; inferred from the field type when absent.
    pub ty: Option<String>,

    /// Inline default literal, appended to the expression as `= <default>`.
    pub default: Option<String>,
}

impl FieldAttrs {
    /// Extract `#[env(...)]` attributes from a struct field.
    ///
    /// Attributes with other paths are left for other macros.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("env")) {
            attr.parse_nested_meta(|meta| {
                let slot = if meta.path.is_ident("name") {
                    &mut attrs.name
                } else if meta.path.is_ident("ty") {
                    &mut attrs.ty
                } else if meta.path.is_ident("default") {
                    &mut attrs.default
                } else {
                    return Err(meta.error("unsupported env attribute"));
                };

                let lit: LitStr = meta.value()?.parse()?;
                *slot = Some(lit.value());
                Ok(())
            })?;
        }

        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput};

    #[test]
    fn test_parse_name_attribute() {
        let field: Field = parse_quote! {
            #[env(name = "CUSTOM_NAME")]
            pub field_name: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.name, Some("CUSTOM_NAME".to_string()));
        assert_eq!(attrs.ty, None);
    }

    #[test]
    fn test_parse_multiple_attributes() {
        let field: Field = parse_quote! {
            #[env(name = "DB_PORT", ty = "number.port", default = "5432")]
            pub port: u16
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.name, Some("DB_PORT".to_string()));
        assert_eq!(attrs.ty, Some("number.port".to_string()));
        assert_eq!(attrs.default, Some("5432".to_string()));
    }

    #[test]
    fn test_parse_split_attributes() {
        let field: Field = parse_quote! {
            #[env(ty = "'dev' | 'prod'")]
            #[env(default = "'dev'")]
            pub mode: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.ty, Some("'dev' | 'prod'".to_string()));
        assert_eq!(attrs.default, Some("'dev'".to_string()));
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let field: Field = parse_quote! {
            #[serde(rename = "x")]
            pub field_name: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.name.is_none());
    }

    #[test]
    fn test_unknown_attribute_is_error() {
        let field: Field = parse_quote! {
            #[env(from_file)]
            pub field_name: String
        };

        assert!(FieldAttrs::from_field(&field).is_err());
    }

    #[test]
    fn test_non_string_value_is_error() {
        let field: Field = parse_quote! {
            #[env(default = 42)]
            pub field_name: i32
        };

        assert!(FieldAttrs::from_field(&field).is_err());
    }

    #[test]
    fn test_parse_prefix() {
        let input: DeriveInput = parse_quote! {
            #[env(prefix = "APP_")]
            struct Config {
                port: u16,
            }
        };

        let attrs = StructAttrs::from_attrs(&input.attrs).unwrap();
        assert_eq!(attrs.prefix, Some("APP_".to_string()));
    }
}
