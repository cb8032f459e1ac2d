//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain JSON string
/// - `Deserialize` from either a JSON string or a JSON integer (the catalog
///   backend is not consistent about which one it sends)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use curator_core::define_id;
/// define_id!(SkuId);
///
/// let from_text = SkuId::new("42");
/// let from_json: SkuId = serde_json::from_str("42").unwrap();
/// assert_eq!(from_text, from_json);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                #[derive(::serde::Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Text(String),
                    Number(i64),
                }

                match <Raw as ::serde::Deserialize>::deserialize(deserializer)? {
                    Raw::Text(text) => Ok(Self(text)),
                    Raw::Number(number) => Ok(Self(number.to_string())),
                }
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_accepts_string_and_number() {
        let text: ProductId = serde_json::from_str("\"abc-1\"").unwrap();
        let number: ProductId = serde_json::from_str("17").unwrap();

        assert_eq!(text.as_str(), "abc-1");
        assert_eq!(number, ProductId::new("17"));
    }

    #[test]
    fn test_product_id_serializes_as_string() {
        let id = ProductId::new("17");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"17\"");
        assert_eq!(id.to_string(), "17");
    }
}
