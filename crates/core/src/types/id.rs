//! Newtype ids for type-safe entity references.
//!
//! Document ids in the backing store are opaque, server-minted strings, so
//! the wrappers hold a `String` rather than an integer key. Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing
//! ids from different entity types.

/// Macro to define a type-safe id wrapper over an opaque string.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, `Into<String>` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use saffron_lane_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("64f1c2d9a7b3");
/// let order_id = OrderId::new("64f1c2d9a7b3");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity ids
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(AddressId);
define_id!(BannerId);
define_id!(AnnouncementId);

impl AddressId {
    /// Mint a fresh address id.
    ///
    /// Address ids are generated locally at insertion time (unlike document
    /// ids, which the store mints) and are never reused within a user's
    /// address list.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = OrderId::new("ord_123");
        assert_eq!(id.as_str(), "ord_123");
        assert_eq!(id.to_string(), "ord_123");
        assert_eq!(String::from(id), "ord_123");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::new("prod_9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"prod_9\"");

        let parsed: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_generated_address_ids_are_unique() {
        let a = AddressId::generate();
        let b = AddressId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }
}
