//! Newtype IDs for type-safe entity references.
//!
//! The backend treats ids as opaque values. Some endpoints return them as
//! strings and others as numbers, so every id type accepts both on the wire
//! and stores the canonical string form.

use serde::Deserialize;

/// Wire representation of an id before normalization.
#[derive(Deserialize)]
#[serde(untagged)]
#[doc(hidden)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string, `Deserialize` from a string or an integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use atelier_core::define_id;
/// define_id!(InvoiceId);
/// define_id!(ClientId);
///
/// let invoice = InvoiceId::new("inv_1");
/// let client = ClientId::new("inv_1");
///
/// // These are different types, so this won't compile:
/// // let _: InvoiceId = client;
/// # let _ = (invoice, client);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(deserializer)
                    .map(Self::from)
            }
        }

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the id as a string slice (for building request paths).
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

        impl From<$crate::types::id::RawId> for $name {
            fn from(raw: $crate::types::id::RawId) -> Self {
                Self(raw.into())
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ProjectId);
define_id!(BlogPostId);
define_id!(CategoryId);
define_id!(TagId);
define_id!(ActivityLogId);
