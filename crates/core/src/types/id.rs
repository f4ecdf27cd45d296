//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
/// - `Display` so ids interpolate directly into request paths
///
/// # Example
///
/// ```rust
/// # use babynest_core::define_id;
/// define_id!(BabyId);
/// define_id!(VaccineId);
///
/// let baby = BabyId::new(7);
/// assert_eq!(format!("/babies/{baby}"), "/babies/7");
///
/// // These are different types, so this won't compile:
/// // let _: BabyId = VaccineId::new(7);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Entity IDs issued by the marketplace API
define_id!(UserId);
define_id!(AddressId);
define_id!(BabyId);
define_id!(VaccineId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CategoryId);
define_id!(BrandId);
define_id!(HospitalId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = BabyId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: BabyId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_display_and_conversion() {
        let id = VaccineId::from(9);
        assert_eq!(id.to_string(), "9");
        assert_eq!(i64::from(id), 9);
        assert_eq!(id.as_i64(), 9);
    }
}
