//! Newtype wrappers around allocated `i64` ids for all domain entities.
//!
//! Using distinct types prevents accidentally passing a `UserId` where a
//! `MenuId` is expected. Ids serialize to JSON as decimal strings so that
//! browser clients never lose precision above 2^53, and accept either a
//! string or a number on input. When the `sqlx` feature is enabled, each
//! id type maps to PostgreSQL `BIGINT`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::DistributedId;

/// Common surface of every entity id.
pub trait EntityId:
    Copy + Eq + std::hash::Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Wrap a raw integer.
    fn from_raw(raw: i64) -> Self;

    /// Return the raw integer.
    fn raw(self) -> i64;
}

/// Macro to define a newtype ID wrapper around `i64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub i64);

        impl $name {
            /// Return the inner integer value.
            pub fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl EntityId for $name {
            fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            fn raw(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl From<DistributedId> for $name {
            fn from(id: DistributedId) -> Self {
                Self(id.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(LenientI64Visitor).map(Self)
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::postgres::PgHasArrayType for $name {
            fn array_type_info() -> sqlx::postgres::PgTypeInfo {
                <i64 as sqlx::postgres::PgHasArrayType>::array_type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

/// Accepts `123`, `"123"`, and unsigned values that fit in `i64`.
struct LenientI64Visitor;

impl Visitor<'_> for LenientI64Visitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer id or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("id {v} out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        v.trim()
            .parse::<i64>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

define_id!(
    /// Unique identifier for a user.
    UserId
);

define_id!(
    /// Unique identifier for a role.
    RoleId
);

define_id!(
    /// Unique identifier for a menu or button node.
    MenuId
);

define_id!(
    /// Unique identifier for an organization node.
    OrganizationId
);

define_id!(
    /// Unique identifier for a dictionary type.
    DictTypeId
);

define_id!(
    /// Unique identifier for a dictionary item.
    DictItemId
);

define_id!(
    /// Unique identifier for an access log entry.
    AccessLogId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_string() {
        let id = UserId(1_234_567_890_123_456_789);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1234567890123456789\"");
    }

    #[test]
    fn test_deserializes_from_string_or_number() {
        let a: MenuId = serde_json::from_str("\"42\"").unwrap();
        let b: MenuId = serde_json::from_str("42").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<MenuId>("\"abc\"").is_err());
    }

    #[test]
    fn test_optional_id_field() {
        #[derive(Deserialize)]
        struct Body {
            parent_id: Option<OrganizationId>,
        }
        let body: Body = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert!(body.parent_id.is_none());
        let body: Body = serde_json::from_str(r#"{"parent_id": "7"}"#).unwrap();
        assert_eq!(body.parent_id, Some(OrganizationId(7)));
    }

    #[test]
    fn test_from_str_and_display() {
        let id: RoleId = " 99 ".parse().unwrap();
        assert_eq!(id.to_string(), "99");
        assert_eq!(RoleId::from_raw(99).raw(), 99);
    }
}
