//! Integer identifiers. Zero is the "not supplied" value for every id type.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// True when the id is the default value, i.e. the caller supplied none.
            pub const fn is_unset(&self) -> bool {
                self.0 == 0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identity of a book record.
    BookId
);
entity_id!(
    /// Identity of a reader record.
    ReaderId
);
entity_id!(
    /// Identity of a library administrator.
    AdminId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_unset() {
        assert!(BookId::default().is_unset());
        assert!(!ReaderId(4).is_unset());
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&BookId(12)).unwrap(), "12");
        let id: ReaderId = serde_json::from_str("5").unwrap();
        assert_eq!(id, ReaderId(5));
    }
}
