use thiserror::Error;

/// An integer that does not name any member of the target enumeration.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("Unknown {kind} tag: {tag}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub tag: u8,
}

/// Declares an enumeration whose members carry explicit, stable integer tags.
///
/// The generated type orders by tag, converts to and from `u8`, and
/// serializes as its tag so that values survive process and version
/// boundaries. Members may only ever be appended.
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $tag:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(try_from = "u8", into = "u8")]
        #[repr(u8)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $tag,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn tag(self) -> u8 {
                self as u8
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = $crate::tagged::UnknownTag;

            fn try_from(tag: u8) -> Result<Self, Self::Error> {
                match tag {
                    $($tag => Ok($name::$variant),)+
                    _ => Err($crate::tagged::UnknownTag {
                        kind: stringify!($name),
                        tag,
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}

pub(crate) use tagged_enum;
