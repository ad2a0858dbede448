//! Macro for defining strongly-typed identifier newtypes.
//!
//! Identifiers coming from schedule exports are free-form strings; the only
//! invariant enforced here is that they are non-empty after trimming.

/// Define a strongly-typed, non-empty identifier newtype.
///
/// Generates the struct with `Debug, Clone, PartialEq, Eq, Hash, PartialOrd,
/// Ord, Serialize`, a validating `Deserialize`, `new`/`try_new`/`as_str`/
/// `into_inner`, and the `Display`, `AsRef<str>`, `Deref<Target = str>`,
/// `Borrow<str>`, `TryFrom` and `PartialEq<str>` family of impls.
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s)
                    .ok_or_else(|| serde::de::Error::custom(concat!(stringify!($Name), " must not be blank")))
            }
        }

        impl $Name {
            /// Create a new identifier. Blank input is a programming error.
            ///
            /// Prefer [`try_new`](Self::try_new) for untrusted input.
            pub fn new(id: impl Into<String>) -> Self {
                let s = id.into().trim().to_string();
                debug_assert!(!s.is_empty(), concat!(stringify!($Name), " must not be blank"));
                Self(s)
            }

            /// Trim and validate, returning `None` for blank input.
            pub fn try_new(id: impl Into<String>) -> Option<Self> {
                let s = id.into();
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.len() == s.len() {
                    Some(Self(s))
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl TryFrom<String> for $Name {
            type Error = &'static str;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                $Name::try_new(s).ok_or(concat!(stringify!($Name), " must not be blank"))
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = &'static str;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                $Name::try_new(s).ok_or(concat!(stringify!($Name), " must not be blank"))
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }

        impl PartialEq<String> for $Name {
            fn eq(&self, other: &String) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_newtype_string;
