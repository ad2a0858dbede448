//! Strongly-typed activity identifier.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// A non-empty activity identifier, unique within a project.
    pub struct ActivityId;
}
