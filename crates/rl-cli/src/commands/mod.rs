//! CLI command implementations

pub(crate) mod anomalies;
pub(crate) mod common;
pub(crate) mod forecast;
pub(crate) mod hash;
pub(crate) mod mitigate;
pub(crate) mod risks;
pub(crate) mod twin;
