//! Owner address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The address that owns one or more stakes.
///
/// Opaque to the engine — it is never parsed or derived, only compared.
/// Settlement rails and key derivation live entirely outside this core.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerAddress(String);

impl OwnerAddress {
    /// Create an owner address from a raw string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OwnerAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OwnerAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
