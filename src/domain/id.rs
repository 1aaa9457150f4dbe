//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// On-chain address of an asset (underlying token).
///
/// Addresses are compared case-insensitively, so the inner string is
/// normalized to lowercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AssetAddress(String);

impl AssetAddress {
    /// Address of the network's native currency.
    pub const NATIVE: &'static str = "0x0000000000000000000000000000000000000000";

    /// Create a new `AssetAddress`, normalizing to lowercase.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().to_ascii_lowercase())
    }

    /// The native-currency address.
    #[must_use]
    pub fn native() -> Self {
        Self::new(Self::NATIVE)
    }

    /// Get the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AssetAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AssetAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<AssetAddress> for String {
    fn from(address: AssetAddress) -> Self {
        address.0
    }
}

/// Lending pool identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolId(String);

impl PoolId {
    /// Create a new `PoolId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the pool ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PoolId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PoolId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Name of an external service with its own rate rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceName(String);

impl ServiceName {
    /// Create a new `ServiceName`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the service name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ServiceName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for a dispatched request.
///
/// Generated as UUID v4 for new requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Create a new `RequestId` with a generated UUID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
