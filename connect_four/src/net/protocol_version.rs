//! Protocol versioning for client compatibility checks.

use serde::{Deserialize, Serialize};

/// Version of the JSON message protocol, announced in the welcome message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// V1: drops, snapshots and outcome broadcasts
    V1,
    /// V2: adds seat management and rematches over the socket
    V2,
}

impl ProtocolVersion {
    /// Get the current protocol version
    pub fn current() -> Self {
        ProtocolVersion::V2
    }

    /// A server speaks every version up to its own
    pub fn is_compatible_with(&self, other: &ProtocolVersion) -> bool {
        other <= self
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_version() {
        assert_eq!(ProtocolVersion::current(), ProtocolVersion::V2);
    }

    #[test]
    fn test_compatibility() {
        assert!(ProtocolVersion::V2.is_compatible_with(&ProtocolVersion::V1));
        assert!(ProtocolVersion::V2.is_compatible_with(&ProtocolVersion::V2));
        assert!(!ProtocolVersion::V1.is_compatible_with(&ProtocolVersion::V2));
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&ProtocolVersion::V1).unwrap(), "\"v1\"");
        let parsed: ProtocolVersion = serde_json::from_str("\"v2\"").unwrap();
        assert_eq!(parsed, ProtocolVersion::V2);
    }
}
