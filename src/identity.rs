//! Stable node template identities.
//!
//! Two instances of the same template anywhere in a corpus share one
//! [`NodeIdentity`]. Equality and hashing are by signature content; the md5
//! digest of the signature serves as a fixed-size key for fast comparison.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Fixed-size key derived from a signature string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey([u8; 16]);

impl NodeKey {
    /// Derive the key for a signature.
    pub fn from_signature(signature: &str) -> Self {
        Self(md5::compute(signature.as_bytes()).0)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Identity of a node template.
///
/// Cheap to clone: the signature is shared behind an `Arc`.
#[derive(Clone)]
pub struct NodeIdentity {
    signature: Arc<str>,
    key: NodeKey,
}

impl NodeIdentity {
    pub fn new(signature: impl AsRef<str>) -> Self {
        let signature = signature.as_ref();
        Self {
            key: NodeKey::from_signature(signature),
            signature: Arc::from(signature),
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }
}

impl PartialEq for NodeIdentity {
    fn eq(&self, other: &Self) -> bool {
        // keys differ => signatures differ
        self.key == other.key && self.signature == other.signature
    }
}

impl Eq for NodeIdentity {}

impl Hash for NodeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for NodeIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.signature.cmp(&other.signature)
    }
}

impl fmt::Debug for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeIdentity").field(&&*self.signature).finish()
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}

impl Serialize for NodeIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.signature)
    }
}

impl<'de> Deserialize<'de> for NodeIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(NodeIdentity::new)
    }
}

impl From<&str> for NodeIdentity {
    fn from(signature: &str) -> Self {
        Self::new(signature)
    }
}

impl From<String> for NodeIdentity {
    fn from(signature: String) -> Self {
        Self::new(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_equality_by_signature() {
        let a = NodeIdentity::new("Add(int,int)");
        let b = NodeIdentity::new(String::from("Add(int,int)"));
        let c = NodeIdentity::new("Add(float,float)");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_identity_hashes_consistently() {
        let mut set = HashSet::new();
        set.insert(NodeIdentity::new("Print"));
        set.insert(NodeIdentity::new("Print"));
        set.insert(NodeIdentity::new("Branch"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_identity_serializes_as_signature() {
        let id = NodeIdentity::new("Branch");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""Branch""#);
        let back: NodeIdentity = serde_json::from_str(r#""Branch""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_key_display_is_hex() {
        let key = NodeKey::from_signature("");
        // md5 of the empty string
        assert_eq!(key.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
