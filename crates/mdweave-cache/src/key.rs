//! Content addressing.

use std::fmt;

use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of some content.
///
/// Identical bytes always produce the same key; the key is the artifact's
/// file stem inside its bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(String);

impl ContentKey {
    /// Hash `content`.
    #[must_use]
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(Sha1::digest(content.as_ref())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
