use sha2::{Digest, Sha256};

use crate::event::EventKind;

/// Derives partition keys for events published without an explicit key.
///
/// The key is `{kind name}-{bucket}`, where the bucket is a SHA-256 over the
/// serialized payload reduced modulo the bucket count. Events of one kind
/// spread over at most `buckets` keys, and the same payload always maps to
/// the same key, across restarts and implementations.
///
/// This is best-effort co-location. It gives no ordering guarantee between
/// different events of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionKeys {
    buckets: u32,
}

impl PartitionKeys {
    pub fn new(buckets: u32) -> Self {
        Self {
            buckets: buckets.max(1),
        }
    }

    pub fn buckets(&self) -> u32 {
        self.buckets
    }

    /// Bucket in `0..buckets` for a serialized payload.
    pub fn bucket(&self, payload: &[u8]) -> u32 {
        let digest = Sha256::digest(payload);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let bucket = u64::from_be_bytes(prefix) % u64::from(self.buckets);
        // bucket < self.buckets, which is a u32
        bucket as u32
    }

    pub fn derive(&self, kind: EventKind, payload: &[u8]) -> String {
        format!("{}-{}", kind.name(), self.bucket(payload))
    }
}

impl Default for PartitionKeys {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PARTITION_BUCKETS)
    }
}
