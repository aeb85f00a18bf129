//! Append-only notification log.
//!
//! Each record carries a SHA-256 digest chained over the previous record:
//!
//! ```text
//! digest[n] = SHA256(domain || digest[n-1] || seq || json(notification))
//! ```
//!
//! with `digest[-1]` all zeros. A consumer holding the latest digest can
//! detect any rewrite of earlier entries.

use rosca_types::{Notification, Result, RoscaError, constants::NOTIFICATION_DIGEST_DOMAIN};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A notification with its position and chained digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub seq: u64,
    pub notification: Notification,
    pub digest: [u8; 32],
}

impl NotificationRecord {
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

#[derive(Debug, Default)]
pub struct NotificationLog {
    records: Vec<NotificationRecord>,
}

impl NotificationLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a notification and return its sequence number.
    pub fn append(&mut self, notification: Notification) -> Result<u64> {
        let seq = self.records.len() as u64;
        let digest = chain_digest(&self.head(), seq, &notification)?;
        let record = NotificationRecord {
            seq,
            notification,
            digest,
        };
        tracing::trace!(
            seq,
            kind = record.notification.kind(),
            digest = %record.digest_hex(),
            "Notification appended"
        );
        self.records.push(record);
        Ok(seq)
    }

    /// Digest of the latest record, or zeros when empty.
    #[must_use]
    pub fn head(&self) -> [u8; 32] {
        self.records.last().map_or([0u8; 32], |r| r.digest)
    }

    #[must_use]
    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    /// Records with `seq >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[NotificationRecord] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.records.len());
        &self.records[start..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recompute every digest from the start.
    ///
    /// # Errors
    /// `IntegrityViolation` naming the first record that does not verify.
    pub fn verify_chain(&self) -> Result<()> {
        verify_records(&self.records)
    }
}

/// Verify an exported slice of records starting at `seq == 0`.
pub fn verify_records(records: &[NotificationRecord]) -> Result<()> {
    let mut prev = [0u8; 32];
    for (i, record) in records.iter().enumerate() {
        if record.seq != i as u64 {
            return Err(RoscaError::IntegrityViolation(format!(
                "record {i} has seq {}",
                record.seq
            )));
        }
        let expected = chain_digest(&prev, record.seq, &record.notification)?;
        if expected != record.digest {
            return Err(RoscaError::IntegrityViolation(format!(
                "digest mismatch at seq {}",
                record.seq
            )));
        }
        prev = record.digest;
    }
    Ok(())
}

fn chain_digest(prev: &[u8; 32], seq: u64, notification: &Notification) -> Result<[u8; 32]> {
    let body = serde_json::to_vec(notification)?;
    let mut hasher = Sha256::new();
    hasher.update(NOTIFICATION_DIGEST_DOMAIN);
    hasher.update(prev);
    hasher.update(seq.to_le_bytes());
    hasher.update(&body);
    Ok(hasher.finalize().into())
}
