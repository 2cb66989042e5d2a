//! Content fingerprints for dedup ("instant upload").
//!
//! Hashing a whole multi-gigabyte file before every upload is too slow, so
//! the fingerprint covers a bounded prefix plus the size. Two files sharing
//! both collide, which only costs a false instant upload on the store side.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::subject::UploadSubject;

/// Number of hex digits kept from the digest.
const DIGEST_HEX_LEN: usize = 32;

/// Per-process counter mixed into fallback fingerprints.
static FALLBACK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identifier used for dedup and as the session key seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Derives the fingerprint of `subject`. Never fails.
///
/// Normal form: the first 32 hex digits of SHA-256 over at most
/// [`FINGERPRINT_SAMPLE_SIZE`](searchhub_protocol::constants::FINGERPRINT_SAMPLE_SIZE)
/// leading bytes, then `_` and the size. If the sample cannot be read the
/// fingerprint is derived from name, size, modification time and a
/// per-attempt timestamp, so the existence check simply misses and a normal
/// upload follows.
pub async fn derive_fingerprint(subject: &dyn UploadSubject) -> Fingerprint {
    let size = subject.size();
    let sample_len = std::cmp::min(searchhub_protocol::constants::FINGERPRINT_SAMPLE_SIZE, size);

    match subject.read_range(0..sample_len).await {
        Ok(sample) => {
            let digest = sha256_hex(&sample);
            let fp = Fingerprint(format!("{}_{size}", &digest[..DIGEST_HEX_LEN]));
            debug!(file = subject.name(), fingerprint = %fp, "fingerprint derived");
            fp
        }
        Err(e) => {
            warn!(file = subject.name(), error = %e, "fingerprint sample unreadable, using fallback");
            fallback_fingerprint(subject.name(), size, subject.modified_ms())
        }
    }
}

fn fallback_fingerprint(name: &str, size: u64, modified_ms: i64) -> Fingerprint {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = FALLBACK_SEQ.fetch_add(1, Ordering::Relaxed);
    let seed = format!("{name}_{size}_{modified_ms}_{now_ms}_{seq}");
    Fingerprint(sha256_hex(seed.as_bytes())[..DIGEST_HEX_LEN].to_string())
}
