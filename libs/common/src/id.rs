//! Sortable identifier generation
//!
//! Accounts, products, and orders share a 27-character id: a 32-bit
//! big-endian timestamp (seconds since a fixed epoch) followed by 16 random
//! bytes, encoded as fixed-width base62. Fixed width plus the time prefix
//! makes the ids lexicographically time-ordered.

use rand::RngCore;

/// Length of an encoded id
pub const ENCODED_LEN: usize = 27;

/// Raw payload length: 4 timestamp bytes + 16 random bytes
const RAW_LEN: usize = 20;

/// Epoch offset keeps the 32-bit seconds field useful for another century
const EPOCH_OFFSET_SECS: i64 = 1_400_000_000;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a new id for the current instant
pub fn generate() -> String {
    generate_at(chrono::Utc::now().timestamp())
}

/// Generate an id with an explicit unix-seconds timestamp
pub fn generate_at(unix_secs: i64) -> String {
    let ts = (unix_secs - EPOCH_OFFSET_SECS).max(0) as u32;

    let mut raw = [0u8; RAW_LEN];
    raw[..4].copy_from_slice(&ts.to_be_bytes());
    rand::thread_rng().fill_bytes(&mut raw[4..]);

    encode_base62(&raw)
}

/// Check the shape of an id: exactly 27 alphanumeric characters
pub fn is_valid(id: &str) -> bool {
    id.len() == ENCODED_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Fixed-width base62 encoding of the 160-bit payload
fn encode_base62(raw: &[u8; RAW_LEN]) -> String {
    let mut digits: Vec<u8> = raw.to_vec();
    let mut out = [b'0'; ENCODED_LEN];

    for slot in out.iter_mut().rev() {
        if digits.is_empty() {
            break;
        }
        // Long division of the big-endian number by 62
        let mut rem: u32 = 0;
        let mut next = Vec::with_capacity(digits.len());
        for &b in &digits {
            let acc = rem * 256 + b as u32;
            let q = (acc / 62) as u8;
            rem = acc % 62;
            if !(next.is_empty() && q == 0) {
                next.push(q);
            }
        }
        *slot = ALPHABET[rem as usize];
        digits = next;
    }

    String::from_utf8(out.to_vec()).expect("alphabet is ascii")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_27_alphanumeric_chars() {
        for _ in 0..100 {
            let id = generate();
            assert_eq!(id.len(), ENCODED_LEN);
            assert!(is_valid(&id), "invalid id: {}", id);
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate()));
        }
    }

    #[test]
    fn later_timestamps_sort_after_earlier_ones() {
        let early = generate_at(1_700_000_000);
        let late = generate_at(1_700_000_100);
        assert!(early < late, "{} should sort before {}", early, late);
    }

    #[test]
    fn encoding_is_fixed_width_even_for_zero() {
        let id = encode_base62(&[0u8; RAW_LEN]);
        assert_eq!(id.len(), ENCODED_LEN);
        assert!(id.bytes().all(|b| b == b'0'));
    }

    #[test]
    fn validation_rejects_malformed_ids() {
        assert!(!is_valid(""));
        assert!(!is_valid("short"));
        assert!(!is_valid(&"x".repeat(28)));
        assert!(!is_valid(&format!("{}!", "a".repeat(26))));
    }
}
