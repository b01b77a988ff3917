use sha2::{Digest, Sha256};

use crate::error::MerkleError;

/// SHA-256 of arbitrary bytes, as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Trim and lowercase a hex digest. Leaves are normalized before level 0 is
/// built so proofs and re-verification agree regardless of input casing.
pub fn normalize_hash(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Decode a normalized hex digest into its raw bytes.
pub fn decode_hash(value: &str) -> Result<Vec<u8>, MerkleError> {
    if value.is_empty() || value.len() % 2 != 0 {
        return Err(MerkleError::MalformedHash(value.to_string()));
    }
    hex::decode(value).map_err(|_| MerkleError::MalformedHash(value.to_string()))
}

/// Pairwise combination rule: SHA-256 over the concatenated raw digest
/// bytes, not their hex text.
pub fn combine(left: &str, right: &str) -> Result<String, MerkleError> {
    let mut combined = decode_hash(left)?;
    combined.extend(decode_hash(right)?);
    Ok(sha256_hex(&combined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256("abc")
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_hash("  ABCDEF  "), "abcdef");
    }

    #[test]
    fn combine_uses_raw_bytes() {
        let left = "aa".repeat(32);
        let right = "bb".repeat(32);
        let mut raw = vec![0xaau8; 32];
        raw.extend(vec![0xbbu8; 32]);
        assert_eq!(combine(&left, &right).unwrap(), sha256_hex(&raw));
    }

    #[test]
    fn combine_rejects_non_hex() {
        let good = "aa".repeat(32);
        assert!(matches!(
            combine("zz", &good),
            Err(MerkleError::MalformedHash(_))
        ));
        assert!(matches!(
            combine(&good, "not hex"),
            Err(MerkleError::MalformedHash(_))
        ));
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert!(decode_hash("abc").is_err());
        assert!(decode_hash("").is_err());
    }
}
