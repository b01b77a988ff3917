use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::MerkleError;
use crate::proof::ProofStep;

/// Encode a proof for URL transport: base64url over the JSON step array.
///
/// This is purely a serialization boundary; verification always operates on
/// the decoded structure, independent of how it travelled.
pub fn encode_proof(proof: &[ProofStep]) -> String {
    // Serializing a Vec of plain structs cannot fail.
    let json = serde_json::to_string(proof).unwrap_or_else(|_| "[]".into());
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a base64url proof back into its step list.
pub fn decode_proof(encoded: &str) -> Result<Vec<ProofStep>, MerkleError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim().as_bytes())
        .map_err(|e| MerkleError::MalformedProof(format!("invalid base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| MerkleError::MalformedProof(format!("invalid proof json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::sha256_hex;
    use crate::proof::{verify_inclusion, Position};
    use crate::tree::MerkleTree;

    #[test]
    fn round_trip_preserves_structure() {
        let leaves: Vec<String> = (0..5)
            .map(|i| sha256_hex(format!("leaf-{i}").as_bytes()))
            .collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        let proof = tree.proof_for(3).unwrap();

        let decoded = decode_proof(&encode_proof(&proof)).unwrap();
        assert_eq!(decoded, proof);
        assert!(verify_inclusion(&leaves[3], &decoded, tree.root()).unwrap());
    }

    #[test]
    fn empty_proof_round_trips() {
        let decoded = decode_proof(&encode_proof(&[])).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn wire_format_is_position_and_hash() {
        let proof = vec![ProofStep {
            position: Position::Right,
            hash: "cd".repeat(32),
        }];
        let encoded = encode_proof(&proof);
        let json = String::from_utf8(URL_SAFE_NO_PAD.decode(encoded).unwrap()).unwrap();
        assert!(json.contains("\"position\":\"right\""));
        assert!(json.contains("\"hash\""));
    }

    #[test]
    fn garbage_base64_is_malformed_proof() {
        assert!(matches!(
            decode_proof("%%%not-base64%%%"),
            Err(MerkleError::MalformedProof(_))
        ));
    }

    #[test]
    fn valid_base64_invalid_json_is_malformed_proof() {
        let encoded = URL_SAFE_NO_PAD.encode(b"{\"not\": \"a proof\"}");
        assert!(matches!(
            decode_proof(&encoded),
            Err(MerkleError::MalformedProof(_))
        ));
    }
}
