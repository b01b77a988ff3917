use serde::Serialize;

use attesta_merkle::{decode_proof, encode_proof, ProofStep};

use crate::error::VerifyError;

/// Inputs for one shareable verification link.
#[derive(Debug, Clone, Default)]
pub struct LinkParams<'a> {
    /// Client base URL; links are root-relative when absent.
    pub base_url: Option<&'a str>,
    pub log_id: Option<&'a str>,
    pub xrpl_tx: Option<&'a str>,
    pub algorand_tx: Option<&'a str>,
}

/// A per-leaf shareable verification URL plus its encoded proof.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationLink {
    pub hash: String,
    pub proof_b64: String,
    pub url: String,
}

/// A verification link decoded back into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLink {
    pub hash: String,
    pub proof: Vec<ProofStep>,
    pub log_id: Option<String>,
    pub xrpl_tx: Option<String>,
    pub algorand_tx: Option<String>,
}

/// Build the shareable URL for one leaf.
///
/// Every parameter value is URL-safe by construction (lowercase hex,
/// base64url, ledger entity ids), so no percent-encoding is involved.
/// The link carries everything the offline path needs: the one remaining
/// server dependency is the public log fetch for the root.
pub fn build_link(
    leaf: &str,
    proof: &[ProofStep],
    params: &LinkParams<'_>,
) -> VerificationLink {
    let proof_b64 = encode_proof(proof);
    let mut query = format!("hash={leaf}&proof_b64={proof_b64}");
    if let Some(log_id) = params.log_id {
        query.push_str(&format!("&logId={log_id}"));
    }
    if let Some(tx) = params.xrpl_tx {
        query.push_str(&format!("&xrplTx={tx}"));
    }
    if let Some(tx) = params.algorand_tx {
        query.push_str(&format!("&algoTx={tx}"));
    }
    let path = format!("/verify?{query}");
    let url = match params.base_url {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
        None => path,
    };
    VerificationLink {
        hash: leaf.to_string(),
        proof_b64,
        url,
    }
}

/// Parse a verification link (or bare query string) back into its parts.
pub fn parse_link(url: &str) -> Result<ParsedLink, VerifyError> {
    let query = url.rsplit_once('?').map(|(_, q)| q).unwrap_or(url);

    let mut hash = None;
    let mut proof_b64 = None;
    let mut log_id = None;
    let mut xrpl_tx = None;
    let mut algorand_tx = None;

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| VerifyError::MalformedLink(format!("bad query pair: {pair}")))?;
        match key {
            "hash" => hash = Some(value.to_string()),
            "proof_b64" => proof_b64 = Some(value.to_string()),
            "logId" => log_id = Some(value.to_string()),
            "xrplTx" => xrpl_tx = Some(value.to_string()),
            "algoTx" => algorand_tx = Some(value.to_string()),
            _ => {}
        }
    }

    let hash = hash.ok_or_else(|| VerifyError::MalformedLink("missing hash".into()))?;
    let proof_b64 =
        proof_b64.ok_or_else(|| VerifyError::MalformedLink("missing proof_b64".into()))?;
    let proof = decode_proof(&proof_b64)?;

    Ok(ParsedLink {
        hash,
        proof,
        log_id,
        xrpl_tx,
        algorand_tx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use attesta_merkle::MerkleTree;

    fn batch() -> (Vec<String>, MerkleTree) {
        let leaves: Vec<String> = (0..3)
            .map(|i| attesta_merkle::sha256_hex(format!("cert-{i}").as_bytes()))
            .collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        (leaves, tree)
    }

    #[test]
    fn link_round_trip_preserves_proof_structure() {
        let (leaves, tree) = batch();
        let proof = tree.proof_for(1).unwrap();
        let link = build_link(
            &leaves[1],
            &proof,
            &LinkParams {
                base_url: Some("https://app.attesta.network"),
                log_id: Some("0.0.4521"),
                xrpl_tx: Some("XRPLTX123"),
                algorand_tx: None,
            },
        );
        assert!(link.url.starts_with("https://app.attesta.network/verify?hash="));

        let parsed = parse_link(&link.url).unwrap();
        assert_eq!(parsed.hash, leaves[1]);
        assert_eq!(parsed.proof, proof);
        assert_eq!(parsed.log_id.as_deref(), Some("0.0.4521"));
        assert_eq!(parsed.xrpl_tx.as_deref(), Some("XRPLTX123"));
        assert_eq!(parsed.algorand_tx, None);
    }

    #[test]
    fn relative_link_without_base_url() {
        let (leaves, tree) = batch();
        let link = build_link(
            &leaves[0],
            &tree.proof_for(0).unwrap(),
            &LinkParams::default(),
        );
        assert!(link.url.starts_with("/verify?hash="));
        assert!(parse_link(&link.url).is_ok());
    }

    #[test]
    fn parsed_proof_still_verifies() {
        let (leaves, tree) = batch();
        let link = build_link(
            &leaves[2],
            &tree.proof_for(2).unwrap(),
            &LinkParams::default(),
        );
        let parsed = parse_link(&link.url).unwrap();
        assert!(
            attesta_merkle::verify_inclusion(&parsed.hash, &parsed.proof, tree.root()).unwrap()
        );
    }

    #[test]
    fn missing_hash_is_malformed() {
        assert!(matches!(
            parse_link("/verify?proof_b64=abc"),
            Err(VerifyError::MalformedLink(_))
        ));
    }

    #[test]
    fn garbage_proof_is_merkle_error() {
        assert!(matches!(
            parse_link("/verify?hash=ab&proof_b64=!!!"),
            Err(VerifyError::Merkle(_))
        ));
    }
}
