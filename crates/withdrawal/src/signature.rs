//! Splitting a multisig oracle signature into per-validator components.

use alloy_primitives::{Address, Signature, B256, U256};
use thiserror::Error;
use tracing::{debug, warn};

/// Length of one `r ++ s ++ v` validator signature.
pub const VALIDATOR_SIGNATURE_LEN: usize = 65;

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("oracle signature of {0} bytes is not a sequence of 65 byte signatures")]
    Length(usize),

    #[error("malformed validator signature: {0}")]
    Malformed(#[from] alloy_primitives::SignatureError),

    #[error("no oracle signature belongs to a current validator")]
    NoValidator,
}

/// Validator signatures in the layout the multisig gateway expects, ordered by
/// ascending validator index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorSignatures {
    pub indexes: Vec<U256>,
    pub v: Vec<u8>,
    pub r: Vec<B256>,
    pub s: Vec<B256>,
}

/// Recover every validator signature in `oracle_signature` over `hash` and match
/// it to its position in `validators`.
///
/// The oracle may prefix the concatenation with a single mode byte, which is
/// skipped. Signatures from keys outside the validator set are dropped.
pub fn parse_validator_signatures(
    oracle_signature: &[u8],
    hash: B256,
    validators: &[Address],
) -> Result<ValidatorSignatures, SignatureError> {
    let signatures = match oracle_signature.len() % VALIDATOR_SIGNATURE_LEN {
        0 => oracle_signature,
        1 => &oracle_signature[1..],
        _ => return Err(SignatureError::Length(oracle_signature.len())),
    };

    let mut matched = Vec::new();
    for chunk in signatures.chunks_exact(VALIDATOR_SIGNATURE_LEN) {
        let signature = Signature::from_raw(chunk)?;
        let signer = signature.recover_address_from_msg(hash.as_slice())?;

        let Some(index) = validators.iter().position(|v| *v == signer) else {
            warn!(%signer, "Oracle signature from an unknown validator, skipping");
            continue;
        };

        let v = chunk[64];
        matched.push((
            index,
            if v < 27 { v + 27 } else { v },
            B256::from_slice(&chunk[..32]),
            B256::from_slice(&chunk[32..64]),
        ));
    }

    if matched.is_empty() {
        return Err(SignatureError::NoValidator);
    }

    matched.sort_by_key(|(index, ..)| *index);
    debug!(count = matched.len(), "Matched validator signatures");

    let mut parsed = ValidatorSignatures::default();
    for (index, v, r, s) in matched {
        parsed.indexes.push(U256::from(index));
        parsed.v.push(v);
        parsed.r.push(r);
        parsed.s.push(s);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;

    fn sign(signer: &PrivateKeySigner, hash: B256) -> Vec<u8> {
        signer
            .sign_message_sync(hash.as_slice())
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    #[test]
    fn test_signatures_sorted_by_validator_index() {
        let first = PrivateKeySigner::random();
        let second = PrivateKeySigner::random();
        let validators = [first.address(), Address::repeat_byte(9), second.address()];
        let hash = B256::repeat_byte(0x42);

        // Concatenated in reverse validator order.
        let mut oracle_signature = sign(&second, hash);
        oracle_signature.extend(sign(&first, hash));

        let parsed = parse_validator_signatures(&oracle_signature, hash, &validators).unwrap();

        assert_eq!(parsed.indexes, vec![U256::from(0), U256::from(2)]);
        assert!(parsed.v.iter().all(|v| *v == 27 || *v == 28));
        assert_eq!(parsed.r[0].as_slice(), &oracle_signature[65..97]);
        assert_eq!(parsed.s[1].as_slice(), &oracle_signature[32..64]);
    }

    #[test]
    fn test_mode_byte_is_skipped() {
        let signer = PrivateKeySigner::random();
        let hash = B256::repeat_byte(0x42);

        let mut oracle_signature = vec![1u8];
        oracle_signature.extend(sign(&signer, hash));

        let parsed =
            parse_validator_signatures(&oracle_signature, hash, &[signer.address()]).unwrap();
        assert_eq!(parsed.indexes, vec![U256::ZERO]);
    }

    #[test]
    fn test_unknown_signers_only() {
        let signer = PrivateKeySigner::random();
        let hash = B256::repeat_byte(0x42);

        let result =
            parse_validator_signatures(&sign(&signer, hash), hash, &[Address::repeat_byte(9)]);
        assert!(matches!(result, Err(SignatureError::NoValidator)));
    }

    #[test]
    fn test_bad_length() {
        let result = parse_validator_signatures(&[0u8; 64], B256::ZERO, &[]);
        assert!(matches!(result, Err(SignatureError::Length(64))));
    }
}
