//! Mainnet provider construction and key handling.

use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Key file could not be read
    #[error("Failed to read key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience function to create an ethereum rpc provider from url.
pub async fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a provider with wallet signing capability from a signer.
pub fn create_wallet_provider(
    rpc_url: &str,
    signer: PrivateKeySigner,
) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok(provider)
}

/// Parse a hex private key (with or without 0x prefix).
pub fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ClientError> {
    private_key
        .trim()
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))
}

/// Read a private key file and parse its (trimmed) contents.
pub fn load_signer(path: impl AsRef<Path>) -> Result<PrivateKeySigner, ClientError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ClientError::KeyFile {
        path: path.display().to_string(),
        source,
    })?;

    parse_signer(&contents)
}

/// Generate a new random key and return it hex encoded with its signer.
pub fn generate_key() -> (PrivateKeySigner, String) {
    let signer = PrivateKeySigner::random();
    let encoded = alloy_primitives::hex::encode_prefixed(signer.to_bytes());
    (signer, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url() {
        let result = create_provider("not a url").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_signer_trims_whitespace() {
        let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80\n";
        let signer = parse_signer(key).unwrap();
        assert_eq!(
            signer.address(),
            alloy_primitives::address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_parse_signer_rejects_garbage() {
        let result = parse_signer("not a key");
        assert!(matches!(result, Err(ClientError::InvalidPrivateKey(_))));
    }

    #[test]
    fn test_generated_key_round_trips() {
        let (signer, encoded) = generate_key();
        let parsed = parse_signer(&encoded).unwrap();
        assert_eq!(parsed.address(), signer.address());
    }

    #[test]
    fn test_load_signer_missing_file() {
        let result = load_signer("/definitely/not/here_private_key");
        assert!(matches!(result, Err(ClientError::KeyFile { .. })));
    }
}
