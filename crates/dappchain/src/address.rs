//! Chain-prefixed addresses.
//!
//! Every identity on the DAppChain is a pair of a chain id and a 20-byte local
//! address, written `<chain id>:<0x-prefixed lowercase hex>`. Mainnet identities use
//! the reserved `eth` chain id.

use alloy_primitives::{hex, Address};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Chain id the sidechain uses for Ethereum mainnet identities.
pub const ETHEREUM_CHAIN_ID: &str = "eth";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing chain id in address {0:?}")]
    MissingChainId(String),

    #[error("invalid local address {input:?}: {reason}")]
    InvalidLocal { input: String, reason: String },
}

/// Address qualified by the chain it lives on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainAddress {
    pub chain_id: String,
    pub local: Address,
}

impl ChainAddress {
    pub fn new(chain_id: impl Into<String>, local: Address) -> Self {
        Self {
            chain_id: chain_id.into(),
            local,
        }
    }

    /// Mainnet identity for an Ethereum account.
    pub fn ethereum(local: Address) -> Self {
        Self::new(ETHEREUM_CHAIN_ID, local)
    }

    pub fn is_ethereum(&self) -> bool {
        self.chain_id == ETHEREUM_CHAIN_ID
    }

    /// Parse either a full `<chain>:<local>` address or a bare local address,
    /// in which case `default_chain_id` is prefixed.
    pub fn parse_with_default_chain(
        input: &str,
        default_chain_id: &str,
    ) -> Result<Self, AddressError> {
        if input.contains(':') {
            return input.parse();
        }

        Ok(Self::new(default_chain_id, parse_local(input)?))
    }
}

fn parse_local(input: &str) -> Result<Address, AddressError> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|e| AddressError::InvalidLocal {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, hex::encode_prefixed(self.local))
    }
}

impl FromStr for ChainAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain_id, local) = s
            .split_once(':')
            .filter(|(chain_id, _)| !chain_id.is_empty())
            .ok_or_else(|| AddressError::MissingChainId(s.to_string()))?;

        Ok(Self::new(chain_id, parse_local(local)?))
    }
}

impl TryFrom<String> for ChainAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChainAddress> for String {
    fn from(value: ChainAddress) -> Self {
        value.to_string()
    }
}
