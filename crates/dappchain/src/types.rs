//! Records returned by the built-in sidechain contracts.

use crate::ChainAddress;
use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of token a withdrawal receipt refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Erc721,
    Erc20,
    Eth,
    Erc721x,
    LoomCoin,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Erc721 => "ERC721",
            Self::Erc20 => "ERC20",
            Self::Eth => "ETH",
            Self::Erc721x => "ERC721X",
            Self::LoomCoin => "LOOMCOIN",
        };
        f.write_str(name)
    }
}

/// Pending withdrawal held by the sidechain gateway.
///
/// Created when a withdrawal is requested, signed later by the oracle, and
/// cleared once the mainnet gateway releases the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReceipt {
    /// Mainnet account the tokens are released to
    pub token_owner: ChainAddress,
    /// Mainnet token contract
    pub token_contract: ChainAddress,
    pub token_kind: TokenKind,
    /// Must equal the mainnet gateway's nonce for the owner to be redeemable
    pub withdrawal_nonce: U256,
    pub token_amount: U256,
    /// Empty until the oracle has signed the receipt
    #[serde(default)]
    pub oracle_signature: Bytes,
}

impl WithdrawalReceipt {
    /// Whether the oracle has attached its signature yet.
    pub fn is_signed(&self) -> bool {
        !self.oracle_signature.is_empty()
    }
}

/// Lock-time tier of a delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LockTimeTier {
    TwoWeeks,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl TryFrom<u8> for LockTimeTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::TwoWeeks),
            1 => Ok(Self::ThreeMonths),
            2 => Ok(Self::SixMonths),
            3 => Ok(Self::OneYear),
            other => Err(format!("invalid lock-time tier {other}, expected 0-3")),
        }
    }
}

impl From<LockTimeTier> for u8 {
    fn from(value: LockTimeTier) -> Self {
        match value {
            LockTimeTier::TwoWeeks => 0,
            LockTimeTier::ThreeMonths => 1,
            LockTimeTier::SixMonths => 2,
            LockTimeTier::OneYear => 3,
        }
    }
}

impl fmt::Display for LockTimeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TwoWeeks => "2 weeks",
            Self::ThreeMonths => "3 months",
            Self::SixMonths => "6 months",
            Self::OneYear => "1 year",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelegationState {
    Bonding,
    Bonded,
    Unbonding,
    Redelegating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateState {
    Registered,
    AboutToChangeFee,
    ChangingFee,
    Unregistering,
}

/// Active validator as reported by DPoS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub address: ChainAddress,
    #[serde(default)]
    pub slash_percentage: U256,
    #[serde(default)]
    pub delegation_total: U256,
}

/// Registered candidate with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Base64 encoded public key
    pub pub_key: String,
    pub address: ChainAddress,
    pub fee: u64,
    pub new_fee: u64,
    pub candidate_state: CandidateState,
    #[serde(default)]
    pub whitelist_amount: U256,
    #[serde(default)]
    pub whitelist_locktime_tier: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
}

/// A single delegation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    pub validator: ChainAddress,
    pub delegator: ChainAddress,
    #[serde(default)]
    pub update_validator: Option<ChainAddress>,
    pub index: u64,
    pub amount: U256,
    #[serde(default)]
    pub update_amount: U256,
    /// Unix timestamp the lock expires at
    pub lock_time: u64,
    pub lock_time_tier: LockTimeTier,
    #[serde(default)]
    pub referrer: Option<String>,
    pub state: DelegationState,
}

/// Delegations held by one validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorDelegations {
    pub delegation_total: U256,
    pub delegations: Vec<Delegation>,
}

/// Delegations made by one delegator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatorDelegations {
    pub amount: U256,
    pub weighted_amount: U256,
    pub delegations: Vec<Delegation>,
}

impl DelegatorDelegations {
    /// Unclaimed rewards: the DPoS contract books rewards as the index 0
    /// delegation of every validator.
    pub fn unclaimed_rewards(&self) -> U256 {
        self.delegations
            .iter()
            .filter(|d| d.index == 0)
            .map(|d| d.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_json(signature: &str) -> String {
        format!(
            r#"{{
                "tokenOwner": "eth:0x0101010101010101010101010101010101010101",
                "tokenContract": "eth:0x0202020202020202020202020202020202020202",
                "tokenKind": "LOOM_COIN",
                "withdrawalNonce": "0x3",
                "tokenAmount": "0x22b1c8c1227a0000",
                "oracleSignature": "{signature}"
            }}"#
        )
    }

    #[test]
    fn test_receipt_decodes_unsigned() {
        let receipt: WithdrawalReceipt = serde_json::from_str(&receipt_json("0x")).unwrap();
        assert_eq!(receipt.token_kind, TokenKind::LoomCoin);
        assert_eq!(receipt.withdrawal_nonce, U256::from(3));
        assert_eq!(
            receipt.token_amount,
            U256::from(2_500_000_000_000_000_000u64)
        );
        assert!(!receipt.is_signed());
    }

    #[test]
    fn test_receipt_decodes_signed() {
        let receipt: WithdrawalReceipt =
            serde_json::from_str(&receipt_json("0xdeadbeef")).unwrap();
        assert!(receipt.is_signed());
        assert_eq!(receipt.oracle_signature.len(), 4);
    }

    #[test]
    fn test_lock_time_tier_bounds() {
        assert_eq!(LockTimeTier::try_from(0).unwrap(), LockTimeTier::TwoWeeks);
        assert_eq!(LockTimeTier::try_from(3).unwrap(), LockTimeTier::OneYear);
        assert!(LockTimeTier::try_from(4).is_err());
    }

    #[test]
    fn test_unclaimed_rewards_sums_index_zero() {
        let delegation = |index, amount: u64| Delegation {
            validator: ChainAddress::new("default", alloy_primitives::Address::repeat_byte(1)),
            delegator: ChainAddress::new("default", alloy_primitives::Address::repeat_byte(2)),
            update_validator: None,
            index,
            amount: U256::from(amount),
            update_amount: U256::ZERO,
            lock_time: 0,
            lock_time_tier: LockTimeTier::TwoWeeks,
            referrer: None,
            state: DelegationState::Bonded,
        };

        let delegations = DelegatorDelegations {
            amount: U256::from(1_000),
            weighted_amount: U256::from(1_000),
            delegations: vec![delegation(0, 7), delegation(1, 1_000), delegation(0, 5)],
        };

        assert_eq!(delegations.unclaimed_rewards(), U256::from(12));
    }
}
