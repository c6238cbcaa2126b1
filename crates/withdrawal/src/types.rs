use alloy_primitives::{TxHash, U256};
use dappchain::types::WithdrawalReceipt;
use std::fmt;

/// Where a withdrawal stands from the client's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalState {
    /// The sidechain gateway holds no receipt for the owner.
    NoPendingReceipt,
    /// A receipt exists (or was just requested) but the oracle has not signed it.
    AwaitingSignature(Option<WithdrawalReceipt>),
    /// The receipt carries an oracle signature and can be redeemed on mainnet.
    SignedReady(WithdrawalReceipt),
    /// The mainnet withdrawal was mined.
    Submitted {
        receipt: WithdrawalReceipt,
        tx_hash: TxHash,
    },
}

impl WithdrawalState {
    /// Classify the sidechain gateway's answer for the owner's pending receipt.
    pub fn from_pending(receipt: Option<WithdrawalReceipt>) -> Self {
        match receipt {
            None => Self::NoPendingReceipt,
            Some(receipt) if receipt.is_signed() => Self::SignedReady(receipt),
            Some(receipt) => Self::AwaitingSignature(Some(receipt)),
        }
    }
}

impl fmt::Display for WithdrawalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoPendingReceipt => "no-pending-receipt",
            Self::AwaitingSignature(_) => "awaiting-signature",
            Self::SignedReady(_) => "signed-ready",
            Self::Submitted { .. } => "submitted",
        };
        f.write_str(name)
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalRequest {
    /// Withdraw this many base units, or finish the pending withdrawal if one exists.
    Withdraw(U256),
    /// Only finish a pending withdrawal; never request a new one.
    Resume,
}

/// Successful end of a withdrawal run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalOutcome {
    /// Resume was requested but there was nothing to resume.
    NothingPending,
    /// The mainnet gateway already consumed this receipt.
    AlreadyRedeemed(WithdrawalReceipt),
    /// Tokens were released on mainnet.
    Completed {
        receipt: WithdrawalReceipt,
        tx_hash: TxHash,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes};
    use dappchain::{types::TokenKind, ChainAddress};

    fn receipt(signature: &'static [u8]) -> WithdrawalReceipt {
        WithdrawalReceipt {
            token_owner: ChainAddress::ethereum(Address::repeat_byte(1)),
            token_contract: ChainAddress::ethereum(Address::repeat_byte(2)),
            token_kind: TokenKind::LoomCoin,
            withdrawal_nonce: U256::ZERO,
            token_amount: U256::from(1),
            oracle_signature: Bytes::from_static(signature),
        }
    }

    #[test]
    fn test_state_from_pending() {
        assert_eq!(
            WithdrawalState::from_pending(None),
            WithdrawalState::NoPendingReceipt
        );
        assert!(matches!(
            WithdrawalState::from_pending(Some(receipt(b""))),
            WithdrawalState::AwaitingSignature(Some(_))
        ));
        assert!(matches!(
            WithdrawalState::from_pending(Some(receipt(b"\x01"))),
            WithdrawalState::SignedReady(_)
        ));
    }
}
