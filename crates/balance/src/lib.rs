//! Balance monitoring across Ethereum and the DAppChain.
//!
//! This crate provides one interface for querying LOOM balances on either
//! chain, plus native ETH balances for gas.

pub mod monitor;

use alloy_primitives::{Address, U256};
use dappchain::ChainAddress;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Represents a balance at a specific point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The address holding the balance
    pub holder: ChainAddress,
    /// The asset (mainnet zero address for ETH)
    pub asset: ChainAddress,
    /// The balance amount
    pub amount: U256,
}

/// Type of balance query to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceQuery {
    /// Query ERC20 token balance on mainnet for an EOA or contract
    ERC20Balance {
        /// Token contract address
        token: Address,
        /// Holder address
        holder: Address,
    },
    /// Query native ETH balance
    NativeBalance {
        /// Account address
        address: Address,
    },
    /// Query the sidechain coin balance
    CoinBalance {
        /// Sidechain account
        holder: ChainAddress,
    },
}

/// Trait for monitoring balances.
pub trait Monitor: Send + Sync {
    /// Query a single balance.
    fn query_balance(
        &self,
        query: BalanceQuery,
    ) -> impl Future<Output = eyre::Result<Balance>> + Send;
}
