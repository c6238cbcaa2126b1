//! Executable actions of the LOOM transfer gateway and DPoS tooling.
//!
//! Every state-changing command is an [`Action`]; the adapters in [`gateway`] and
//! [`withdraw`] connect the withdrawal state machine to both chains.

pub mod amount;
pub mod claim;
pub mod deposit;
pub mod dpos;
pub mod gateway;
pub mod mapping;
pub mod withdraw;

use alloy_primitives::{TxHash, U256};
use dappchain::TxReceipt;
use std::future::Future;

/// Trait for executable onchain actions.
pub trait Action: Send + Sync {
    /// Check to see if the action is ready to be executed.
    ///
    /// Returns true if all preconditions are met.
    fn is_ready(&self) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Check if the action has already been completed.
    ///
    /// Returns true if the action was already executed successfully.
    fn is_completed(&self) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Execute the action.
    ///
    /// Returns the transaction hash of the executed action.
    fn execute(&mut self) -> impl Future<Output = eyre::Result<Result>> + Send;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

/// Result of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Result {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number (sidechain height) where the transaction was included
    pub block_number: Option<u64>,
    /// Gas used, mainnet only
    pub gas_used: Option<U256>,
}

impl From<TxReceipt> for Result {
    fn from(receipt: TxReceipt) -> Self {
        Self {
            tx_hash: receipt.hash,
            block_number: Some(receipt.height),
            gas_used: None,
        }
    }
}
