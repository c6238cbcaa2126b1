//! Withdrawal of LOOM from the DAppChain back to Ethereum.
//!
//! The sidechain gateway holds one pending receipt per owner. The oracle signs it
//! asynchronously, after which the mainnet gateway releases the tokens exactly once.

pub mod clock;
pub mod hash;
pub mod poller;
pub mod signature;
pub mod types;

pub use clock::{Clock, TokioClock};
pub use poller::{
    MainnetWithdrawals, SidechainWithdrawals, WithdrawalError, WithdrawalPoller,
    DEFAULT_POLL_INTERVAL,
};
pub use types::{WithdrawalOutcome, WithdrawalRequest, WithdrawalState};
