//! Client SDK for the DAppChain sidechain.
//!
//! This crate provides:
//! - Chain-prefixed addresses (`<chain id>:<local address>`)
//! - A JSON-RPC client for the sidechain's `/query` and `/rpc` endpoints
//! - Traits and RPC-backed implementations for the built-in contracts:
//!   coin, transfer gateway, address mapper and DPoS

pub mod address;
pub mod coin;
pub mod dpos;
pub mod gateway;
pub mod mapper;
pub mod rpc;
pub mod types;

pub use address::{AddressError, ChainAddress, ETHEREUM_CHAIN_ID};
pub use coin::{Coin, CoinContract};
pub use dpos::{Dpos, DposContract};
pub use gateway::{GatewayContract, TransferGateway};
pub use mapper::{AddressMapper, MapperContract};
pub use rpc::{DAppChainError, RpcClient, TxReceipt};

/// Result type for sidechain calls.
pub type Result<T, E = DAppChainError> = std::result::Result<T, E>;
