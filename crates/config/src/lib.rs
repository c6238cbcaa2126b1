//! Configuration types for the DAppChain gateway CLI.
//!
//! This crate provides:
//! - Network configurations (mainnet, testnet)
//! - Contract addresses and gateway generation for each network
//! - Configuration validation

pub mod network;

pub use network::{
    ConfigError, DAppChainConfig, EthereumConfig, GatewayVersion, NetworkConfig,
    NetworkConfigBuilder, NetworkType,
};
