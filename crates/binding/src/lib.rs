//! Contract bindings for the Ethereum side of the transfer gateway.
//!
//! This crate consolidates the Solidity interfaces the CLI talks to on mainnet:
//! - ERC20 tokens (the LOOM token)
//! - Transfer gateways (single-signature and multisig oracle variants)
//! - Validator manager (signer set for the multisig gateway)
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod gateway;
pub mod token;
pub mod validators;
