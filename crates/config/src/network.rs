//! Network configuration for cross-chain actions.
//!
//! Provides chain-specific addresses and parameters for the DAppChain and its
//! paired Ethereum network (mainnet, testnet).

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network type (mainnet or testnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

/// Generation of the Ethereum transfer gateway.
///
/// Decides how an oracle signature is turned into withdrawal calldata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatewayVersion {
    /// Oracle signature forwarded verbatim as `bytes`.
    SingleSig,
    /// Concatenated validator signatures checked against the validator manager.
    #[default]
    Multisig,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} address is zero")]
    ZeroAddress(&'static str),

    #[error("DAppChain {0} must not be empty")]
    Empty(&'static str),
}

/// Ethereum network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumConfig {
    /// Chain ID
    pub chain_id: u64,
    /// Transfer gateway contract address
    pub gateway: Address,
    /// LOOM ERC20 token address
    pub token: Address,
    /// Gateway generation deployed at `gateway`
    pub gateway_version: GatewayVersion,
}

impl EthereumConfig {
    /// Ethereum mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 1,
            // https://etherscan.io/address/0x8f8E8b3C4De76A31971Fe6a87297D8f703bE8570
            gateway: address!("0x8f8E8b3C4De76A31971Fe6a87297D8f703bE8570"),
            // https://etherscan.io/token/0xA4e8C3Ec456107eA67d3075bF9e3DF3A75823DB0
            token: address!("0xA4e8C3Ec456107eA67d3075bF9e3DF3A75823DB0"),
            gateway_version: GatewayVersion::Multisig,
        }
    }

    /// Rinkeby testnet configuration.
    ///
    /// Testnet deployments are redeployed regularly, so gateway and token must be
    /// supplied through the builder.
    pub const fn rinkeby() -> Self {
        Self {
            chain_id: 4,
            gateway: Address::ZERO,
            token: Address::ZERO,
            gateway_version: GatewayVersion::Multisig,
        }
    }
}

/// DAppChain (sidechain) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DAppChainConfig {
    /// Chain ID used as the prefix of every sidechain address
    pub chain_id: String,
    /// Base endpoint; `/rpc` and `/query` are appended
    pub endpoint: String,
}

impl DAppChainConfig {
    /// PlasmaChain mainnet.
    pub fn plasma() -> Self {
        Self {
            chain_id: "default".to_string(),
            endpoint: "https://plasma.dappchains.com".to_string(),
        }
    }

    /// Extdev testnet, paired with Rinkeby.
    pub fn extdev() -> Self {
        Self {
            chain_id: "extdev-plasma-us1".to_string(),
            endpoint: "https://extdev-plasma-us1.dappchains.com".to_string(),
        }
    }
}

/// Complete network configuration for cross-chain actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type (mainnet or testnet)
    pub network_type: NetworkType,
    /// Ethereum configuration
    pub ethereum: EthereumConfig,
    /// DAppChain configuration
    pub dappchain: DAppChainConfig,
}

impl NetworkConfig {
    /// Create mainnet configuration.
    pub fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            ethereum: EthereumConfig::mainnet(),
            dappchain: DAppChainConfig::plasma(),
        }
    }

    /// Create testnet (Rinkeby + extdev) configuration.
    pub fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            ethereum: EthereumConfig::rinkeby(),
            dappchain: DAppChainConfig::extdev(),
        }
    }

    /// Create configuration from network type.
    pub fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
        }
    }

    /// Check that every address and endpoint needed for gateway work is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ethereum.gateway == Address::ZERO {
            return Err(ConfigError::ZeroAddress("Gateway"));
        }

        if self.ethereum.token == Address::ZERO {
            return Err(ConfigError::ZeroAddress("Token"));
        }

        if self.dappchain.chain_id.is_empty() {
            return Err(ConfigError::Empty("chain id"));
        }

        if self.dappchain.endpoint.is_empty() {
            return Err(ConfigError::Empty("endpoint"));
        }

        Ok(())
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub fn mainnet() -> Self {
        Self {
            config: NetworkConfig::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub fn testnet() -> Self {
        Self {
            config: NetworkConfig::testnet(),
        }
    }

    /// Start with the defaults of the given network.
    pub fn from_network_type(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Override Ethereum gateway address.
    pub const fn gateway(mut self, address: Address) -> Self {
        self.config.ethereum.gateway = address;
        self
    }

    /// Override Ethereum LOOM token address.
    pub const fn token(mut self, address: Address) -> Self {
        self.config.ethereum.token = address;
        self
    }

    /// Override the gateway generation.
    pub const fn gateway_version(mut self, version: GatewayVersion) -> Self {
        self.config.ethereum.gateway_version = version;
        self
    }

    /// Override Ethereum chain id.
    pub const fn ethereum_chain_id(mut self, chain_id: u64) -> Self {
        self.config.ethereum.chain_id = chain_id;
        self
    }

    /// Override DAppChain chain id.
    pub fn dappchain_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.config.dappchain.chain_id = chain_id.into();
        self
    }

    /// Override DAppChain endpoint.
    pub fn dappchain_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.dappchain.endpoint = endpoint.into();
        self
    }

    /// Build the network configuration.
    pub fn build(self) -> NetworkConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = NetworkConfig::mainnet();
        assert_eq!(config.ethereum.chain_id, 1);
        assert_eq!(config.dappchain.chain_id, "default");
        assert_eq!(config.network_type, NetworkType::Mainnet);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testnet_requires_addresses() {
        let config = NetworkConfig::testnet();
        assert_eq!(config.ethereum.chain_id, 4);
        assert_eq!(config.network_type, NetworkType::Testnet);
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::ZeroAddress("Gateway")
        );
    }

    #[test]
    fn test_custom_config_builder() {
        let gateway = address!("1111111111111111111111111111111111111111");
        let token = address!("2222222222222222222222222222222222222222");

        let config = NetworkConfigBuilder::testnet()
            .gateway(gateway)
            .token(token)
            .gateway_version(GatewayVersion::SingleSig)
            .dappchain_endpoint("http://localhost:46658")
            .build();

        assert_eq!(config.ethereum.gateway, gateway);
        assert_eq!(config.ethereum.token, token);
        assert_eq!(config.ethereum.gateway_version, GatewayVersion::SingleSig);
        assert_eq!(config.dappchain.endpoint, "http://localhost:46658");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_chain_id_rejected() {
        let config = NetworkConfigBuilder::mainnet().dappchain_chain_id("").build();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::Empty("chain id")
        );
    }

    #[test]
    fn test_gateway_version_serde() {
        let version: GatewayVersion = serde_json::from_str("\"single-sig\"").unwrap();
        assert_eq!(version, GatewayVersion::SingleSig);
        let version: GatewayVersion = serde_json::from_str("\"multisig\"").unwrap();
        assert_eq!(version, GatewayVersion::Multisig);
    }
}
