//! Per-invocation account and contract handles.

use crate::config::Config;
use action::gateway::EthereumGateway;
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_signer_local::PrivateKeySigner;
use config::NetworkConfig;
use dappchain::{
    ChainAddress, CoinContract, DposContract, GatewayContract, MapperContract, RpcClient,
};
use tracing::debug;

/// Both identities of the operator plus the clients to reach each chain.
///
/// Built once per command from the configuration and never persisted.
pub struct Session {
    config: Config,
    network: NetworkConfig,
    eth_signer: PrivateKeySigner,
    rpc: RpcClient,
}

impl Session {
    /// Validate the network settings and load both private keys.
    pub fn load(config: Config) -> eyre::Result<Self> {
        let network = config.network_config()?;

        let eth_signer = client::load_signer(&config.eth_private_key_file)?;
        let dappchain_signer = client::load_signer(&config.dappchain_private_key_file)?;

        let rpc = RpcClient::new(
            network.dappchain.endpoint.clone(),
            network.dappchain.chain_id.clone(),
            dappchain_signer,
        );

        debug!(
            endpoint = %network.dappchain.endpoint,
            chain_id = %network.dappchain.chain_id,
            gateway = %network.ethereum.gateway,
            "Session loaded"
        );

        Ok(Self {
            config,
            network,
            eth_signer,
            rpc,
        })
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub const fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn eth_signer(&self) -> PrivateKeySigner {
        self.eth_signer.clone()
    }

    pub fn mainnet_address(&self) -> Address {
        self.eth_signer.address()
    }

    pub fn sidechain_address(&self) -> ChainAddress {
        self.rpc.address()
    }

    /// Read-only mainnet provider.
    pub async fn provider(&self) -> eyre::Result<impl Provider + Clone> {
        Ok(client::create_provider(&self.config.eth_rpc_url()?).await?)
    }

    /// Mainnet gateway and token, signing as the operator.
    pub fn ethereum_gateway(&self) -> eyre::Result<EthereumGateway<impl Provider + Clone>> {
        let provider =
            client::create_wallet_provider(&self.config.eth_rpc_url()?, self.eth_signer())?;

        Ok(EthereumGateway::new(
            provider,
            self.network.ethereum.gateway,
            self.network.ethereum.token,
            self.network.ethereum.gateway_version,
            self.mainnet_address(),
        ))
    }

    pub async fn coin(&self) -> eyre::Result<CoinContract> {
        Ok(CoinContract::resolve(self.rpc.clone()).await?)
    }

    pub async fn gateway(&self) -> eyre::Result<GatewayContract> {
        Ok(GatewayContract::resolve(self.rpc.clone()).await?)
    }

    pub async fn mapper(&self) -> eyre::Result<MapperContract> {
        Ok(MapperContract::resolve(self.rpc.clone()).await?)
    }

    pub async fn dpos(&self) -> eyre::Result<DposContract> {
        Ok(DposContract::resolve(self.rpc.clone()).await?)
    }

    /// Qualify a bare sidechain address with the configured chain id.
    pub fn sidechain(&self, input: &str) -> eyre::Result<ChainAddress> {
        Ok(self.rpc.prefix_address(input)?)
    }
}
