//! Sidechain half of the LOOM transfer gateway.

use crate::{types::WithdrawalReceipt, ChainAddress, Result, RpcClient, TxReceipt};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Sidechain transfer gateway for the native coin.
pub trait TransferGateway: Send + Sync {
    /// Address of the gateway contract; the coin allowance is granted to it.
    fn address(&self) -> &ChainAddress;

    /// Pending withdrawal receipt of `owner`, if any.
    fn withdrawal_receipt(
        &self,
        owner: &ChainAddress,
    ) -> impl Future<Output = Result<Option<WithdrawalReceipt>>> + Send;

    /// Lock `amount` on the sidechain and open a receipt releasing it to
    /// `recipient` on mainnet. The coin allowance must already cover `amount`.
    fn withdraw_loom_coin(
        &self,
        amount: U256,
        mainnet_token: &ChainAddress,
        recipient: &ChainAddress,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;
}

/// RPC-backed gateway contract.
#[derive(Debug, Clone)]
pub struct GatewayContract {
    client: RpcClient,
    address: ChainAddress,
}

impl GatewayContract {
    pub const NAME: &'static str = "loomcoin-gateway";

    pub const fn new(client: RpcClient, address: ChainAddress) -> Self {
        Self { client, address }
    }

    /// Look the contract up by its registered name.
    pub async fn resolve(client: RpcClient) -> Result<Self> {
        let address = client.resolve(Self::NAME).await?;
        Ok(Self::new(client, address))
    }
}

#[derive(Serialize)]
struct ReceiptArgs<'a> {
    owner: &'a ChainAddress,
}

#[derive(Deserialize)]
struct ReceiptResponse {
    #[serde(default)]
    receipt: Option<WithdrawalReceipt>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawArgs<'a> {
    amount: U256,
    token_contract: &'a ChainAddress,
    recipient: &'a ChainAddress,
}

impl TransferGateway for GatewayContract {
    fn address(&self) -> &ChainAddress {
        &self.address
    }

    async fn withdrawal_receipt(&self, owner: &ChainAddress) -> Result<Option<WithdrawalReceipt>> {
        let response: ReceiptResponse = self
            .client
            .query(&self.address, "WithdrawalReceipt", ReceiptArgs { owner })
            .await?;
        Ok(response.receipt)
    }

    async fn withdraw_loom_coin(
        &self,
        amount: U256,
        mainnet_token: &ChainAddress,
        recipient: &ChainAddress,
    ) -> Result<TxReceipt> {
        self.client
            .call(
                &self.address,
                "WithdrawLoomCoin",
                WithdrawArgs {
                    amount,
                    token_contract: mainnet_token,
                    recipient,
                },
            )
            .await
    }
}
