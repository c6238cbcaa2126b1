//! Sidechain coin (LOOM on the DAppChain).

use crate::{ChainAddress, Result, RpcClient, TxReceipt};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// The native coin contract.
pub trait Coin: Send + Sync {
    /// Address of the coin contract.
    fn address(&self) -> &ChainAddress;

    /// Balance of `owner` in the smallest unit.
    fn balance_of(&self, owner: &ChainAddress) -> impl Future<Output = Result<U256>> + Send;

    /// Allow `spender` to transfer up to `amount` on the caller's behalf.
    fn approve(
        &self,
        spender: &ChainAddress,
        amount: U256,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;
}

/// RPC-backed coin contract.
#[derive(Debug, Clone)]
pub struct CoinContract {
    client: RpcClient,
    address: ChainAddress,
}

impl CoinContract {
    pub const NAME: &'static str = "coin";

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
struct BalanceOfArgs<'a> {
    owner: &'a ChainAddress,
}

#[derive(Deserialize)]
struct BalanceOfResponse {
    balance: U256,
}

#[derive(Serialize)]
struct ApproveArgs<'a> {
    spender: &'a ChainAddress,
    amount: U256,
}

impl Coin for CoinContract {
    fn address(&self) -> &ChainAddress {
        &self.address
    }

    async fn balance_of(&self, owner: &ChainAddress) -> Result<U256> {
        let response: BalanceOfResponse = self
            .client
            .query(&self.address, "BalanceOf", BalanceOfArgs { owner })
            .await?;
        Ok(response.balance)
    }

    async fn approve(&self, spender: &ChainAddress, amount: U256) -> Result<TxReceipt> {
        self.client
            .call(&self.address, "Approve", ApproveArgs { spender, amount })
            .await
    }
}
