//! Sidechain half of a LOOM withdrawal.

use alloy_primitives::{Address, U256};
use dappchain::{types::WithdrawalReceipt, ChainAddress, Coin, TransferGateway};
use tracing::info;
use withdrawal::SidechainWithdrawals;

/// Withdrawal requests from one sidechain account to one mainnet account.
pub struct SidechainWithdrawal<G, C> {
    gateway: G,
    coin: C,
    owner: ChainAddress,
    recipient: ChainAddress,
    mainnet_token: ChainAddress,
}

impl<G, C> SidechainWithdrawal<G, C>
where
    G: TransferGateway,
    C: Coin,
{
    /// `owner` is the sidechain account, `recipient` and `mainnet_token` are
    /// mainnet addresses.
    pub fn new(
        gateway: G,
        coin: C,
        owner: ChainAddress,
        recipient: Address,
        mainnet_token: Address,
    ) -> Self {
        Self {
            gateway,
            coin,
            owner,
            recipient: ChainAddress::ethereum(recipient),
            mainnet_token: ChainAddress::ethereum(mainnet_token),
        }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub const fn coin(&self) -> &C {
        &self.coin
    }
}

impl<G, C> SidechainWithdrawals for SidechainWithdrawal<G, C>
where
    G: TransferGateway,
    C: Coin,
{
    async fn pending_receipt(&self) -> eyre::Result<Option<WithdrawalReceipt>> {
        Ok(self.gateway.withdrawal_receipt(&self.owner).await?)
    }

    async fn request_withdrawal(&self, amount: U256) -> eyre::Result<()> {
        let approval = self.coin.approve(self.gateway.address(), amount).await?;
        info!(tx_hash = %approval.hash, %amount, "Approved sidechain gateway");

        let receipt = self
            .gateway
            .withdraw_loom_coin(amount, &self.mainnet_token, &self.recipient)
            .await?;
        info!(
            tx_hash = %receipt.hash,
            recipient = %self.recipient,
            "Withdrawal submitted to sidechain gateway"
        );

        Ok(())
    }
}
