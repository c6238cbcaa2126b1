use crate::amount::format_coin_amount;
use alloy_primitives::{Address, TxHash, U256};
use std::future::Future;
use tracing::info;

/// Mainnet half of the transfer gateway as seen by a depositor.
pub trait DepositGateway: Send + Sync {
    /// Account the tokens are deposited from.
    fn owner(&self) -> Address;

    /// Gateway contract tokens are deposited into.
    fn gateway(&self) -> Address;

    /// Allowance the owner has granted the gateway on the token.
    fn allowance(&self) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Set the gateway's allowance to `amount` and wait for the approval to be mined.
    fn approve(&self, amount: U256) -> impl Future<Output = eyre::Result<TxHash>> + Send;

    /// Deposit `amount` of the token into the gateway and wait for it to be mined.
    fn deposit(&self, amount: U256) -> impl Future<Output = eyre::Result<crate::Result>> + Send;
}

/// Deposit action moving LOOM from mainnet to the DAppChain.
///
/// Tops up the gateway allowance first when it does not cover the amount.
pub struct DepositAction<G> {
    gateway: G,
    amount: U256,
    deposited: bool,
}

impl<G> DepositAction<G>
where
    G: DepositGateway,
{
    pub const fn new(gateway: G, amount: U256) -> Self {
        Self {
            gateway,
            amount,
            deposited: false,
        }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.amount == U256::ZERO {
            eyre::bail!("Deposit amount is zero");
        }

        if self.gateway.gateway() == Address::ZERO {
            eyre::bail!("Gateway address is zero");
        }

        Ok(())
    }
}

impl<G> crate::Action for DepositAction<G>
where
    G: DepositGateway,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(self.validate().is_ok())
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.deposited)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        self.validate()?;

        if self.deposited {
            eyre::bail!("Deposit already executed");
        }

        let allowance = self.gateway.allowance().await?;
        if self.amount > allowance {
            info!(
                allowance = %allowance,
                amount = %self.amount,
                "Allowance does not cover deposit, approving gateway"
            );
            let tx_hash = self.gateway.approve(self.amount).await?;
            info!(tx_hash = %tx_hash, "Gateway approval mined");
        }

        let result = self.gateway.deposit(self.amount).await?;
        self.deposited = true;

        info!(tx_hash = %result.tx_hash, amount = %self.amount, "Deposit mined");
        Ok(result)
    }

    fn description(&self) -> String {
        format!(
            "Deposit {} LOOM from {} into gateway {}",
            format_coin_amount(self.amount),
            self.gateway.owner(),
            self.gateway.gateway()
        )
    }
}
