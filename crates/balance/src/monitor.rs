use crate::{Balance, BalanceQuery, Monitor};
use alloy_primitives::Address;
use alloy_provider::Provider;
use binding::token::IERC20;
use dappchain::{ChainAddress, Coin};
use eyre::Result;
use tracing::debug;

/// Balance monitor over a mainnet provider and, optionally, the sidechain coin.
pub struct BalanceMonitor<P, C> {
    provider: P,
    coin: Option<C>,
}

impl<P, C> BalanceMonitor<P, C>
where
    P: Provider + Clone,
    C: Coin,
{
    /// `coin` may be left out when only mainnet balances are needed.
    pub const fn new(provider: P, coin: Option<C>) -> Self {
        Self { provider, coin }
    }

    async fn query_coin(&self, holder: ChainAddress) -> Result<Balance> {
        let Some(coin) = &self.coin else {
            eyre::bail!("No DAppChain coin contract configured");
        };

        debug!(holder = %holder, "Querying DAppChain coin balance");
        let amount = coin.balance_of(&holder).await?;

        Ok(Balance {
            holder,
            asset: coin.address().clone(),
            amount,
        })
    }

    async fn query_native(&self, address: Address) -> Result<Balance> {
        debug!(address = %address, "Querying native balance");

        let balance = self.provider.get_balance(address).await?;

        Ok(Balance {
            holder: ChainAddress::ethereum(address),
            asset: ChainAddress::ethereum(Address::ZERO),
            amount: balance,
        })
    }

    async fn query_erc20(&self, token: Address, holder: Address) -> Result<Balance> {
        debug!(token = %token, holder = %holder, "Querying ERC20 balance");

        let contract = IERC20::new(token, &self.provider);
        let amount = contract.balanceOf(holder).call().await?;

        Ok(Balance {
            holder: ChainAddress::ethereum(holder),
            asset: ChainAddress::ethereum(token),
            amount,
        })
    }
}

impl<P, C> Monitor for BalanceMonitor<P, C>
where
    P: Provider + Clone,
    C: Coin,
{
    async fn query_balance(&self, query: BalanceQuery) -> Result<Balance> {
        match query {
            BalanceQuery::CoinBalance { holder } => self.query_coin(holder).await,
            BalanceQuery::ERC20Balance { token, holder } => self.query_erc20(token, holder).await,
            BalanceQuery::NativeBalance { address } => self.query_native(address).await,
        }
    }
}
