//! Staking actions against the DPoS contract.

use crate::amount::format_coin_amount;
use alloy_primitives::U256;
use dappchain::{types::LockTimeTier, ChainAddress, Coin, Dpos};
use tracing::info;

/// Delegate coins to a validator.
///
/// The DPoS contract pulls the coins through an allowance, so the coin is approved
/// for the DPoS contract first.
pub struct DelegateAction<D, C> {
    dpos: D,
    coin: C,
    validator: ChainAddress,
    amount: U256,
    tier: LockTimeTier,
    referrer: Option<String>,
    delegated: bool,
}

impl<D, C> DelegateAction<D, C>
where
    D: Dpos,
    C: Coin,
{
    pub const fn new(
        dpos: D,
        coin: C,
        validator: ChainAddress,
        amount: U256,
        tier: LockTimeTier,
        referrer: Option<String>,
    ) -> Self {
        Self {
            dpos,
            coin,
            validator,
            amount,
            tier,
            referrer,
            delegated: false,
        }
    }

    pub const fn dpos(&self) -> &D {
        &self.dpos
    }

    pub const fn coin(&self) -> &C {
        &self.coin
    }
}

impl<D, C> crate::Action for DelegateAction<D, C>
where
    D: Dpos,
    C: Coin,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(self.amount > U256::ZERO)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.delegated)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        if self.amount == U256::ZERO {
            eyre::bail!("Delegation amount is zero");
        }

        let approval = self.coin.approve(self.dpos.address(), self.amount).await?;
        info!(tx_hash = %approval.hash, spender = %self.dpos.address(), "Approved DPoS contract");

        let receipt = self
            .dpos
            .delegate(
                &self.validator,
                self.amount,
                self.tier,
                self.referrer.as_deref(),
            )
            .await?;
        self.delegated = true;

        info!(
            tx_hash = %receipt.hash,
            validator = %self.validator,
            amount = %self.amount,
            tier = %self.tier,
            "Delegated"
        );
        Ok(receipt.into())
    }

    fn description(&self) -> String {
        format!(
            "Delegate {} LOOM to {} locked for {}",
            format_coin_amount(self.amount),
            self.validator,
            self.tier
        )
    }
}

/// Unbond (part of) a delegation.
pub struct UndelegateAction<D> {
    dpos: D,
    validator: ChainAddress,
    amount: U256,
    index: u64,
    unbonded: bool,
}

impl<D> UndelegateAction<D>
where
    D: Dpos,
{
    pub const fn new(dpos: D, validator: ChainAddress, amount: U256, index: u64) -> Self {
        Self {
            dpos,
            validator,
            amount,
            index,
            unbonded: false,
        }
    }

    pub const fn dpos(&self) -> &D {
        &self.dpos
    }
}

impl<D> crate::Action for UndelegateAction<D>
where
    D: Dpos,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(true)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.unbonded)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        let receipt = self
            .dpos
            .unbond(&self.validator, self.amount, self.index)
            .await?;
        self.unbonded = true;

        info!(
            tx_hash = %receipt.hash,
            validator = %self.validator,
            index = self.index,
            "Undelegated"
        );
        Ok(receipt.into())
    }

    fn description(&self) -> String {
        format!(
            "Undelegate {} LOOM from {} (delegation {})",
            format_coin_amount(self.amount),
            self.validator,
            self.index
        )
    }
}

/// Move (part of) a delegation from one validator to another.
pub struct RedelegateAction<D> {
    dpos: D,
    former_validator: ChainAddress,
    validator: ChainAddress,
    amount: U256,
    index: u64,
    redelegated: bool,
}

impl<D> RedelegateAction<D>
where
    D: Dpos,
{
    pub const fn new(
        dpos: D,
        former_validator: ChainAddress,
        validator: ChainAddress,
        amount: U256,
        index: u64,
    ) -> Self {
        Self {
            dpos,
            former_validator,
            validator,
            amount,
            index,
            redelegated: false,
        }
    }

    pub const fn dpos(&self) -> &D {
        &self.dpos
    }
}

impl<D> crate::Action for RedelegateAction<D>
where
    D: Dpos,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(self.former_validator != self.validator)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.redelegated)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        if self.former_validator == self.validator {
            eyre::bail!("Cannot redelegate to the same validator {}", self.validator);
        }

        let receipt = self
            .dpos
            .redelegate(
                &self.former_validator,
                &self.validator,
                self.amount,
                self.index,
            )
            .await?;
        self.redelegated = true;

        info!(
            tx_hash = %receipt.hash,
            from = %self.former_validator,
            to = %self.validator,
            "Redelegated"
        );
        Ok(receipt.into())
    }

    fn description(&self) -> String {
        format!(
            "Redelegate {} LOOM from {} to {}",
            format_coin_amount(self.amount),
            self.former_validator,
            self.validator
        )
    }
}
