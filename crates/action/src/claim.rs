use crate::amount::format_coin_amount;
use alloy_primitives::U256;
use dappchain::Dpos;
use tracing::info;

/// Claim the caller's delegation rewards.
pub struct ClaimRewardsAction<D> {
    dpos: D,
    claimed: Option<U256>,
}

impl<D> ClaimRewardsAction<D>
where
    D: Dpos,
{
    pub const fn new(dpos: D) -> Self {
        Self { dpos, claimed: None }
    }

    /// Amount paid out by the last execution.
    pub const fn claimed(&self) -> Option<U256> {
        self.claimed
    }
}

impl<D> crate::Action for ClaimRewardsAction<D>
where
    D: Dpos,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(true)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.claimed.is_some())
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        let (receipt, amount) = self.dpos.claim_rewards().await?;
        self.claimed = Some(amount);

        info!(
            tx_hash = %receipt.hash,
            amount = %format_coin_amount(amount),
            "Rewards claimed"
        );
        Ok(receipt.into())
    }

    fn description(&self) -> String {
        format!("Claim delegation rewards from {}", self.dpos.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dpos::mock::MockDpos, Action};

    #[tokio::test]
    async fn test_claim_records_amount() {
        let mut action = ClaimRewardsAction::new(MockDpos::default());
        assert!(!action.is_completed().await.unwrap());

        action.execute().await.unwrap();

        assert_eq!(action.claimed(), Some(U256::from(42)));
        assert!(action.is_completed().await.unwrap());
    }
}
