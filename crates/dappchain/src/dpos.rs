//! Delegated proof-of-stake contract (DPoS v3).

use crate::{
    types::{Candidate, DelegatorDelegations, LockTimeTier, Validator, ValidatorDelegations},
    ChainAddress, Result, RpcClient, TxReceipt,
};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub trait Dpos: Send + Sync {
    /// Address of the DPoS contract; delegations are paid through a coin
    /// allowance granted to it.
    fn address(&self) -> &ChainAddress;

    fn validators(&self) -> impl Future<Output = Result<Vec<Validator>>> + Send;

    fn candidates(&self) -> impl Future<Output = Result<Vec<Candidate>>> + Send;

    /// Delegations of every validator.
    fn all_delegations(&self) -> impl Future<Output = Result<Vec<ValidatorDelegations>>> + Send;

    /// Delegations held by one validator.
    fn validator_delegations(
        &self,
        validator: &ChainAddress,
    ) -> impl Future<Output = Result<ValidatorDelegations>> + Send;

    /// Every delegation made by `delegator`.
    fn delegator_delegations(
        &self,
        delegator: &ChainAddress,
    ) -> impl Future<Output = Result<DelegatorDelegations>> + Send;

    /// Delegations from `delegator` to `validator`.
    fn check_delegation(
        &self,
        validator: &ChainAddress,
        delegator: &ChainAddress,
    ) -> impl Future<Output = Result<DelegatorDelegations>> + Send;

    /// Seconds until the next election.
    fn time_until_election(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Claim the caller's rewards; returns the claimed amount.
    fn claim_rewards(&self) -> impl Future<Output = Result<(TxReceipt, U256)>> + Send;

    fn delegate(
        &self,
        validator: &ChainAddress,
        amount: U256,
        tier: LockTimeTier,
        referrer: Option<&str>,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;

    fn redelegate(
        &self,
        former_validator: &ChainAddress,
        validator: &ChainAddress,
        amount: U256,
        index: u64,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;

    fn unbond(
        &self,
        validator: &ChainAddress,
        amount: U256,
        index: u64,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;
}

/// RPC-backed DPoS contract.
#[derive(Debug, Clone)]
pub struct DposContract {
    client: RpcClient,
    address: ChainAddress,
}

impl DposContract {
    pub const NAME: &'static str = "dposV3";

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
struct NoArgs {}

#[derive(Serialize)]
struct ValidatorArgs<'a> {
    validator: &'a ChainAddress,
}

#[derive(Serialize)]
struct DelegatorArgs<'a> {
    delegator: &'a ChainAddress,
}

#[derive(Serialize)]
struct CheckDelegationArgs<'a> {
    validator: &'a ChainAddress,
    delegator: &'a ChainAddress,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DelegateArgs<'a> {
    validator: &'a ChainAddress,
    amount: U256,
    lock_time_tier: LockTimeTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RedelegateArgs<'a> {
    former_validator: &'a ChainAddress,
    validator: &'a ChainAddress,
    amount: U256,
    index: u64,
}

#[derive(Serialize)]
struct UnbondArgs<'a> {
    validator: &'a ChainAddress,
    amount: U256,
    index: u64,
}

#[derive(Deserialize)]
struct ValidatorsResponse {
    #[serde(default)]
    validators: Vec<Validator>,
}

#[derive(Deserialize)]
struct CandidatesResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct AllDelegationsResponse {
    #[serde(default)]
    delegations: Vec<ValidatorDelegations>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElectionTimeResponse {
    time_until_election: u64,
}

#[derive(Deserialize)]
struct ClaimedResponse {
    amount: U256,
}

impl Dpos for DposContract {
    fn address(&self) -> &ChainAddress {
        &self.address
    }

    async fn validators(&self) -> Result<Vec<Validator>> {
        let response: ValidatorsResponse = self
            .client
            .query(&self.address, "ListValidators", NoArgs {})
            .await?;
        Ok(response.validators)
    }

    async fn candidates(&self) -> Result<Vec<Candidate>> {
        let response: CandidatesResponse = self
            .client
            .query(&self.address, "ListCandidates", NoArgs {})
            .await?;
        Ok(response.candidates)
    }

    async fn all_delegations(&self) -> Result<Vec<ValidatorDelegations>> {
        let response: AllDelegationsResponse = self
            .client
            .query(&self.address, "ListAllDelegations", NoArgs {})
            .await?;
        Ok(response.delegations)
    }

    async fn validator_delegations(&self, validator: &ChainAddress) -> Result<ValidatorDelegations> {
        self.client
            .query(&self.address, "ListDelegations", ValidatorArgs { validator })
            .await
    }

    async fn delegator_delegations(&self, delegator: &ChainAddress) -> Result<DelegatorDelegations> {
        self.client
            .query(
                &self.address,
                "CheckAllDelegations",
                DelegatorArgs { delegator },
            )
            .await
    }

    async fn check_delegation(
        &self,
        validator: &ChainAddress,
        delegator: &ChainAddress,
    ) -> Result<DelegatorDelegations> {
        self.client
            .query(
                &self.address,
                "CheckDelegation",
                CheckDelegationArgs {
                    validator,
                    delegator,
                },
            )
            .await
    }

    async fn time_until_election(&self) -> Result<u64> {
        let response: ElectionTimeResponse = self
            .client
            .query(&self.address, "TimeUntilElection", NoArgs {})
            .await?;
        Ok(response.time_until_election)
    }

    async fn claim_rewards(&self) -> Result<(TxReceipt, U256)> {
        let receipt = self
            .client
            .call(&self.address, "ClaimDelegatorRewards", NoArgs {})
            .await?;
        let claimed: ClaimedResponse = receipt.decode()?;
        Ok((receipt, claimed.amount))
    }

    async fn delegate(
        &self,
        validator: &ChainAddress,
        amount: U256,
        tier: LockTimeTier,
        referrer: Option<&str>,
    ) -> Result<TxReceipt> {
        self.client
            .call(
                &self.address,
                "Delegate",
                DelegateArgs {
                    validator,
                    amount,
                    lock_time_tier: tier,
                    referrer,
                },
            )
            .await
    }

    async fn redelegate(
        &self,
        former_validator: &ChainAddress,
        validator: &ChainAddress,
        amount: U256,
        index: u64,
    ) -> Result<TxReceipt> {
        self.client
            .call(
                &self.address,
                "Redelegate",
                RedelegateArgs {
                    former_validator,
                    validator,
                    amount,
                    index,
                },
            )
            .await
    }

    async fn unbond(&self, validator: &ChainAddress, amount: U256, index: u64) -> Result<TxReceipt> {
        self.client
            .call(
                &self.address,
                "Unbond",
                UnbondArgs {
                    validator,
                    amount,
                    index,
                },
            )
            .await
    }
}
