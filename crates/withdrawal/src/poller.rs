//! Withdrawal state machine.
//!
//! `withdraw` and `resume-withdrawal` both enter through [`WithdrawalPoller::run`].
//! The initial state comes from the sidechain gateway's pending receipt for the
//! owner; from there the poller requests a withdrawal if needed, waits for the
//! oracle signature and redeems the signed receipt on mainnet.

use crate::{
    clock::{Clock, TokioClock},
    types::{WithdrawalOutcome, WithdrawalRequest, WithdrawalState},
};
use alloy_primitives::{TxHash, U256};
use dappchain::types::WithdrawalReceipt;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Interval between two receipt queries while waiting for the oracle.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Sidechain side of a withdrawal.
pub trait SidechainWithdrawals: Send + Sync {
    /// The owner's pending receipt on the sidechain gateway.
    fn pending_receipt(
        &self,
    ) -> impl Future<Output = eyre::Result<Option<WithdrawalReceipt>>> + Send;

    /// Approve the gateway and ask it to open a receipt for `amount`.
    fn request_withdrawal(&self, amount: U256) -> impl Future<Output = eyre::Result<()>> + Send;
}

/// Mainnet side of a withdrawal.
pub trait MainnetWithdrawals: Send + Sync {
    /// Whether the mainnet gateway has already consumed `receipt`.
    fn is_redeemed(
        &self,
        receipt: &WithdrawalReceipt,
    ) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Submit the signed receipt and wait for the transaction to be mined.
    fn redeem(
        &self,
        receipt: &WithdrawalReceipt,
    ) -> impl Future<Output = eyre::Result<TxHash>> + Send;
}

#[derive(Error, Debug)]
pub enum WithdrawalError {
    /// The oracle did not sign within the caller's timeout
    #[error("receipt was not signed by the oracle within {0:?}")]
    Timeout(Duration),

    #[error("withdrawal polling cancelled")]
    Cancelled,

    /// The initial receipt query failed
    #[error("failed to query pending withdrawal receipt: {0}")]
    Sidechain(eyre::Report),

    #[error("failed to request withdrawal on the DAppChain: {0}")]
    Request(eyre::Report),

    #[error("mainnet withdrawal failed: {0}")]
    Mainnet(eyre::Report),
}

/// Drives a withdrawal from whatever state the sidechain reports to completion.
pub struct WithdrawalPoller<S, M, C = TokioClock> {
    sidechain: S,
    mainnet: M,
    clock: C,
    interval: Duration,
    timeout: Option<Duration>,
    cancel: Option<watch::Receiver<bool>>,
}

impl<S, M> WithdrawalPoller<S, M, TokioClock> {
    pub const fn new(sidechain: S, mainnet: M) -> Self {
        Self {
            sidechain,
            mainnet,
            clock: TokioClock,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancel: None,
        }
    }
}

impl<S, M, C> WithdrawalPoller<S, M, C> {
    /// Replace the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> WithdrawalPoller<S, M, C2> {
        WithdrawalPoller {
            sidechain: self.sidechain,
            mainnet: self.mainnet,
            clock,
            interval: self.interval,
            timeout: self.timeout,
            cancel: self.cancel,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Give up waiting for the oracle after `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop waiting once `true` is published on the channel.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub const fn sidechain(&self) -> &S {
        &self.sidechain
    }

    pub const fn mainnet(&self) -> &M {
        &self.mainnet
    }
}

impl<S, M, C> WithdrawalPoller<S, M, C>
where
    S: SidechainWithdrawals,
    M: MainnetWithdrawals,
    C: Clock,
{
    /// Query the sidechain once and classify the owner's withdrawal.
    pub async fn initial_state(&self) -> Result<WithdrawalState, WithdrawalError> {
        let pending = self
            .sidechain
            .pending_receipt()
            .await
            .map_err(WithdrawalError::Sidechain)?;

        Ok(WithdrawalState::from_pending(pending))
    }

    /// Run the withdrawal to a terminal state.
    pub async fn run(
        &self,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalOutcome, WithdrawalError> {
        let mut state = self.initial_state().await?;
        info!(%state, ?request, "Starting withdrawal");

        if let (WithdrawalRequest::Withdraw(amount), Some(pending)) =
            (request, pending_receipt(&state))
        {
            if pending.token_amount != amount {
                warn!(
                    requested = %amount,
                    pending = %pending.token_amount,
                    "A withdrawal is already pending, finishing it instead of requesting a new one"
                );
            }
        }

        loop {
            state = match state {
                WithdrawalState::NoPendingReceipt => match request {
                    WithdrawalRequest::Resume => {
                        info!("No pending withdrawal receipt to resume");
                        return Ok(WithdrawalOutcome::NothingPending);
                    }
                    WithdrawalRequest::Withdraw(amount) => {
                        self.sidechain
                            .request_withdrawal(amount)
                            .await
                            .map_err(WithdrawalError::Request)?;
                        info!(%amount, "Withdrawal requested on the DAppChain");
                        WithdrawalState::AwaitingSignature(None)
                    }
                },
                WithdrawalState::AwaitingSignature(_) => {
                    let receipt = self.await_signature().await?;
                    info!(nonce = %receipt.withdrawal_nonce, "Receipt signed by the oracle");
                    WithdrawalState::SignedReady(receipt)
                }
                WithdrawalState::SignedReady(receipt) => {
                    let redeemed = self
                        .mainnet
                        .is_redeemed(&receipt)
                        .await
                        .map_err(WithdrawalError::Mainnet)?;
                    if redeemed {
                        warn!(
                            nonce = %receipt.withdrawal_nonce,
                            "Receipt was already redeemed on mainnet, not resubmitting"
                        );
                        return Ok(WithdrawalOutcome::AlreadyRedeemed(receipt));
                    }

                    let tx_hash = self
                        .mainnet
                        .redeem(&receipt)
                        .await
                        .map_err(WithdrawalError::Mainnet)?;
                    info!(tx_hash = %tx_hash, amount = %receipt.token_amount, "Mainnet withdrawal mined");
                    WithdrawalState::Submitted { receipt, tx_hash }
                }
                WithdrawalState::Submitted { receipt, tx_hash } => {
                    return Ok(WithdrawalOutcome::Completed { receipt, tx_hash });
                }
            };
        }
    }

    /// Re-query the receipt every interval until the oracle signature appears.
    ///
    /// Query failures are logged and retried on the next tick. The deadline is
    /// checked after every query, so the last query before a timeout still counts.
    async fn await_signature(&self) -> Result<WithdrawalReceipt, WithdrawalError> {
        // A timeout too large to represent as an instant never expires.
        let deadline = self
            .timeout
            .and_then(|timeout| self.clock.now().checked_add(timeout));
        let mut cancel = self.cancel.clone();

        loop {
            let wait = deadline.map_or(self.interval, |deadline| {
                self.interval
                    .min(deadline.saturating_duration_since(self.clock.now()))
            });

            tokio::select! {
                biased;
                () = cancelled(&mut cancel) => return Err(WithdrawalError::Cancelled),
                () = self.clock.sleep(wait) => {}
            }

            match self.sidechain.pending_receipt().await {
                Ok(Some(receipt)) if receipt.is_signed() => return Ok(receipt),
                Ok(Some(_)) => debug!("Receipt not signed yet"),
                Ok(None) => debug!("No receipt visible yet"),
                Err(e) => warn!(error = %e, "Failed to query withdrawal receipt, will retry"),
            }

            if let (Some(deadline), Some(timeout)) = (deadline, self.timeout) {
                if self.clock.now() >= deadline {
                    return Err(WithdrawalError::Timeout(timeout));
                }
            }
        }
    }
}

const fn pending_receipt(state: &WithdrawalState) -> Option<&WithdrawalReceipt> {
    match state {
        WithdrawalState::AwaitingSignature(receipt) => receipt.as_ref(),
        WithdrawalState::SignedReady(receipt) => Some(receipt),
        WithdrawalState::NoPendingReceipt | WithdrawalState::Submitted { .. } => None,
    }
}

/// Resolves once cancellation is requested. A dropped sender never cancels.
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        let requested = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if requested {
            return;
        }
    }
    std::future::pending::<()>().await;
}
