pub mod config;
pub mod output;
pub mod session;

use action::{
    deposit::{DepositAction, DepositGateway},
    mapping::MapAccountsAction,
    Action,
};
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use balance::{Balance, BalanceQuery, Monitor};
use dappchain::{types::LockTimeTier, AddressMapper};
use std::{
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{info, warn};
use withdrawal::{Clock, MainnetWithdrawals, SidechainWithdrawals, WithdrawalPoller};

/// Map the accounts if needed, then deposit.
///
/// Deposited tokens are credited to the sidechain account the mainnet account is
/// mapped to, so the mapping must exist before the deposit is mined.
pub async fn deposit<M, G>(
    mapping: &mut MapAccountsAction<M, PrivateKeySigner>,
    deposit: &mut DepositAction<G>,
) -> eyre::Result<action::Result>
where
    M: AddressMapper,
    G: DepositGateway,
{
    if let Some(mapped) = mapping.ensure_mapped().await? {
        info!(tx_hash = %mapped.tx_hash, "Mapped accounts before deposit");
    }

    info!("{}", deposit.description());
    deposit.execute().await
}

/// Apply the configured poll interval, timeout and cancellation to a poller.
pub fn withdrawal_poller<S, M, C>(
    poller: WithdrawalPoller<S, M, C>,
    interval: Duration,
    timeout: Option<Duration>,
    cancel: watch::Receiver<bool>,
) -> WithdrawalPoller<S, M, C>
where
    S: SidechainWithdrawals,
    M: MainnetWithdrawals,
    C: Clock,
{
    poller
        .with_interval(interval)
        .with_timeout(timeout)
        .with_cancellation(cancel)
}

/// Cancellation channel fed by `interrupt`.
///
/// The first interrupt publishes `true` so the poller stops waiting; the second
/// runs `force_exit` for calls that are still blocked on a chain. `interrupt`
/// resolves to `false` when the signal can no longer be received.
pub fn cancel_on_interrupt<I, F, X>(mut interrupt: I, force_exit: X) -> watch::Receiver<bool>
where
    I: FnMut() -> F + Send + 'static,
    F: Future<Output = bool> + Send,
    X: FnOnce() + Send + 'static,
{
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if !interrupt().await {
            return;
        }
        warn!("Interrupted, stopping withdrawal polling; interrupt again to exit immediately");
        let _ = tx.send(true);

        if interrupt().await {
            warn!("Interrupted again, exiting");
            force_exit();
        }
    });
    rx
}

/// Query a mainnet balance and, optionally, a sidechain balance concurrently.
pub async fn coin_balances<Mo: Monitor>(
    monitor: &Mo,
    mainnet: BalanceQuery,
    sidechain: Option<BalanceQuery>,
) -> eyre::Result<(Balance, Option<Balance>)> {
    match sidechain {
        Some(sidechain) => {
            let (mainnet, sidechain) = tokio::try_join!(
                monitor.query_balance(mainnet),
                monitor.query_balance(sidechain)
            )?;
            Ok((mainnet, Some(sidechain)))
        }
        None => Ok((monitor.query_balance(mainnet).await?, None)),
    }
}

/// Write a fresh private key to `<dir>/<prefix>_private_key`.
///
/// Refuses to overwrite an existing key file.
pub fn write_key(dir: impl AsRef<Path>, prefix: &str) -> eyre::Result<(PathBuf, Address)> {
    let path = dir.as_ref().join(format!("{prefix}_private_key"));
    if path.exists() {
        eyre::bail!("{} already exists", path.display());
    }

    let (signer, encoded) = client::generate_key();
    std::fs::write(&path, encoded)?;

    Ok((path, signer.address()))
}

/// Parse a lock-time tier argument (0 to 3).
pub fn parse_tier(input: &str) -> Result<LockTimeTier, String> {
    let tier: u8 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid lock-time tier {input:?}, expected 0-3"))?;
    LockTimeTier::try_from(tier)
}
