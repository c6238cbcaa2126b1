use crate::setup::{
    mainnet_token, owner, recipient, withdrawal_receipt, Answer, MainnetGateway, ManualClock,
    RecordingCoin, ScriptedGateway,
};
use action::withdraw::SidechainWithdrawal;
use alloy_primitives::U256;
use dappchain::{ChainAddress, TransferGateway};
use loom_cli::withdrawal_poller;
use std::time::Duration;
use tokio::sync::watch;
use withdrawal::{
    WithdrawalError, WithdrawalOutcome, WithdrawalPoller, WithdrawalRequest, WithdrawalState,
};


const INTERVAL: Duration = Duration::from_secs(2);

type Poller = WithdrawalPoller<
    SidechainWithdrawal<ScriptedGateway, RecordingCoin>,
    MainnetGateway,
    ManualClock,
>;

fn build_poller(
    gateway: ScriptedGateway,
    mainnet: MainnetGateway,
    clock: &ManualClock,
    timeout: Option<Duration>,
) -> (Poller, watch::Sender<bool>) {
    let sidechain = SidechainWithdrawal::new(
        gateway,
        RecordingCoin::default(),
        owner(),
        recipient(),
        mainnet_token(),
    );
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let poller = withdrawal_poller(
        WithdrawalPoller::new(sidechain, mainnet).with_clock(clock.clone()),
        INTERVAL,
        timeout,
        cancel_rx,
    );
    (poller, cancel_tx)
}

#[tokio::test]
async fn test_signature_after_n_polls_redeems_once() {
    // Unsigned for the initial query and three polls, signed on the fourth poll.
    let mut answers = vec![Answer::Receipt(Some(withdrawal_receipt(5, 0, false))); 4];
    answers.push(Answer::Receipt(Some(withdrawal_receipt(5, 0, true))));

    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(
        ScriptedGateway::new(answers),
        MainnetGateway::default(),
        &clock,
        None,
    );

    let outcome = poller.run(WithdrawalRequest::Resume).await.unwrap();

    let WithdrawalOutcome::Completed { receipt, .. } = outcome else {
        panic!("expected completed withdrawal, got {outcome:?}");
    };
    assert!(receipt.is_signed());
    assert_eq!(poller.sidechain().gateway().queries(), 5);
    assert_eq!(clock.elapsed(), INTERVAL * 4);
    assert_eq!(poller.mainnet().redemptions(), 1);
}

#[tokio::test]
async fn test_withdraw_requests_then_waits_for_oracle() {
    let gateway = ScriptedGateway::new(vec![Answer::Receipt(None)]).after_request(vec![
        Answer::Receipt(None),
        Answer::Receipt(Some(withdrawal_receipt(1_000, 0, false))),
        Answer::Receipt(Some(withdrawal_receipt(1_000, 0, true))),
    ]);

    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(gateway, MainnetGateway::default(), &clock, None);

    let outcome = poller
        .run(WithdrawalRequest::Withdraw(U256::from(1_000)))
        .await
        .unwrap();
    assert!(matches!(outcome, WithdrawalOutcome::Completed { .. }));

    let sidechain = poller.sidechain();
    let withdrawals = sidechain.gateway().withdrawals.lock().unwrap().clone();
    assert_eq!(
        withdrawals,
        vec![(
            U256::from(1_000),
            ChainAddress::ethereum(mainnet_token()),
            ChainAddress::ethereum(recipient()),
        )]
    );

    // The coin allowance goes to the sidechain gateway before the request.
    let approvals = sidechain.coin().approvals.lock().unwrap().clone();
    assert_eq!(
        approvals,
        vec![(sidechain.gateway().address().clone(), U256::from(1_000))]
    );
    assert_eq!(poller.mainnet().redemptions(), 1);
}

#[tokio::test]
async fn test_pending_receipt_is_finished_instead_of_requesting() {
    let gateway = ScriptedGateway::new(vec![Answer::Receipt(Some(withdrawal_receipt(
        7, 0, true,
    )))]);

    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(gateway, MainnetGateway::default(), &clock, None);

    let outcome = poller
        .run(WithdrawalRequest::Withdraw(U256::from(1_000)))
        .await
        .unwrap();

    let WithdrawalOutcome::Completed { receipt, .. } = outcome else {
        panic!("expected completed withdrawal, got {outcome:?}");
    };
    assert_eq!(receipt.token_amount, U256::from(7));
    assert!(poller
        .sidechain()
        .gateway()
        .withdrawals
        .lock()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_timeout_never_redeems_unsigned_receipt() {
    let gateway = ScriptedGateway::new(vec![Answer::Receipt(Some(withdrawal_receipt(
        5, 0, false,
    )))]);

    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(
        gateway,
        MainnetGateway::default(),
        &clock,
        Some(Duration::from_secs(6)),
    );

    let err = poller.run(WithdrawalRequest::Resume).await.unwrap_err();

    assert!(matches!(err, WithdrawalError::Timeout(t) if t == Duration::from_secs(6)));
    assert_eq!(clock.elapsed(), Duration::from_secs(6));
    assert_eq!(poller.sidechain().gateway().queries(), 4);
    assert_eq!(poller.mainnet().redemptions(), 0);
}

#[tokio::test]
async fn test_resume_without_receipt_is_a_no_op() {
    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(
        ScriptedGateway::new(vec![Answer::Receipt(None)]),
        MainnetGateway::default(),
        &clock,
        None,
    );

    assert_eq!(
        poller.initial_state().await.unwrap(),
        WithdrawalState::NoPendingReceipt
    );

    let outcome = poller.run(WithdrawalRequest::Resume).await.unwrap();

    assert_eq!(outcome, WithdrawalOutcome::NothingPending);
    assert!(poller
        .sidechain()
        .gateway()
        .withdrawals
        .lock()
        .unwrap()
        .is_empty());
    assert_eq!(poller.mainnet().redemptions(), 0);
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_already_redeemed_receipt_is_not_resubmitted() {
    let gateway = ScriptedGateway::new(vec![Answer::Receipt(Some(withdrawal_receipt(
        5, 2, true,
    )))]);

    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(gateway, MainnetGateway::with_nonce(3), &clock, None);

    let outcome = poller.run(WithdrawalRequest::Resume).await.unwrap();

    assert!(matches!(outcome, WithdrawalOutcome::AlreadyRedeemed(r) if r.withdrawal_nonce == U256::from(2)));
    assert_eq!(poller.mainnet().redemptions(), 0);
}

#[tokio::test]
async fn test_transient_query_errors_are_retried() {
    let gateway = ScriptedGateway::new(vec![
        Answer::Receipt(Some(withdrawal_receipt(5, 0, false))),
        Answer::Error,
        Answer::Error,
        Answer::Receipt(Some(withdrawal_receipt(5, 0, true))),
    ]);

    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(gateway, MainnetGateway::default(), &clock, None);

    let outcome = poller.run(WithdrawalRequest::Resume).await.unwrap();

    assert!(matches!(outcome, WithdrawalOutcome::Completed { .. }));
    assert_eq!(poller.sidechain().gateway().queries(), 4);
}

#[tokio::test]
async fn test_initial_query_error_is_fatal() {
    let clock = ManualClock::new();
    let (poller, _cancel) = build_poller(
        ScriptedGateway::new(vec![Answer::Error]),
        MainnetGateway::default(),
        &clock,
        None,
    );

    let err = poller.run(WithdrawalRequest::Resume).await.unwrap_err();

    assert!(matches!(err, WithdrawalError::Sidechain(_)));
    assert_eq!(poller.sidechain().gateway().queries(), 1);
}

#[tokio::test]
async fn test_cancellation_stops_polling() {
    let gateway = ScriptedGateway::new(vec![Answer::Receipt(Some(withdrawal_receipt(
        5, 0, false,
    )))]);

    let clock = ManualClock::new();
    let (poller, cancel) = build_poller(gateway, MainnetGateway::default(), &clock, None);
    cancel.send(true).unwrap();

    let err = poller.run(WithdrawalRequest::Resume).await.unwrap_err();

    assert!(matches!(err, WithdrawalError::Cancelled));
    assert_eq!(poller.sidechain().gateway().queries(), 1);
    assert_eq!(poller.mainnet().redemptions(), 0);
}
