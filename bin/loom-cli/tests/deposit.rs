use crate::setup::{owner, DepositChain, SharedMapper};
use action::{
    deposit::DepositAction,
    mapping::{MapAccountsAction, MappingError},
    Action,
};
use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use dappchain::ChainAddress;


#[tokio::test]
async fn test_deposit_maps_accounts_first() {
    let mapper = SharedMapper::default();
    let signer = PrivateKeySigner::random();
    let mainnet = ChainAddress::ethereum(signer.address());

    let mut mapping = MapAccountsAction::new(mapper.clone(), signer, owner());
    let mut deposit = DepositAction::new(DepositChain::with_allowance(0), U256::from(500));

    let result = loom_cli::deposit(&mut mapping, &mut deposit).await.unwrap();

    assert_eq!(mapper.submissions(), 1);
    assert_eq!(
        mapper.mappings.lock().unwrap().clone(),
        vec![(owner(), mainnet)]
    );
    assert_eq!(result.block_number, Some(20));
    assert_eq!(
        deposit.gateway().deposits.lock().unwrap().clone(),
        vec![U256::from(500)]
    );
}

#[tokio::test]
async fn test_deposit_with_existing_mapping_submits_no_mapping() {
    let mapper = SharedMapper::default();
    let signer = PrivateKeySigner::random();
    mapper
        .mappings
        .lock()
        .unwrap()
        .push((owner(), ChainAddress::ethereum(signer.address())));

    let mut mapping = MapAccountsAction::new(mapper.clone(), signer, owner());
    let mut deposit = DepositAction::new(DepositChain::with_allowance(1_000), U256::from(500));

    loom_cli::deposit(&mut mapping, &mut deposit).await.unwrap();

    assert_eq!(mapper.submissions(), 0);
    assert!(deposit.is_completed().await.unwrap());
}

#[tokio::test]
async fn test_deposit_blocked_by_conflicting_mapping() {
    let mapper = SharedMapper::default();
    mapper.mappings.lock().unwrap().push((
        owner(),
        ChainAddress::ethereum(Address::repeat_byte(0xee)),
    ));

    let mut mapping = MapAccountsAction::new(mapper.clone(), PrivateKeySigner::random(), owner());
    let mut deposit = DepositAction::new(DepositChain::with_allowance(1_000), U256::from(500));

    let err = loom_cli::deposit(&mut mapping, &mut deposit)
        .await
        .unwrap_err();

    assert!(err.downcast_ref::<MappingError>().is_some());
    assert_eq!(mapper.submissions(), 0);
    assert!(deposit.gateway().deposits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_approval_only_when_allowance_is_short() {
    let mut covered = DepositAction::new(DepositChain::with_allowance(500), U256::from(500));
    covered.execute().await.unwrap();
    assert!(covered.gateway().approvals.lock().unwrap().is_empty());

    let mut short = DepositAction::new(DepositChain::with_allowance(499), U256::from(500));
    short.execute().await.unwrap();
    assert_eq!(
        short.gateway().approvals.lock().unwrap().clone(),
        vec![U256::from(500)]
    );
}

#[tokio::test]
async fn test_map_accounts_twice_is_idempotent() {
    let mapper = SharedMapper::default();
    let mut mapping = MapAccountsAction::new(mapper.clone(), PrivateKeySigner::random(), owner());

    assert!(mapping.ensure_mapped().await.unwrap().is_some());
    assert!(mapping.ensure_mapped().await.unwrap().is_none());
    assert_eq!(mapper.submissions(), 1);
}
