//! Text rendering of command results for stdout.

use action::amount::format_coin_amount;
use alloy_primitives::{hex, Address, U256};
use dappchain::types::{
    Candidate, Delegation, DelegatorDelegations, Validator, ValidatorDelegations,
    WithdrawalReceipt,
};
use std::fmt::Write;
use withdrawal::WithdrawalOutcome;

/// Pending receipt with the mainnet gateway's view of the owner's nonce.
pub fn receipt(
    receipt: &WithdrawalReceipt,
    gateway_nonce: U256,
    token: Address,
    gateway: Address,
) -> String {
    let mut out = String::from("Pending receipt:\n");
    let _ = writeln!(out, "Token owner: {}", receipt.token_owner);
    let _ = writeln!(out, "Token address: {token}");
    let _ = writeln!(out, "Gateway address: {gateway}");
    let _ = writeln!(out, "Contract: {}", receipt.token_contract);
    let _ = writeln!(out, "Token kind: {}", receipt.token_kind);
    let _ = writeln!(out, "Nonce: {}", receipt.withdrawal_nonce);
    let _ = writeln!(out, "Contract Nonce: {gateway_nonce}");
    let _ = writeln!(out, "Amount: {}", format_coin_amount(receipt.token_amount));
    let _ = writeln!(
        out,
        "Signature: {}",
        hex::encode_prefixed(&receipt.oracle_signature)
    );
    out
}

pub fn withdrawal_outcome(outcome: &WithdrawalOutcome) -> String {
    match outcome {
        WithdrawalOutcome::NothingPending => "No pending withdrawal to resume".to_string(),
        WithdrawalOutcome::AlreadyRedeemed(receipt) => format!(
            "Receipt with nonce {} was already redeemed on mainnet",
            receipt.withdrawal_nonce
        ),
        WithdrawalOutcome::Completed { receipt, tx_hash } => format!(
            "{} tokens withdrawn from Ethereum Gateway.\nMainnet tx hash: {tx_hash}",
            format_coin_amount(receipt.token_amount)
        ),
    }
}

pub fn validators(validators: &[Validator]) -> String {
    let mut out = String::from("Current validators:\n");
    for validator in validators {
        let _ = writeln!(out, "  Address: {}", validator.address);
        let _ = writeln!(out, "  Slash percentage: {}", validator.slash_percentage);
        let _ = writeln!(
            out,
            "  Delegation total: {}",
            format_coin_amount(validator.delegation_total)
        );
        out.push('\n');
    }
    out
}

pub fn candidates(candidates: &[Candidate]) -> String {
    let mut out = String::from("Current candidates:\n");
    for candidate in candidates {
        let _ = writeln!(out, "  Pubkey: {}", candidate.pub_key);
        let _ = writeln!(out, "  Address: {}", candidate.address);
        let _ = writeln!(out, "  Fee: {}", candidate.fee);
        let _ = writeln!(out, "  New fee: {}", candidate.new_fee);
        let _ = writeln!(out, "  State: {:?}", candidate.candidate_state);
        let _ = writeln!(
            out,
            "  Whitelist amount: {}",
            format_coin_amount(candidate.whitelist_amount)
        );
        let _ = writeln!(
            out,
            "  Whitelist locktime tier: {}",
            candidate.whitelist_locktime_tier
        );
        let _ = writeln!(out, "  Name: {}", candidate.name);
        let _ = writeln!(out, "  Description: {}", candidate.description);
        let _ = writeln!(out, "  Website: {}", candidate.website);
        out.push('\n');
    }
    out
}

fn delegation(out: &mut String, delegation: &Delegation) {
    let _ = writeln!(out, "  Validator: {}", delegation.validator);
    let _ = writeln!(out, "  Delegator: {}", delegation.delegator);
    let _ = writeln!(out, "  Index: {}", delegation.index);
    let _ = writeln!(out, "  Amount: {}", format_coin_amount(delegation.amount));
    let _ = writeln!(
        out,
        "  Update amount: {}",
        format_coin_amount(delegation.update_amount)
    );
    if let Some(update_validator) = &delegation.update_validator {
        let _ = writeln!(out, "  Update validator: {update_validator}");
    }
    let _ = writeln!(out, "  Locktime: {}", delegation.lock_time);
    let _ = writeln!(out, "  Locktime tier: {}", delegation.lock_time_tier);
    if let Some(referrer) = &delegation.referrer {
        let _ = writeln!(out, "  Referrer: {referrer}");
    }
    let _ = writeln!(out, "  State: {:?}", delegation.state);
    out.push('\n');
}

pub fn validator_delegations(delegations: &ValidatorDelegations) -> String {
    let mut out = format!(
        "Delegation total: {}\n",
        format_coin_amount(delegations.delegation_total)
    );
    for entry in &delegations.delegations {
        delegation(&mut out, entry);
    }
    out
}

pub fn all_delegations(all: &[ValidatorDelegations]) -> String {
    all.iter().map(validator_delegations).collect::<Vec<_>>().join("\n")
}

pub fn delegator_delegations(delegations: &DelegatorDelegations) -> String {
    let mut out = format!(
        "Total delegated amount: {}\nTotal weighted amount: {}\n",
        format_coin_amount(delegations.amount),
        format_coin_amount(delegations.weighted_amount)
    );
    for entry in &delegations.delegations {
        delegation(&mut out, entry);
    }
    out
}
