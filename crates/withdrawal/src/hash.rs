use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use dappchain::types::{TokenKind, WithdrawalReceipt};

/// Message prefix of an ERC20 withdrawal on the multisig gateway.
pub const WITHDRAW_ERC20_PREFIX: &[u8] = b"\x10Withdraw ERC20:\n";

/// Hash the validators sign for an ERC20 withdrawal on the multisig gateway.
///
/// `keccak256(prefix ++ owner ++ nonce ++ gateway ++ keccak256(amount ++ token))`,
/// every part packed as Solidity's `abi.encodePacked` does.
pub fn erc20_withdrawal_hash(
    owner: Address,
    nonce: U256,
    gateway: Address,
    amount: U256,
    token: Address,
) -> B256 {
    let amount_hash = keccak256((amount, token).abi_encode_packed());

    let mut message = WITHDRAW_ERC20_PREFIX.to_vec();
    message.extend_from_slice(&(owner, nonce, gateway, amount_hash).abi_encode_packed());

    keccak256(message)
}

/// Withdrawal hash of `receipt` as redeemed through `gateway`.
///
/// Only fungible receipts are supported; `None` for any other token kind.
pub fn receipt_withdrawal_hash(receipt: &WithdrawalReceipt, gateway: Address) -> Option<B256> {
    match receipt.token_kind {
        TokenKind::Erc20 | TokenKind::LoomCoin => Some(erc20_withdrawal_hash(
            receipt.token_owner.local,
            receipt.withdrawal_nonce,
            gateway,
            receipt.token_amount,
            receipt.token_contract.local,
        )),
        TokenKind::Eth | TokenKind::Erc721 | TokenKind::Erc721x => None,
    }
}
