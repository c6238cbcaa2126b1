//! Mainnet transfer gateway adapter.
//!
//! One adapter serves both gateway generations; only the withdrawal calldata
//! differs between them.

use crate::deposit::DepositGateway;
use alloy_primitives::{hex, Address, TxHash, U256};
use alloy_provider::Provider;
use binding::{
    gateway::{IERC20Gateway, IERC20MultisigGateway},
    token::IERC20,
    validators::IValidatorManager,
};
use config::GatewayVersion;
use dappchain::types::WithdrawalReceipt;
use tracing::{debug, info};
use withdrawal::{
    hash::receipt_withdrawal_hash, signature::parse_validator_signatures, MainnetWithdrawals,
};

/// The LOOM token and transfer gateway on Ethereum, bound to one owner account.
#[derive(Debug, Clone)]
pub struct EthereumGateway<P> {
    provider: P,
    gateway: Address,
    token: Address,
    version: GatewayVersion,
    owner: Address,
}

impl<P> EthereumGateway<P>
where
    P: Provider + Clone,
{
    pub const fn new(
        provider: P,
        gateway: Address,
        token: Address,
        version: GatewayVersion,
        owner: Address,
    ) -> Self {
        Self {
            provider,
            gateway,
            token,
            version,
            owner,
        }
    }

    pub const fn token(&self) -> Address {
        self.token
    }

    pub const fn version(&self) -> GatewayVersion {
        self.version
    }

    /// LOOM balance of `holder`.
    pub async fn token_balance(&self, holder: Address) -> eyre::Result<U256> {
        let token = IERC20::new(self.token, &self.provider);
        Ok(token.balanceOf(holder).call().await?)
    }

    /// Withdrawal nonce the gateway expects next from the owner.
    pub async fn nonce(&self) -> eyre::Result<U256> {
        let gateway = IERC20Gateway::new(self.gateway, &self.provider);
        Ok(gateway.nonces(self.owner).call().await?)
    }

    /// Current validator set of the multisig gateway, in index order.
    pub async fn validators(&self) -> eyre::Result<Vec<Address>> {
        let gateway = IERC20MultisigGateway::new(self.gateway, &self.provider);
        let manager = gateway.vmc().call().await?;

        let validators = IValidatorManager::new(manager, &self.provider)
            .getValidators()
            .call()
            .await?;
        debug!(manager = %manager, count = validators.len(), "Fetched validator set");

        Ok(validators)
    }

    fn check_receipt(&self, receipt: &WithdrawalReceipt) -> eyre::Result<()> {
        if !receipt.is_signed() {
            eyre::bail!("Receipt has no oracle signature");
        }

        if receipt.token_contract.local != self.token {
            eyre::bail!(
                "Receipt token {} does not match configured token {}",
                receipt.token_contract.local,
                self.token
            );
        }

        Ok(())
    }

    async fn withdraw_single_sig(&self, receipt: &WithdrawalReceipt) -> eyre::Result<TxHash> {
        debug!(
            signature = %hex::encode_prefixed(&receipt.oracle_signature),
            "Submitting single-signature withdrawal"
        );

        let gateway = IERC20Gateway::new(self.gateway, &self.provider);
        let tx = gateway
            .withdrawERC20(
                receipt.token_amount,
                receipt.oracle_signature.clone(),
                self.token,
            )
            .send()
            .await?;

        let tx_hash = *tx.tx_hash();
        let mined = tx.get_receipt().await?;
        if !mined.status() {
            eyre::bail!("Withdrawal transaction {tx_hash} reverted");
        }

        Ok(tx_hash)
    }

    async fn withdraw_multisig(&self, receipt: &WithdrawalReceipt) -> eyre::Result<TxHash> {
        let hash = receipt_withdrawal_hash(receipt, self.gateway).ok_or_else(|| {
            eyre::eyre!("Cannot withdraw {} tokens from this gateway", receipt.token_kind)
        })?;

        let validators = self.validators().await?;
        let signatures =
            parse_validator_signatures(&receipt.oracle_signature, hash, &validators)?;
        debug!(
            hash = %hash,
            signers = signatures.indexes.len(),
            "Submitting multisig withdrawal"
        );

        let gateway = IERC20MultisigGateway::new(self.gateway, &self.provider);
        let tx = gateway
            .withdrawERC20(
                receipt.token_amount,
                self.token,
                signatures.indexes,
                signatures.v,
                signatures.r,
                signatures.s,
            )
            .send()
            .await?;

        let tx_hash = *tx.tx_hash();
        let mined = tx.get_receipt().await?;
        if !mined.status() {
            eyre::bail!("Withdrawal transaction {tx_hash} reverted");
        }

        Ok(tx_hash)
    }
}

impl<P> DepositGateway for EthereumGateway<P>
where
    P: Provider + Clone,
{
    fn owner(&self) -> Address {
        self.owner
    }

    fn gateway(&self) -> Address {
        self.gateway
    }

    async fn allowance(&self) -> eyre::Result<U256> {
        let token = IERC20::new(self.token, &self.provider);
        Ok(token.allowance(self.owner, self.gateway).call().await?)
    }

    async fn approve(&self, amount: U256) -> eyre::Result<TxHash> {
        let token = IERC20::new(self.token, &self.provider);
        let tx = token.approve(self.gateway, amount).send().await?;

        let tx_hash = *tx.tx_hash();
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            eyre::bail!("Approval transaction {tx_hash} reverted");
        }

        Ok(tx_hash)
    }

    async fn deposit(&self, amount: U256) -> eyre::Result<crate::Result> {
        // Both gateway generations share the deposit entry point.
        let gateway = IERC20Gateway::new(self.gateway, &self.provider);
        let tx = gateway.depositERC20(amount, self.token).send().await?;

        let tx_hash = *tx.tx_hash();
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            eyre::bail!("Deposit transaction {tx_hash} reverted");
        }

        Ok(crate::Result {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }
}

impl<P> MainnetWithdrawals for EthereumGateway<P>
where
    P: Provider + Clone,
{
    async fn is_redeemed(&self, receipt: &WithdrawalReceipt) -> eyre::Result<bool> {
        let nonce = self.nonce().await?;
        debug!(gateway_nonce = %nonce, receipt_nonce = %receipt.withdrawal_nonce, "Checked gateway nonce");
        Ok(nonce > receipt.withdrawal_nonce)
    }

    async fn redeem(&self, receipt: &WithdrawalReceipt) -> eyre::Result<TxHash> {
        self.check_receipt(receipt)?;

        info!(
            amount = %receipt.token_amount,
            version = ?self.version,
            "Withdrawing from mainnet gateway"
        );

        match self.version {
            GatewayVersion::SingleSig => self.withdraw_single_sig(receipt).await,
            GatewayVersion::Multisig => self.withdraw_multisig(receipt).await,
        }
    }
}
