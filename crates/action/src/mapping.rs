//! Binding the caller's sidechain identity to their mainnet account.

use alloy_primitives::Bytes;
use alloy_signer::Signer;
use dappchain::{
    mapper::{identity_mapping_hash, PERSONAL_SIGN_MODE},
    AddressMapper, ChainAddress,
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{sidechain} is already mapped to {existing}, refusing to map it to {requested}")]
    Conflict {
        sidechain: ChainAddress,
        existing: ChainAddress,
        requested: ChainAddress,
    },
}

/// Current mapping of the sidechain identity relative to the requested one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingStatus {
    Unmapped,
    /// Already mapped to the requested mainnet account.
    Mapped,
    /// Mapped to a different mainnet account.
    Conflict(ChainAddress),
}

/// Idempotently map `sidechain` to the mainnet account of `signer`.
pub struct MapAccountsAction<M, S> {
    mapper: M,
    signer: S,
    sidechain: ChainAddress,
    mainnet: ChainAddress,
}

impl<M, S> MapAccountsAction<M, S>
where
    M: AddressMapper,
    S: Signer + Send + Sync,
{
    pub fn new(mapper: M, signer: S, sidechain: ChainAddress) -> Self {
        let mainnet = ChainAddress::ethereum(signer.address());
        Self {
            mapper,
            signer,
            sidechain,
            mainnet,
        }
    }

    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    pub const fn mainnet(&self) -> &ChainAddress {
        &self.mainnet
    }

    pub async fn status(&self) -> eyre::Result<MappingStatus> {
        let status = match self.mapper.get_mapping(&self.sidechain).await? {
            None => MappingStatus::Unmapped,
            Some(existing) if existing == self.mainnet => MappingStatus::Mapped,
            Some(existing) => MappingStatus::Conflict(existing),
        };
        Ok(status)
    }

    /// Map the accounts unless they already are. Returns `None` when there was
    /// nothing to do.
    pub async fn ensure_mapped(&mut self) -> eyre::Result<Option<crate::Result>> {
        if self.status().await? == MappingStatus::Mapped {
            info!(sidechain = %self.sidechain, mainnet = %self.mainnet, "Accounts already mapped");
            return Ok(None);
        }

        crate::Action::execute(self).await.map(Some)
    }

    /// Mode byte followed by the mainnet key's personal signature over the
    /// mapping hash.
    async fn mapping_signature(&self) -> eyre::Result<Bytes> {
        let hash = identity_mapping_hash(&self.sidechain, &self.mainnet);
        let signature = self.signer.sign_message(hash.as_slice()).await?;

        let mut encoded = Vec::with_capacity(66);
        encoded.push(PERSONAL_SIGN_MODE);
        encoded.extend_from_slice(&signature.as_bytes());
        Ok(encoded.into())
    }
}

impl<M, S> crate::Action for MapAccountsAction<M, S>
where
    M: AddressMapper,
    S: Signer + Send + Sync,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        Ok(!matches!(self.status().await?, MappingStatus::Conflict(_)))
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.status().await? == MappingStatus::Mapped)
    }

    /// Fails with [`MappingError::Conflict`] without submitting anything when the
    /// sidechain identity already points elsewhere.
    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        match self.status().await? {
            MappingStatus::Unmapped => {}
            MappingStatus::Mapped => eyre::bail!("{} is already mapped", self.sidechain),
            MappingStatus::Conflict(existing) => {
                return Err(MappingError::Conflict {
                    sidechain: self.sidechain.clone(),
                    existing,
                    requested: self.mainnet.clone(),
                }
                .into())
            }
        }

        let signature = self.mapping_signature().await?;
        let receipt = self
            .mapper
            .add_identity_mapping(&self.sidechain, &self.mainnet, signature)
            .await?;

        info!(
            tx_hash = %receipt.hash,
            sidechain = %self.sidechain,
            mainnet = %self.mainnet,
            "Accounts mapped"
        );

        Ok(receipt.into())
    }

    fn description(&self) -> String {
        format!("Map {} to {}", self.sidechain, self.mainnet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;
    use alloy_primitives::{Address, B256};
    use alloy_signer_local::PrivateKeySigner;
    use dappchain::TxReceipt;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockMapper {
        mappings: Mutex<Vec<(ChainAddress, ChainAddress)>>,
        submissions: Mutex<Vec<Bytes>>,
    }

    impl AddressMapper for MockMapper {
        async fn get_mapping(&self, from: &ChainAddress) -> dappchain::Result<Option<ChainAddress>> {
            Ok(self
                .mappings
                .lock()
                .unwrap()
                .iter()
                .find(|(f, _)| f == from)
                .map(|(_, to)| to.clone()))
        }

        async fn add_identity_mapping(
            &self,
            from: &ChainAddress,
            to: &ChainAddress,
            signature: Bytes,
        ) -> dappchain::Result<TxReceipt> {
            self.submissions.lock().unwrap().push(signature);
            self.mappings
                .lock()
                .unwrap()
                .push((from.clone(), to.clone()));
            Ok(TxReceipt {
                hash: B256::repeat_byte(0x33),
                height: 7,
                data: None,
            })
        }
    }

    fn sidechain() -> ChainAddress {
        ChainAddress::new("default", Address::repeat_byte(0x10))
    }

    #[tokio::test]
    async fn test_map_twice_submits_once() {
        let mut action =
            MapAccountsAction::new(MockMapper::default(), PrivateKeySigner::random(), sidechain());

        assert!(!action.is_completed().await.unwrap());
        assert!(action.ensure_mapped().await.unwrap().is_some());
        assert!(action.is_completed().await.unwrap());

        assert!(action.ensure_mapped().await.unwrap().is_none());
        assert_eq!(action.mapper().submissions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_mapping_submits_nothing() {
        let mapper = MockMapper::default();
        let other = ChainAddress::ethereum(Address::repeat_byte(0x99));
        mapper
            .mappings
            .lock()
            .unwrap()
            .push((sidechain(), other.clone()));

        let mut action = MapAccountsAction::new(mapper, PrivateKeySigner::random(), sidechain());

        assert!(!action.is_ready().await.unwrap());
        let err = action.ensure_mapped().await.unwrap_err();
        let conflict = err.downcast_ref::<MappingError>().unwrap();
        assert_eq!(
            conflict,
            &MappingError::Conflict {
                sidechain: sidechain(),
                existing: other,
                requested: action.mainnet().clone(),
            }
        );
        assert!(action.mapper().submissions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signature_recovers_to_mainnet_key() {
        let signer = PrivateKeySigner::random();
        let expected = signer.address();
        let mut action = MapAccountsAction::new(MockMapper::default(), signer, sidechain());

        action.execute().await.unwrap();

        let submitted = action.mapper().submissions.lock().unwrap()[0].clone();
        assert_eq!(submitted.len(), 66);
        assert_eq!(submitted[0], PERSONAL_SIGN_MODE);

        let signature = alloy_primitives::Signature::from_raw(&submitted[1..]).unwrap();
        let hash = identity_mapping_hash(&sidechain(), action.mainnet());
        assert_eq!(
            signature.recover_address_from_msg(hash.as_slice()).unwrap(),
            expected
        );
    }
}
