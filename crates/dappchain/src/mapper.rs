//! Address mapper: binds a sidechain identity to a mainnet identity.

use crate::{ChainAddress, Result, RpcClient, TxReceipt};
use alloy_primitives::{keccak256, Bytes, B256};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Prefix byte marking a mapping signature as an EIP-191 personal signature.
pub const PERSONAL_SIGN_MODE: u8 = 1;

pub trait AddressMapper: Send + Sync {
    /// Address `from` is mapped to, if any.
    fn get_mapping(
        &self,
        from: &ChainAddress,
    ) -> impl Future<Output = Result<Option<ChainAddress>>> + Send;

    /// Create the mapping `from <-> to`. `signature` is produced by the key of `to`
    /// over [`identity_mapping_hash`].
    fn add_identity_mapping(
        &self,
        from: &ChainAddress,
        to: &ChainAddress,
        signature: Bytes,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;
}

/// Digest the mainnet key signs to prove ownership when mapping.
///
/// `keccak256(from.local ++ to.local)`, i.e. Solidity `abi.encodePacked` of the
/// two local addresses.
pub fn identity_mapping_hash(from: &ChainAddress, to: &ChainAddress) -> B256 {
    let mut packed = Vec::with_capacity(40);
    packed.extend_from_slice(from.local.as_slice());
    packed.extend_from_slice(to.local.as_slice());
    keccak256(packed)
}

/// RPC-backed address mapper contract.
#[derive(Debug, Clone)]
pub struct MapperContract {
    client: RpcClient,
    address: ChainAddress,
}

impl MapperContract {
    pub const NAME: &'static str = "addressmapper";

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
struct GetMappingArgs<'a> {
    from: &'a ChainAddress,
}

#[derive(Deserialize)]
struct GetMappingResponse {
    #[serde(default)]
    to: Option<ChainAddress>,
}

#[derive(Serialize)]
struct AddMappingArgs<'a> {
    from: &'a ChainAddress,
    to: &'a ChainAddress,
    signature: Bytes,
}

impl AddressMapper for MapperContract {
    async fn get_mapping(&self, from: &ChainAddress) -> Result<Option<ChainAddress>> {
        let response: GetMappingResponse = self
            .client
            .query(&self.address, "GetMapping", GetMappingArgs { from })
            .await?;
        Ok(response.to)
    }

    async fn add_identity_mapping(
        &self,
        from: &ChainAddress,
        to: &ChainAddress,
        signature: Bytes,
    ) -> Result<TxReceipt> {
        self.client
            .call(
                &self.address,
                "AddIdentityMapping",
                AddMappingArgs {
                    from,
                    to,
                    signature,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn test_mapping_hash_is_order_sensitive() {
        let a = ChainAddress::new("default", Address::repeat_byte(1));
        let b = ChainAddress::ethereum(Address::repeat_byte(2));

        assert_ne!(identity_mapping_hash(&a, &b), identity_mapping_hash(&b, &a));
    }

    #[test]
    fn test_mapping_hash_ignores_chain_id() {
        let a = ChainAddress::new("default", Address::repeat_byte(1));
        let a_other = ChainAddress::new("extdev-plasma-us1", Address::repeat_byte(1));
        let b = ChainAddress::ethereum(Address::repeat_byte(2));

        assert_eq!(
            identity_mapping_hash(&a, &b),
            identity_mapping_hash(&a_other, &b)
        );
    }
}
