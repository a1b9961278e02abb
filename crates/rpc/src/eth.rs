use crate::{error::JsonRpcError, eth_api::EthApiServer};
use async_trait::async_trait;
use ethers::{
    providers::Middleware,
    types::{Address, U64},
    utils::to_checksum,
};
use jsonrpsee::{core::RpcResult, types::ErrorObjectOwned};
use silius_mempool::{validate::UserOperationValidator, UoPool};
use silius_primitives::{
    UserOperation, UserOperationByHash, UserOperationGasEstimation, UserOperationHash,
    UserOperationReceipt, UserOperationRequest, UserOperationSigned,
};
use std::{str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::codes::USER_OPERATION_HASH;

/// EthApiServer implements the ERC-4337 `eth` namespace RPC methods trait [EthApiServer](EthApiServer).
pub struct EthApiServerImpl<M: Middleware + 'static, V: UserOperationValidator> {
    pub uopool: Arc<Mutex<UoPool<M, V>>>,
}

#[async_trait]
impl<M: Middleware + 'static, V: UserOperationValidator + 'static> EthApiServer
    for EthApiServerImpl<M, V>
{
    /// Retrieve the current [EIP-155](https://eips.ethereum.org/EIPS/eip-155) chain ID.
    ///
    /// # Returns
    /// * `RpcResult<U64>` - The chain ID as a U64.
    async fn chain_id(&self) -> RpcResult<U64> {
        let uopool = self.uopool.lock().await;
        Ok(uopool.chain.id().into())
    }

    /// Get the supported entry points for [UserOperations](UserOperation).
    ///
    /// # Returns
    /// * `RpcResult<Vec<String>>` - A array of the entry point addresses as strings.
    async fn supported_entry_points(&self) -> RpcResult<Vec<String>> {
        let uopool = self.uopool.lock().await;
        Ok(vec![to_checksum(&uopool.entry_point.address(), None)])
    }

    /// Validates and admits a [UserOperation](UserOperation) into the mempool. The hash the
    /// caller supplied is ignored; it's recomputed from the raw operation and the entry point
    /// being targeted.
    async fn send_user_operation(
        &self,
        uo: UserOperation,
        ep: Address,
    ) -> RpcResult<UserOperationHash> {
        let mut uopool = self.uopool.lock().await;

        if ep != uopool.entry_point.address() {
            return Err(unsupported_entry_point(ep));
        }

        let uo = recompute_hash(uo.user_operation, &ep, uopool.chain.id());
        let res = uopool.validate_user_operation(&uo, None).await;
        let uo_hash = uopool.add_user_operation(uo, res).await.map_err(JsonRpcError::from)?;

        Ok(uo_hash)
    }

    /// Estimate the gas required for a [UserOperation](UserOperation).
    async fn estimate_user_operation_gas(
        &self,
        uo: UserOperationRequest,
        ep: Address,
    ) -> RpcResult<UserOperationGasEstimation> {
        let uopool = self.uopool.lock().await;

        if ep != uopool.entry_point.address() {
            return Err(unsupported_entry_point(ep));
        }

        let uo = recompute_hash(uo.into(), &ep, uopool.chain.id());
        let estimation =
            uopool.estimate_user_operation_gas(&uo).await.map_err(JsonRpcError::from)?;

        Ok(estimation)
    }

    /// Retrieve the receipt of a [UserOperation](UserOperation).
    async fn get_user_operation_receipt(
        &self,
        uo_hash: String,
    ) -> RpcResult<Option<UserOperationReceipt>> {
        let uo_hash = parse_uo_hash(&uo_hash)?;
        let uopool = self.uopool.lock().await;

        match uopool.get_user_operation_receipt(&uo_hash).await {
            Ok(receipt) => Ok(Some(receipt)),
            Err(_) => Ok(None),
        }
    }

    /// Retrieve a [UserOperation](UserOperation) by its hash.
    async fn get_user_operation_by_hash(
        &self,
        uo_hash: String,
    ) -> RpcResult<Option<UserOperationByHash>> {
        let uo_hash = parse_uo_hash(&uo_hash)?;
        let uopool = self.uopool.lock().await;

        match uopool.get_user_operation_by_hash(&uo_hash).await {
            Ok(uo) => Ok(Some(uo)),
            Err(_) => Ok(None),
        }
    }
}

fn parse_uo_hash(uo_hash: &str) -> Result<UserOperationHash, ErrorObjectOwned> {
    UserOperationHash::from_str(uo_hash).map_err(|_| {
        ErrorObjectOwned::owned(
            USER_OPERATION_HASH,
            "Missing/invalid userOpHash".to_string(),
            None::<bool>,
        )
    })
}

fn unsupported_entry_point(ep: Address) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        USER_OPERATION_HASH,
        format!("Entry point {ep:?} not supported"),
        None::<bool>,
    )
}

fn recompute_hash(uo: UserOperationSigned, ep: &Address, chain_id: u64) -> UserOperation {
    let hash = uo.hash(ep, chain_id);
    UserOperation::from_user_operation_signed(hash, uo)
}
