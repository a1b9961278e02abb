use crate::debug_api::{DebugApiServer, ResponseSuccess};
use async_trait::async_trait;
use ethers::{providers::Middleware, types::{Address, H256}};
use jsonrpsee::{core::RpcResult, types::ErrorObjectOwned};
use silius_bundler::BundleHandle;
use silius_mempool::{validate::UserOperationValidator, UoPool};
use silius_primitives::{
    reputation::{ReputationEntry, StakeInfoResponse},
    BundleMode, UserOperationRequest,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Implements the `debug_bundler` namespace, used by test harnesses and operators to inspect and
/// drive the mempool/bundler directly instead of waiting on their normal triggers.
pub struct DebugApiServerImpl<M: Middleware + 'static, V: UserOperationValidator> {
    pub uopool: Arc<Mutex<UoPool<M, V>>>,
    pub bundler: Arc<dyn BundleHandle>,
}

#[async_trait]
impl<M: Middleware + 'static, V: UserOperationValidator + 'static> DebugApiServer
    for DebugApiServerImpl<M, V>
{
    async fn clear_mempool(&self) -> RpcResult<ResponseSuccess> {
        self.uopool.lock().await.clear_mempool();
        Ok(ResponseSuccess::Ok)
    }

    async fn clear_reputation(&self) -> RpcResult<ResponseSuccess> {
        self.uopool.lock().await.clear_reputation();
        Ok(ResponseSuccess::Ok)
    }

    async fn clear_state(&self) -> RpcResult<ResponseSuccess> {
        self.uopool.lock().await.clear();
        Ok(ResponseSuccess::Ok)
    }

    async fn add_user_ops(
        &self,
        user_operations: Vec<UserOperationRequest>,
        ep: Address,
    ) -> RpcResult<ResponseSuccess> {
        let mut uopool = self.uopool.lock().await;

        if ep != uopool.entry_point.address() {
            return Err(internal("entry point not supported"));
        }

        let chain_id = uopool.chain.id();
        let uos = user_operations
            .into_iter()
            .map(|req| {
                let signed: silius_primitives::UserOperationSigned = req.into();
                let hash = signed.hash(&ep, chain_id);
                silius_primitives::UserOperation::from_user_operation_signed(hash, signed)
            })
            .collect();

        uopool.add_user_operations(uos, None).await.map_err(|err| internal(&err.to_string()))?;

        Ok(ResponseSuccess::Ok)
    }

    async fn dump_mempool(&self, ep: Address) -> RpcResult<Vec<UserOperationRequest>> {
        let uopool = self.uopool.lock().await;

        if ep != uopool.entry_point.address() {
            return Err(internal("entry point not supported"));
        }

        let mut uos: Vec<UserOperationRequest> = uopool
            .get_all()
            .map_err(|err| internal(&err.to_string()))?
            .into_iter()
            .map(|uo| uo.user_operation.into())
            .collect();
        uos.sort_by(|a, b| a.nonce.cmp(&b.nonce));
        Ok(uos)
    }

    async fn set_reputation(
        &self,
        entries: Vec<ReputationEntry>,
        ep: Address,
    ) -> RpcResult<ResponseSuccess> {
        let mut uopool = self.uopool.lock().await;

        if ep != uopool.entry_point.address() {
            return Err(internal("entry point not supported"));
        }

        uopool.set_reputation(entries).map_err(|err| internal(&err.to_string()))?;
        Ok(ResponseSuccess::Ok)
    }

    async fn dump_reputation(&self, ep: Address) -> RpcResult<Vec<ReputationEntry>> {
        let uopool = self.uopool.lock().await;

        if ep != uopool.entry_point.address() {
            return Err(internal("entry point not supported"));
        }

        Ok(uopool.get_reputation())
    }

    async fn set_bundling_mode(&self, mode: BundleMode) -> RpcResult<ResponseSuccess> {
        self.bundler.set_mode(mode);
        Ok(ResponseSuccess::Ok)
    }

    async fn send_bundle_now(&self) -> RpcResult<H256> {
        self.bundler.send_bundle_now().await.map_err(|err| internal(&err.to_string()))
    }

    async fn get_stake_status(
        &self,
        address: Address,
        ep: Address,
    ) -> RpcResult<StakeInfoResponse> {
        let uopool = self.uopool.lock().await;

        if ep != uopool.entry_point.address() {
            return Err(internal("entry point not supported"));
        }

        uopool.get_stake_info(&address).await.map_err(|err| internal(&err.to_string()))
    }
}

fn internal(message: &str) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        jsonrpsee::types::error::INTERNAL_ERROR_CODE,
        message.to_string(),
        None::<bool>,
    )
}
