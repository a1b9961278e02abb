use ethers::types::{transaction::eip2718::TypedTransaction, H256};
use silius_primitives::simulation::StorageMap;

/// Submits an assembled `handleOps` transaction to the network. Implementations differ in
/// how the transaction reaches the execution client: as a plain transaction, or pinned to the
/// storage state the simulation relied on via the conditional RPC method.
#[async_trait::async_trait]
pub trait SendBundleOp: Send + Sync {
    /// Sends a bundle transaction.
    ///
    /// # Arguments
    /// * `bundle` - The `handleOps` transaction to send.
    /// * `storage_map` - The storage slots the bundle's simulation read, used by conditional
    ///   senders to pin the state the bundle was built against.
    ///
    /// # Returns
    /// The hash of the submitted transaction.
    async fn send_bundle(
        &self,
        bundle: TypedTransaction,
        storage_map: StorageMap,
    ) -> eyre::Result<H256>;
}
