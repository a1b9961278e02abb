use crate::bundler::SendBundleOp;
use ethers::{providers::Middleware, types::H256};
use eyre::format_err;
use parking_lot::RwLock;
use silius_mempool::validate::UserOperationValidator;
use silius_primitives::bundler::BundleMode;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::bundle::BundleManager;

/// How often the interval-driven trigger re-checks the current [BundleMode] when it is
/// `Manual` or `Auto(0)` and therefore not itself sleeping toward a bundle attempt.
const MODE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Decides when to call [BundleManager::send_next_bundle], funneling both the size-driven
/// (on admission) and interval-driven (on a timer) triggers through the same mutex so a
/// bundling cycle is never entered twice concurrently.
pub struct ExecutionManager<M: Middleware + 'static, V: UserOperationValidator, C: SendBundleOp> {
    bundler: Arc<Mutex<BundleManager<M, V, C>>>,
    mode: Arc<RwLock<BundleMode>>,
    auto_bundle_size: usize,
}

impl<M, V, C> ExecutionManager<M, V, C>
where
    M: Middleware + 'static,
    V: UserOperationValidator + Send + Sync + 'static,
    C: SendBundleOp + 'static,
{
    pub fn new(bundler: BundleManager<M, V, C>, mode: BundleMode, auto_bundle_size: usize) -> Self {
        Self {
            bundler: Arc::new(Mutex::new(bundler)),
            mode: Arc::new(RwLock::new(mode)),
            auto_bundle_size,
        }
    }

    pub fn mode(&self) -> BundleMode {
        *self.mode.read()
    }

    pub fn set_mode(&self, mode: BundleMode) {
        *self.mode.write() = mode;
    }

    /// Spawns the interval-driven trigger. Sleeps for `Auto(interval)`'s `interval` seconds
    /// between attempts; while the mode is `Manual` or `Auto(0)` it just polls for a mode
    /// change instead of attempting to bundle.
    pub fn spawn_interval_trigger(&self) {
        let bundler = self.bundler.clone();
        let mode = self.mode.clone();

        tokio::spawn(async move {
            loop {
                let sleep_for = match *mode.read() {
                    BundleMode::Auto(interval) if interval > 0 => Duration::from_secs(interval),
                    _ => MODE_POLL_INTERVAL,
                };

                tokio::time::sleep(sleep_for).await;

                if !matches!(*mode.read(), BundleMode::Auto(interval) if interval > 0) {
                    continue;
                }

                Self::trigger(&bundler).await;
            }
        });
    }

    /// Called on every successful user operation admission. Triggers a bundle attempt if the
    /// mempool has reached `auto_bundle_size` (or on every admission when it is `0`), but only
    /// while the bundler is in automatic mode.
    pub async fn notify_admitted(&self, mempool_size: usize) {
        if !matches!(*self.mode.read(), BundleMode::Auto(_)) {
            return;
        }

        if self.auto_bundle_size == 0 || mempool_size >= self.auto_bundle_size {
            Self::trigger(&self.bundler).await;
        }
    }

    /// Forces a bundle attempt regardless of mode, for the `debug_bundler_sendBundleNow` RPC.
    pub async fn send_bundle_now(&self) -> eyre::Result<H256> {
        let mut bundler = self.bundler.lock().await;
        bundler
            .send_next_bundle()
            .await?
            .ok_or_else(|| format_err!("no user operations to bundle"))
    }

    pub fn bundler(&self) -> Arc<Mutex<BundleManager<M, V, C>>> {
        self.bundler.clone()
    }

    async fn trigger(bundler: &Arc<Mutex<BundleManager<M, V, C>>>) {
        let mut bundler = bundler.lock().await;
        match bundler.send_next_bundle().await {
            Ok(Some(tx_hash)) => info!("Bundle sent: {tx_hash:?}"),
            Ok(None) => {}
            Err(err) => error!("Bundle cycle failed: {err:?}"),
        }
    }
}

/// Object-safe handle to an [ExecutionManager], used by the RPC layer so it doesn't need to
/// carry the bundler's execution-client type parameter.
#[async_trait::async_trait]
pub trait BundleHandle: Send + Sync {
    fn mode(&self) -> BundleMode;
    fn set_mode(&self, mode: BundleMode);
    async fn send_bundle_now(&self) -> eyre::Result<H256>;
}

#[async_trait::async_trait]
impl<M, V, C> BundleHandle for ExecutionManager<M, V, C>
where
    M: Middleware + 'static,
    V: UserOperationValidator + Send + Sync + 'static,
    C: SendBundleOp + 'static,
{
    fn mode(&self) -> BundleMode {
        ExecutionManager::mode(self)
    }

    fn set_mode(&self, mode: BundleMode) {
        ExecutionManager::set_mode(self, mode)
    }

    async fn send_bundle_now(&self) -> eyre::Result<H256> {
        ExecutionManager::send_bundle_now(self).await
    }
}
