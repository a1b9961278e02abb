//! Reconciles the mempool and reputation state against the EntryPoint contract's event log,
//! picking up where the last bundle cycle left off.

use crate::{Mempool, Reputation};
use ethers::{providers::Middleware, types::Address};
use silius_contracts::{
    entry_point::{AccountDeployedFilter, SignatureAggregatorChangedFilter, UserOperationEventFilter},
    EntryPoint,
};
use tracing::{debug, trace};

/// How many blocks to scan on the very first reconciliation, when there is no prior
/// `last_block` to resume from.
const MAX_SCAN_DEPTH: u64 = 1024;

/// Tracks the last block processed and replays `EntryPoint` events since then into the
/// mempool and reputation managers. Runs inline with bundle assembly rather than on its own
/// timer, so it always observes state consistent with the bundle currently being built.
pub struct EventsManager<M: Middleware + 'static> {
    entry_point: EntryPoint<M>,
    last_block: Option<u64>,
    active_aggregator: Option<Address>,
}

impl<M: Middleware + 'static> EventsManager<M> {
    pub fn new(entry_point: EntryPoint<M>) -> Self {
        Self { entry_point, last_block: None, active_aggregator: None }
    }

    /// Currently tracked signature aggregator, if the EntryPoint has ever reported one.
    pub fn active_aggregator(&self) -> Option<Address> {
        self.active_aggregator
    }

    /// Queries the `UserOperationEvent`, `AccountDeployed` and `SignatureAggregatorChanged`
    /// events emitted since the last reconciliation and applies them to `mempool` and
    /// `reputation`. Safe to call repeatedly: replaying an already-processed range is a no-op
    /// because `last_block` only ever advances.
    pub async fn sync(&mut self, mempool: &mut Mempool, reputation: &mut Reputation) -> eyre::Result<()> {
        let current_block = self.entry_point.eth_client().get_block_number().await?.as_u64();

        let from_block = match self.last_block {
            Some(last) => last.saturating_add(1),
            None => current_block.saturating_sub(MAX_SCAN_DEPTH),
        };

        if from_block > current_block {
            return Ok(());
        }

        let uo_events: Vec<UserOperationEventFilter> = self
            .entry_point
            .entry_point_api()
            .event::<UserOperationEventFilter>()
            .from_block(from_block)
            .to_block(current_block)
            .query()
            .await?;

        for event in uo_events.iter() {
            trace!("Reconciling included user operation {:?}", event.user_op_hash);
            mempool.remove(&event.user_op_hash.into()).ok();

            reputation.increment_included(&event.sender).ok();
            if event.paymaster != Address::zero() {
                reputation.increment_included(&event.paymaster).ok();
            }
        }

        let deployed_events: Vec<AccountDeployedFilter> = self
            .entry_point
            .entry_point_api()
            .event::<AccountDeployedFilter>()
            .from_block(from_block)
            .to_block(current_block)
            .query()
            .await?;

        for event in deployed_events.iter() {
            if event.factory != Address::zero() {
                reputation.increment_included(&event.factory).ok();
            }
        }

        let aggregator_events: Vec<SignatureAggregatorChangedFilter> = self
            .entry_point
            .entry_point_api()
            .event::<SignatureAggregatorChangedFilter>()
            .from_block(from_block)
            .to_block(current_block)
            .query()
            .await?;

        if let Some(event) = aggregator_events.last() {
            debug!("Signature aggregator changed to {:?}", event.aggregator);
            self.active_aggregator = Some(event.aggregator);
        }

        self.last_block = Some(current_block);

        Ok(())
    }
}
