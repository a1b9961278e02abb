use crate::{
    validate::{
        validator::StandardUserOperationValidator, SanityCheck, SimulationCheck,
        SimulationTraceCheck,
    },
    Mempool, Reputation, UoPool,
};
use alloy_chains::Chain;
use ethers::{
    providers::Middleware,
    types::{Address, U256},
};
use silius_contracts::EntryPoint;
use std::{sync::Arc, time::Duration};
use tracing::warn;

type StandardUoPool<M, SanCk, SimCk, SimTrCk> =
    UoPool<M, StandardUserOperationValidator<M, SanCk, SimCk, SimTrCk>>;

/// Builds a [UoPool](UoPool) and wires up its background maintenance task.
///
/// Reconciliation of included user operations against chain state is not driven by this
/// builder: that responsibility belongs to the bundler's event manager, which runs inline
/// with bundle assembly rather than on its own timer.
pub struct UoPoolBuilder<M, SanCk, SimCk, SimTrCk>
where
    M: Middleware + Clone + 'static,
    SanCk: SanityCheck<M>,
    SimCk: SimulationCheck,
    SimTrCk: SimulationTraceCheck<M>,
{
    eth_client: Arc<M>,
    entrypoint: Address,
    chain: Chain,
    max_verification_gas: U256,
    mempool: Mempool,
    reputation: Reputation,
    validator: StandardUserOperationValidator<M, SanCk, SimCk, SimTrCk>,
}

impl<M, SanCk, SimCk, SimTrCk> UoPoolBuilder<M, SanCk, SimCk, SimTrCk>
where
    M: Middleware + Clone + 'static,
    SanCk: SanityCheck<M> + Clone + 'static,
    SimCk: SimulationCheck + Clone + 'static,
    SimTrCk: SimulationTraceCheck<M> + Clone + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        eth_client: Arc<M>,
        entrypoint: Address,
        chain: Chain,
        max_verification_gas: U256,
        mempool: Mempool,
        reputation: Reputation,
        validator: StandardUserOperationValidator<M, SanCk, SimCk, SimTrCk>,
    ) -> Self {
        Self { eth_client, entrypoint, chain, max_verification_gas, mempool, reputation, validator }
    }

    /// Spawns a background task that decays entities' seen/included reputation counters once
    /// per hour.
    pub fn register_reputation_updates(&self) {
        let mut uopool = self.uopool();
        tokio::spawn(async move {
            loop {
                let _ = uopool
                    .reputation
                    .update_hourly()
                    .map_err(|e| warn!("Failed to update hourly reputation: {:?}", e));
                tokio::time::sleep(Duration::from_secs(60 * 60)).await;
            }
        });
    }

    pub fn uopool(&self) -> StandardUoPool<M, SanCk, SimCk, SimTrCk> {
        let entry_point = EntryPoint::<M>::new(self.eth_client.clone(), self.entrypoint);

        UoPool::<M, StandardUserOperationValidator<M, SanCk, SimCk, SimTrCk>>::new(
            entry_point,
            self.validator.clone(),
            self.mempool.clone(),
            self.reputation.clone(),
            self.max_verification_gas,
            self.chain,
        )
    }

    pub fn eth_client(&self) -> Arc<M> {
        self.eth_client.clone()
    }
}
