use ethers::types::Address;
use parking_lot::RwLock;
use silius_mempool::{Mempool, Reputation};
use silius_primitives::{
    reputation::ReputationEntry, simulation::CodeHash, UserOperationHash, UserOperationSigned,
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

/// Builds a `Mempool`/`Reputation` pair backed by in-memory storage, the same wiring the
/// bundler binary uses when no persistent store is configured.
#[allow(clippy::type_complexity)]
pub fn setup_mempool_reputation() -> (Mempool, Reputation) {
    let mempool = Mempool::new(
        Box::new(Arc::new(RwLock::new(
            HashMap::<UserOperationHash, UserOperationSigned>::default(),
        ))),
        Box::new(Arc::new(RwLock::new(HashMap::<Address, HashSet<UserOperationHash>>::default()))),
        Box::new(Arc::new(RwLock::new(HashMap::<Address, HashSet<UserOperationHash>>::default()))),
        Box::new(Arc::new(RwLock::new(HashMap::<UserOperationHash, Vec<CodeHash>>::default()))),
    );
    let reputation = Reputation::new(
        10,
        10,
        10,
        1u64.into(),
        1u64.into(),
        Arc::new(RwLock::new(HashSet::<Address>::default())),
        Arc::new(RwLock::new(HashSet::<Address>::default())),
        Box::new(Arc::new(RwLock::new(HashMap::<Address, ReputationEntry>::default()))),
    );
    (mempool, reputation)
}
