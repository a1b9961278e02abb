use ethers::types::{Address, U256};
use parking_lot::RwLock;
use silius_mempool::{Mempool, Reputation};
use silius_primitives::{
    reputation::{ReputationEntry, StakeInfo, Status},
    simulation::CodeHash,
    UserOperation, UserOperationHash, UserOperationSigned,
};
use silius_tests::common::setup_mempool_reputation;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

#[test]
fn mempool_orders_by_sender_and_fee() {
    let (mut mempool, _) = setup_mempool_reputation();
    let ep = Address::random();
    let chain_id = 1337u64;

    let low_fee = UserOperationSigned {
        max_priority_fee_per_gas: U256::from(1),
        ..UserOperationSigned::random()
    };
    let high_fee = UserOperationSigned {
        sender: low_fee.sender,
        nonce: low_fee.nonce + 1,
        max_priority_fee_per_gas: U256::from(2),
        ..UserOperationSigned::random()
    };

    let low_hash = low_fee.hash(&ep, chain_id);
    let high_hash = high_fee.hash(&ep, chain_id);

    mempool.add(UserOperation::from_user_operation_signed(low_hash, low_fee.clone())).unwrap();
    mempool.add(UserOperation::from_user_operation_signed(high_hash, high_fee.clone())).unwrap();

    let sorted = mempool.get_sorted().unwrap();
    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].user_operation, high_fee);
    assert_eq!(sorted[1].user_operation, low_fee);

    assert_eq!(mempool.get_all_by_sender(&low_fee.sender).len(), 2);
}

#[test]
fn mempool_remove_drops_user_operation() {
    let (mut mempool, _) = setup_mempool_reputation();
    let ep = Address::random();
    let uo = UserOperationSigned::random();
    let uo_hash = uo.hash(&ep, 1);

    mempool.add(UserOperation::from_user_operation_signed(uo_hash, uo)).unwrap();
    assert!(mempool.get(&uo_hash).unwrap().is_some());

    assert!(mempool.remove(&uo_hash).unwrap());
    assert!(mempool.get(&uo_hash).unwrap().is_none());
}

#[test]
fn reputation_throttles_then_bans_after_many_unincluded_ops() {
    // ban_slack > throttling_slack so both thresholds are actually reachable.
    let mut reputation = Reputation::new(
        10,
        5,
        20,
        1u64.into(),
        1u64.into(),
        Arc::new(RwLock::new(HashSet::<Address>::default())),
        Arc::new(RwLock::new(HashSet::<Address>::default())),
        Box::new(Arc::new(RwLock::new(
            std::collections::HashMap::<Address, ReputationEntry>::default(),
        ))),
    );
    let entity = Address::random();

    for _ in 0..109 {
        reputation.increment_seen(&entity).unwrap();
    }
    assert_eq!(Status::from(reputation.get_status(&entity).unwrap()), Status::THROTTLED);

    for _ in 0..150 {
        reputation.increment_seen(&entity).unwrap();
    }
    assert_eq!(Status::from(reputation.get_status(&entity).unwrap()), Status::BANNED);
}

#[test]
fn reputation_whitelist_overrides_ban() {
    let (_, mut reputation) = setup_mempool_reputation();
    let entity = Address::random();

    for _ in 0..300 {
        reputation.increment_seen(&entity).unwrap();
    }
    assert_eq!(Status::from(reputation.get_status(&entity).unwrap()), Status::BANNED);

    assert!(reputation.add_whitelist(&entity));
    assert_eq!(Status::from(reputation.get_status(&entity).unwrap()), Status::OK);
}

#[test]
fn mempool_evicts_lowest_tip_entry_when_full() {
    let mut mempool = Mempool::new_with_max_size(
        Box::new(Arc::new(RwLock::new(
            HashMap::<UserOperationHash, UserOperationSigned>::default(),
        ))),
        Box::new(Arc::new(RwLock::new(HashMap::<Address, HashSet<UserOperationHash>>::default()))),
        Box::new(Arc::new(RwLock::new(HashMap::<Address, HashSet<UserOperationHash>>::default()))),
        Box::new(Arc::new(RwLock::new(
            HashMap::<UserOperationHash, Vec<CodeHash>>::default(),
        ))),
        2,
    );
    let ep = Address::random();
    let chain_id = 1337u64;

    let low = UserOperationSigned { max_priority_fee_per_gas: U256::from(1), ..UserOperationSigned::random() };
    let mid = UserOperationSigned { max_priority_fee_per_gas: U256::from(2), ..UserOperationSigned::random() };
    let low_hash = low.hash(&ep, chain_id);
    let mid_hash = mid.hash(&ep, chain_id);

    mempool.add(UserOperation::from_user_operation_signed(low_hash, low.clone())).unwrap();
    mempool.add(UserOperation::from_user_operation_signed(mid_hash, mid.clone())).unwrap();

    // mempool is now full (max_size = 2); a submission that doesn't strictly beat the lowest
    // tip (1) is rejected.
    let rejected = UserOperationSigned {
        max_priority_fee_per_gas: U256::from(1),
        ..UserOperationSigned::random()
    };
    let rejected_hash = rejected.hash(&ep, chain_id);
    assert!(mempool
        .add(UserOperation::from_user_operation_signed(rejected_hash, rejected))
        .is_err());

    // a strictly higher tip evicts the lowest entry instead of being rejected.
    let high = UserOperationSigned {
        max_priority_fee_per_gas: U256::from(3),
        ..UserOperationSigned::random()
    };
    let high_hash = high.hash(&ep, chain_id);
    mempool.add(UserOperation::from_user_operation_signed(high_hash, high)).unwrap();

    assert!(mempool.get(&low_hash).unwrap().is_none());
    assert!(mempool.get(&mid_hash).unwrap().is_some());
    assert!(mempool.get(&high_hash).unwrap().is_some());
}

#[test]
fn reputation_verify_stake_rejects_low_stake() {
    let (_, reputation) = setup_mempool_reputation();
    let entity = Address::random();

    let info =
        StakeInfo { address: entity, stake: U256::zero(), unstake_delay: U256::from(100) };
    assert!(reputation.verify_stake("account", Some(info), None, None).is_err());

    let info = StakeInfo {
        address: entity,
        stake: reputation.min_stake(),
        unstake_delay: U256::from(100),
    };
    assert!(reputation.verify_stake("account", Some(info), None, None).is_ok());
}
