use crate::{
    estimate::estimate_user_op_gas,
    mempool::Mempool,
    mempool_id,
    utils::div_ceil,
    validate::{UserOperationValidationOutcome, UserOperationValidator, UserOperationValidatorMode},
    InvalidMempoolUserOperationError, MempoolError, MempoolErrorKind, MempoolId, Overhead,
    Reputation, ReputationError, SanityError, SimulationError,
};
use alloy_chains::Chain;
use ethers::{
    prelude::LogMeta,
    providers::Middleware,
    types::{Address, U256},
};
use eyre::format_err;
use silius_contracts::{
    entry_point::UserOperationEventFilter, utils::parse_from_input_data, EntryPoint,
    EntryPointError,
};
use silius_primitives::{
    get_address,
    reputation::{ReputationEntry, StakeInfo, StakeInfoResponse},
    simulation::ValidationConfig,
    UserOperation, UserOperationByHash, UserOperationGasEstimation, UserOperationHash,
    UserOperationReceipt,
};
use tracing::{error, info, trace};

const FILTER_MAX_DEPTH: u64 = 10;
const PRE_VERIFICATION_SAFE_RESERVE_PERC: u64 = 10; // percentage how higher pre verification gas we return

/// The alternative mempool pool implementation that provides functionalities to add, remove,
/// validate, and serves data requests from the RPC API. Architecturally, the
/// [UoPool](UoPool) is the backend service managed by the RPC API and responsible for admission
/// of [UserOperations](UserOperation) into the mempool. Bundle assembly lives with the
/// bundler's `BundleManager`, not here.
pub struct UoPool<M: Middleware + 'static, V: UserOperationValidator> {
    /// The unique ID of the mempool
    pub id: MempoolId,
    /// The [EntryPoint](EntryPoint) contract object
    pub entry_point: EntryPoint<M>,
    /// The [UserOperationValidator](UserOperationValidator) object
    pub validator: V,
    /// The [Mempool](Mempool) object
    pub mempool: Mempool,
    /// The [Reputation](Reputation) object
    pub reputation: Reputation,
    // The maximum gas limit for [UserOperation](UserOperation) gas verification.
    pub max_verification_gas: U256,
    // The [EIP-155](https://eips.ethereum.org/EIPS/eip-155) chain ID
    pub chain: Chain,
}

impl<M: Middleware + 'static, V: UserOperationValidator> UoPool<M, V> {
    /// Creates a new [UoPool](UoPool) object
    ///
    /// # Arguments
    /// `entry_point` - The [EntryPoint](EntryPoint) contract object
    /// `validator` - The [UserOperationValidator](UserOperationValidator) object
    /// `mempool` - The [Mempool](Mempool) object
    /// `reputation` - The [Reputation](Reputation) object
    /// `max_verification_gas` - The maximum gas limit for [UserOperation](UserOperation) gas
    /// verification.
    /// `chain` - The [EIP-155](https://eips.ethereum.org/EIPS/eip-155) chain ID
    ///
    /// # Returns
    /// `Self` - The [UoPool](UoPool) object
    pub fn new(
        entry_point: EntryPoint<M>,
        validator: V,
        mempool: Mempool,
        reputation: Reputation,
        max_verification_gas: U256,
        chain: Chain,
    ) -> Self {
        Self {
            id: mempool_id(&entry_point.address(), chain.id()),
            entry_point,
            validator,
            mempool,
            reputation,
            max_verification_gas,
            chain,
        }
    }

    /// Returns all of the [UserOperations](UserOperation) in the mempool
    ///
    /// # Returns
    /// `Result<Vec<UserOperation>, eyre::Error>` - An array of [UserOperations](UserOperation)
    pub fn get_all(&self) -> eyre::Result<Vec<UserOperation>> {
        self.mempool.get_all().map_err(|err| {
            format_err!("Getting all user operations from mempool failed with error: {err:?}",)
        })
    }

    /// Returns an array of [ReputationEntry](ReputationEntry) for entities.
    ///
    /// # Returns
    /// `Vec<ReputationEntry>` - An array of [ReputationEntry](ReputationEntry)
    pub fn get_reputation(&self) -> Vec<ReputationEntry> {
        self.reputation.get_all().unwrap_or_default()
    }

    /// Sets the [ReputationEntry](ReputationEntry) for entities
    ///
    /// # Arguments
    /// `reputation` - An array of [ReputationEntry](ReputationEntry)
    ///
    /// # Returns
    /// `()` - Returns nothing
    pub fn set_reputation(
        &mut self,
        reputation: Vec<ReputationEntry>,
    ) -> Result<(), ReputationError> {
        self.reputation.set_entities(reputation)
    }

    /// Batch clears the [Mempool](Mempool).
    pub fn clear_mempool(&mut self) {
        self.mempool.clear();
    }

    /// Batch clears the [Reputation](Reputation).
    pub fn clear_reputation(&mut self) {
        self.reputation.clear();
    }

    /// Batch clears the [Mempool](Mempool) and [Reputation](Reputation).
    pub fn clear(&mut self) {
        self.mempool.clear();
        self.reputation.clear();
    }

    /// Adds bulk of [UserOperations](UserOperation) into the mempool.
    /// The function first validates the [UserOperations](UserOperation).
    ///
    /// # Arguments
    /// `user_operations` - The array of [UserOperations](UserOperation) to add
    /// `val_config` - The optional [ValidationConfig](ValidationConfig) object
    ///
    /// # Returns
    /// `Result<(), MempoolError>` - Ok if the [UserOperations](UserOperation) are added
    /// successfully into the mempool
    pub async fn add_user_operations(
        &mut self,
        user_operations: Vec<UserOperation>,
        val_config: Option<ValidationConfig>,
    ) -> Result<(), MempoolError> {
        for uo in user_operations {
            let res = self.validate_user_operation(&uo, val_config.clone()).await;
            self.add_user_operation(uo, res).await?;
        }

        Ok(())
    }

    /// Validates a single [UserOperation](UserOperation) and returns the validation outcome by
    /// calling [UserOperationValidator::validate_user_operation](UserOperationValidator::validate_user_operation)
    ///
    /// # Arguments
    /// `uo` - The [UserOperation](UserOperation) to validate
    /// `val_config` - The optional [ValidationConfig](ValidationConfig) object
    ///
    /// # Returns
    /// `Result<UserOperationValidationOutcome, InvalidMempoolUserOperationError>` - The validation
    /// outcome
    pub async fn validate_user_operation(
        &self,
        uo: &UserOperation,
        val_config: Option<ValidationConfig>,
    ) -> Result<UserOperationValidationOutcome, InvalidMempoolUserOperationError> {
        self.validator
            .validate_user_operation(
                uo,
                &self.mempool,
                &self.reputation,
                val_config,
                UserOperationValidatorMode::Sanity |
                    UserOperationValidatorMode::Simulation |
                    UserOperationValidatorMode::SimulationTrace,
            )
            .await
    }

    /// Adds a single validated user operation into the pool.
    /// Invoked by the RPC API to add a [UserOperation](UserOperation) into the mempool. The
    /// function first validates the [UserOperation](UserOperation) by calling
    /// [UoPool::validate_user_operation](UoPool::validate_user_operation). If
    /// [UserOperation](UserOperation) passes the validation, then adds it into the mempool by
    /// calling [Mempool::add](Mempool::add).
    ///
    /// # Arguments
    /// `uo` - The [UserOperation](UserOperation) to add
    /// `res` - The [UserOperationValidationOutcome](UserOperationValidationOutcome) of the
    /// validation
    ///
    /// # Returns
    /// `Result<UserOperationHash, MempoolError>` - The hash of the added
    /// [UserOperation](UserOperation)
    pub async fn add_user_operation(
        &mut self,
        uo: UserOperation,
        res: Result<UserOperationValidationOutcome, InvalidMempoolUserOperationError>,
    ) -> Result<UserOperationHash, MempoolError> {
        let res = match res {
            Ok(res) => res,
            Err(err) => {
                if let InvalidMempoolUserOperationError::Sanity(SanityError::Reputation(
                    ReputationError::BannedEntity { address, entity: _ },
                )) = err
                {
                    self.remove_user_operation_by_entity(&address);
                }
                return Err(MempoolError { hash: uo.hash, kind: err.into() });
            }
        };

        if let Some(uo_hash) = res.prev_hash {
            self.remove_user_operation(&uo_hash);
        }

        match self.mempool.add(uo.clone()) {
            Ok(uo_hash) => {
                if let Some(code_hashes) = res.code_hashes {
                    match self.mempool.set_code_hashes(&uo_hash, code_hashes){
                        Ok(_) => (),
                        Err(e) => error!("Failed to set code hashes for user operation {uo_hash:?} with error: {e:?}"),
                    }
                }
                info!("{uo_hash:?} added to the mempool {:?}", self.id);
                trace!("{uo:?} added to the mempool {:?}", self.id);

                // update reputation
                self.reputation
                    .increment_seen(&uo.sender)
                    .map_err(|e| MempoolError { hash: uo_hash, kind: e.into() })?;
                if let Some(f_addr) = get_address(&uo.init_code) {
                    self.reputation
                        .increment_seen(&f_addr)
                        .map_err(|e| MempoolError { hash: uo_hash, kind: e.into() })?;
                }
                if let Some(p_addr) = get_address(&uo.paymaster_and_data) {
                    self.reputation
                        .increment_seen(&p_addr)
                        .map_err(|e| MempoolError { hash: uo_hash, kind: e.into() })?;
                }

                Ok(uo_hash)
            }
            Err(e) => Err(MempoolError { hash: uo.hash, kind: e }),
        }
    }

    /// Sorts the [UserOperations](UserOperation) in the mempool by calling the
    /// [Mempool::get_sorted](Mempool::get_sorted) function
    ///
    /// # Returns
    /// `Result<Vec<UserOperation>, eyre::Error>` - The sorted [UserOperations](UserOperation)
    pub fn get_sorted_user_operations(&self) -> eyre::Result<Vec<UserOperation>> {
        self.mempool.get_sorted().map_err(|err| {
            format_err!("Getting sorted user operations from mempool failed with error: {err:?}",)
        })
    }

    /// Estimates the `verification_gas_limit`, `call_gas_limit` and `pre_verification_gas` for a
    /// user operation. Invoked by the `eth_estimateUserOperationGas` JSON RPC method.
    ///
    /// # Arguments
    /// * `uo` - The [UserOperation](UserOperation) to estimate the gas for.
    ///
    /// # Returns
    /// `Result<UserOperationGasEstimation, MempoolError>` - The gas estimation result,
    /// which includes the `verification_gas_limit`, `call_gas_limit` and `pre_verification_gas`.
    pub async fn estimate_user_operation_gas(
        &self,
        uo: &UserOperation,
    ) -> Result<UserOperationGasEstimation, MempoolError> {
        let pre_verification_gas = div_ceil(
            Overhead::default().calculate_pre_verification_gas(uo).saturating_mul(
                U256::from(100).saturating_add(PRE_VERIFICATION_SAFE_RESERVE_PERC.into()),
            ),
            U256::from(100),
        );

        let (verification_gas_limit, call_gas_limit) =
            estimate_user_op_gas(&uo.user_operation, &self.entry_point).await.map_err(|e| {
                match e {
                    EntryPointError::FailedOp(op) => MempoolError {
                        hash: uo.hash,
                        kind: MempoolErrorKind::InvalidUserOperation(
                            InvalidMempoolUserOperationError::Simulation(
                                SimulationError::Validation { inner: op.reason },
                            ),
                        ),
                    },
                    EntryPointError::ExecutionReverted(e) => MempoolError {
                        hash: uo.hash,
                        kind: MempoolErrorKind::InvalidUserOperation(
                            InvalidMempoolUserOperationError::Simulation(
                                SimulationError::Execution { inner: e },
                            ),
                        ),
                    },
                    EntryPointError::Provider { inner } => {
                        MempoolError { hash: uo.hash, kind: MempoolErrorKind::Provider { inner } }
                    }
                    _ => MempoolError {
                        hash: uo.hash,
                        kind: MempoolErrorKind::Other { inner: e.to_string() },
                    },
                }
            })?;

        Ok(UserOperationGasEstimation {
            pre_verification_gas,
            verification_gas_limit,
            call_gas_limit,
        })
    }

    /// Filters the events logged from the [EntryPoint](EntryPoint) contract for a given user
    /// operation hash.
    ///
    /// # Arguments
    /// * `uo_hash` - The [UserOperationHash](UserOperationHash) to filter the events for.
    ///
    /// # Returns
    /// `Result<Option<(UserOperationEventFilter, LogMeta)>, eyre::Error>` - The filtered event, if
    /// any.
    pub async fn get_user_operation_event_meta(
        &self,
        uo_hash: &UserOperationHash,
    ) -> eyre::Result<Option<(UserOperationEventFilter, LogMeta)>> {
        let mut event: Option<(UserOperationEventFilter, LogMeta)> = None;
        let latest_block = self.entry_point.eth_client().get_block_number().await?;
        let filter = self
            .entry_point
            .entry_point_api()
            .event::<UserOperationEventFilter>()
            .from_block(latest_block - FILTER_MAX_DEPTH)
            .topic1(uo_hash.0);
        let res: Vec<(UserOperationEventFilter, LogMeta)> = filter.query_with_meta().await?;
        // It is possible have two same user operatation in same bundle
        // see https://twitter.com/leekt216/status/1636414866662785024
        for log_meta in res.iter() {
            event = Some(log_meta.clone());
        }
        Ok(event)
    }

    /// Gets the user operation by hash.
    /// The function is indirectly invoked by the `eth_getUserOperationByHash` JSON RPC method.
    ///
    /// # Arguments
    /// * `uo_hash` - The [UserOperationHash](UserOperationHash) to get the user operation for.
    ///
    /// # Returns
    /// `Result<UserOperationByHash, eyre::Error>` - The user operation, if any.
    pub async fn get_user_operation_by_hash(
        &self,
        uo_hash: &UserOperationHash,
    ) -> eyre::Result<UserOperationByHash> {
        let event = self.get_user_operation_event_meta(uo_hash).await?;

        if let Some((event, log_meta)) = event {
            if let Some((uo, ep)) = self
                .entry_point
                .eth_client()
                .get_transaction(log_meta.transaction_hash)
                .await?
                .and_then(|tx| {
                    let uos = parse_from_input_data(tx.input)?;
                    let ep = tx.to?;
                    uos.iter()
                        .find(|uo| uo.sender == event.sender && uo.nonce == event.nonce)
                        .map(|uo| (uo.clone(), ep))
                })
            {
                return Ok(UserOperationByHash {
                    user_operation: uo,
                    entry_point: ep,
                    transaction_hash: log_meta.transaction_hash,
                    block_hash: log_meta.block_hash,
                    block_number: log_meta.block_number,
                });
            }
        }

        Err(format_err!("No user operation found"))
    }

    /// Gets the [UserOperationReceipt](UserOperationReceipt) by hash.
    /// The function is indirectly invoked by the `eth_getUserOperationReceipt` JSON RPC method.
    ///
    /// # Arguments
    /// * `uo_hash` - The [UserOperationHash](UserOperationHash) to get the user operation receipt
    ///   for.
    ///
    /// # Returns
    /// `Result<UserOperationReceipt, eyre::Error>` - The user operation receipt, if any.
    pub async fn get_user_operation_receipt(
        &self,
        uo_hash: &UserOperationHash,
    ) -> eyre::Result<UserOperationReceipt> {
        let event = self.get_user_operation_event_meta(uo_hash).await?;

        if let Some((event, log_meta)) = event {
            if let Some(tx_receipt) = self
                .entry_point
                .eth_client()
                .get_transaction_receipt(log_meta.transaction_hash)
                .await?
            {
                let uo = self.get_user_operation_by_hash(uo_hash).await?;
                return Ok(UserOperationReceipt {
                    user_operation_hash: *uo_hash,
                    sender: event.sender,
                    nonce: event.nonce,
                    actual_gas_cost: event.actual_gas_cost,
                    actual_gas_used: event.actual_gas_used,
                    success: event.success,
                    tx_receipt: tx_receipt.clone(),
                    logs: tx_receipt.logs.into_iter().collect(),
                    paymaster: get_address(&uo.user_operation.paymaster_and_data),
                    reason: String::new(),
                });
            }
        }

        Err(format_err!("No user operation found"))
    }

    /// Removes the [UserOperation](UserOperation) from the user operation mempool
    /// given the [UserOperationHash](UserOperationHash).
    ///
    /// # Returns
    /// `Option<()>` - None if the user operation was successfully removed.
    pub fn remove_user_operation(&mut self, uo_hash: &UserOperationHash) -> Option<()> {
        self.mempool.remove(uo_hash).ok();
        None
    }

    pub fn remove_user_operation_by_entity(&mut self, entity: &Address) -> Option<()> {
        self.mempool.remove_by_entity(entity).ok();
        None
    }

    /// Removes multiple [UserOperations](UserOperation) from the mempool and bumps the
    /// inclusion reputation counters for their sender/paymaster/factory.
    ///
    /// # Arguments
    /// * `uos` - The array of [UserOperation](UserOperation).
    pub fn remove_user_operations(&mut self, uos: Vec<UserOperation>) -> Option<()> {
        for uo in uos {
            self.remove_user_operation(&uo.hash);

            // update reputations
            self.reputation.increment_included(&uo.sender).ok();

            if let Some(addr) = get_address(&uo.paymaster_and_data) {
                self.reputation.increment_included(&addr).ok();
            }

            if let Some(addr) = get_address(&uo.init_code) {
                self.reputation.increment_included(&addr).ok();
            }
        }

        None
    }

    /// Gets the [StakeInfoResponse](StakeInfoResponse) for entity
    ///
    /// # Arguments
    /// * `addr` - The address of the entity.
    ///
    /// # Returns
    /// `Result<StakeInfoResponse, eyre::Error>` - Stake info of the entity.
    pub async fn get_stake_info(&self, addr: &Address) -> eyre::Result<StakeInfoResponse> {
        let info = self.entry_point.get_deposit_info(addr).await?;
        let stake_info = StakeInfo {
            address: *addr,
            stake: U256::from(info.stake),
            unstake_delay: U256::from(info.unstake_delay_sec),
        };
        Ok(StakeInfoResponse {
            stake_info,
            is_staked: self.reputation.verify_stake("", Some(stake_info), None, None).is_ok(),
        })
    }
}
