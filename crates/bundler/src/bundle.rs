use crate::bundler::SendBundleOp;
use alloy_chains::Chain;
use ethers::{
    providers::Middleware,
    types::{transaction::eip2718::TypedTransaction, Address, H256, U256},
};
use eyre::format_err;
use regex::Regex;
use silius_contracts::{decode_revert_error, EntryPoint, EntryPointAPIErrors};
use silius_mempool::{
    validate::{utils::merge_storage_maps, UserOperationValidator, UserOperationValidatorMode},
    EventsManager, Mempool, Reputation,
};
use silius_primitives::{get_address, reputation::Status, simulation::StorageMap, UserOperation};
use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
};
use tracing::{debug, error, info, warn};

/// Assembles and submits bundles of user operations to the EntryPoint contract.
///
/// All calls to [BundleManager::send_next_bundle] must be serialized by the caller (a single
/// async mutex held across the whole bundling cycle) since the signer's nonce only advances
/// through this path.
pub struct BundleManager<M: Middleware + 'static, V: UserOperationValidator, C: SendBundleOp> {
    entry_point: EntryPoint<M>,
    mempool: Mempool,
    reputation: Reputation,
    validator: V,
    events: EventsManager<M>,
    sender: C,
    /// Address of our own wallet, used as the transaction's `from` and as the fallback
    /// beneficiary when `beneficiary`'s balance runs low.
    wallet_address: Address,
    /// Configured bundle beneficiary.
    beneficiary: Address,
    /// Beneficiary balance threshold below which bundles top up `wallet_address` instead.
    min_beneficiary_balance: U256,
    /// Gas budget for a single bundle.
    bundle_gas_limit: U256,
    chain: Chain,
}

impl<M, V, C> BundleManager<M, V, C>
where
    M: Middleware + 'static,
    V: UserOperationValidator,
    C: SendBundleOp,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entry_point: EntryPoint<M>,
        mempool: Mempool,
        reputation: Reputation,
        validator: V,
        sender: C,
        wallet_address: Address,
        beneficiary: Address,
        min_beneficiary_balance: U256,
        bundle_gas_limit: U256,
        chain: Chain,
    ) -> Self {
        let events = EventsManager::new(entry_point.clone());
        Self {
            entry_point,
            mempool,
            reputation,
            validator,
            events,
            sender,
            wallet_address,
            beneficiary,
            min_beneficiary_balance,
            bundle_gas_limit,
            chain,
        }
    }

    /// Reconciles mempool/reputation state against the chain, assembles the next bundle from
    /// the mempool, and submits it. Returns the submitted transaction hash, or `None` if there
    /// was nothing to bundle.
    pub async fn send_next_bundle(&mut self) -> eyre::Result<Option<H256>> {
        self.events.sync(&mut self.mempool, &mut self.reputation).await?;

        let uos = self
            .mempool
            .get_sorted()
            .map_err(|err| format_err!("Getting sorted user operations failed: {err:?}"))?;

        if uos.is_empty() {
            return Ok(None);
        }

        let (bundle, storage_map) = self.create_bundle(uos).await?;

        if bundle.is_empty() {
            debug!("No user operations to bundle after validation");
            return Ok(None);
        }

        let beneficiary = self.select_beneficiary().await?;

        match self.submit_bundle(&bundle, beneficiary, storage_map).await {
            Ok(tx_hash) => {
                info!("Bundle of {} user operations sent: {tx_hash:?}", bundle.len());
                // Included ops are reconciled out of the mempool by `EventsManager::sync` once
                // the transaction lands, not here: we don't yet know it will be mined.
                Ok(Some(tx_hash))
            }
            Err(err) => {
                self.handle_submission_error(err, &bundle)?;
                Ok(None)
            }
        }
    }

    /// Walks the mempool in inclusion order, accumulating user operations into a bundle while
    /// enforcing reputation throttling, re-validating each operation, checking for storage
    /// conflicts between senders, and respecting the bundle's gas budget.
    async fn create_bundle(
        &mut self,
        uos: Vec<UserOperation>,
    ) -> eyre::Result<(Vec<UserOperation>, StorageMap)> {
        let mut uos_valid = vec![];
        let mut senders = HashSet::new();
        let mut gas_total = U256::zero();
        let mut paymaster_dep = HashMap::new();
        let mut staked_entity_c = HashMap::new();
        let mut storage_maps: Vec<StorageMap> = Vec::new();

        let senders_all = uos.iter().map(|uo| uo.sender).collect::<HashSet<_>>();

        'uos: for uo in uos {
            if senders.contains(&uo.sender) {
                continue;
            }

            let p_opt = get_address(&uo.paymaster_and_data);
            let f_opt = get_address(&uo.init_code);

            let p_st = Status::from(
                self.reputation.get_status_from_bytes(&uo.paymaster_and_data).map_err(|err| {
                    format_err!("Error getting reputation status with error: {err:?}")
                })?,
            );
            let f_st = Status::from(self.reputation.get_status_from_bytes(&uo.init_code).map_err(
                |err| format_err!("Error getting reputation status with error: {err:?}"),
            )?);

            let p_c = p_opt.map(|p| staked_entity_c.get(&p).cloned().unwrap_or(0)).unwrap_or(0);
            let f_c = f_opt.map(|f| staked_entity_c.get(&f).cloned().unwrap_or(0)).unwrap_or(0);

            match (p_st, f_st) {
                (Status::BANNED, _) | (_, Status::BANNED) => {
                    self.mempool.remove(&uo.hash).map_err(|err| {
                        format_err!(
                            "Removing a banned user operation {:?} failed with error: {err:?}",
                            uo.hash,
                        )
                    })?;
                    continue;
                }
                (Status::THROTTLED, _) if p_c >= 1 => {
                    continue;
                }
                (_, Status::THROTTLED) if f_c >= 1 => {
                    continue;
                }
                _ => (),
            };

            let val_out = self
                .validator
                .validate_user_operation(
                    &uo,
                    &self.mempool,
                    &self.reputation,
                    None,
                    UserOperationValidatorMode::Simulation |
                        UserOperationValidatorMode::SimulationTrace,
                )
                .await;

            debug!("Bundle-time re-validation for userop {:?}: {:?}", uo.hash, val_out);

            match val_out {
                Ok(val_out) => {
                    if val_out.valid_after.is_some() {
                        continue;
                    }

                    for addr in val_out.storage_map.root_hashes.keys() {
                        if *addr != uo.sender && senders_all.contains(addr) {
                            continue 'uos;
                        }
                    }

                    for addr in val_out.storage_map.slots.keys() {
                        if *addr != uo.sender && senders_all.contains(addr) {
                            continue 'uos;
                        }
                    }

                    let gas_cost = val_out.verification_gas_limit.saturating_add(uo.call_gas_limit);
                    let gas_total_new = gas_total.saturating_add(gas_cost);
                    if gas_total_new.gt(&self.bundle_gas_limit) {
                        break;
                    }

                    storage_maps.push(val_out.storage_map);

                    if let Some(p) = p_opt {
                        let balance = match paymaster_dep.get(&p) {
                            Some(n) => *n,
                            None => self.entry_point.balance_of(&p).await.map_err(|err| {
                                format_err!(
                                    "Getting balance of paymaster {p:?} failed with error: {err:?}",
                                )
                            })?,
                        };

                        if balance.lt(&val_out.pre_fund) {
                            continue;
                        }

                        staked_entity_c.entry(p).and_modify(|c| *c += 1).or_insert(1);
                        paymaster_dep.insert(p, balance.saturating_sub(val_out.pre_fund));
                    }

                    if let Some(f) = f_opt {
                        staked_entity_c.entry(f).and_modify(|c| *c += 1).or_insert(1);
                    }

                    gas_total = gas_total_new;
                }
                Err(_) => {
                    self.mempool.remove(&uo.hash).map_err(|err| {
                        format_err!(
                            "Removing a user operation {:?} that failed bundle-time re-validation failed with error: {err:?}", uo.hash,
                        )
                    })?;
                    continue;
                }
            }

            uos_valid.push(uo.clone());
            senders.insert(uo.sender);
        }

        Ok((uos_valid, merge_storage_maps(storage_maps)))
    }

    /// Picks the bundle's beneficiary: the configured beneficiary, unless our own signer
    /// balance has fallen to or below the configured minimum, in which case bundles top up
    /// the signer itself.
    async fn select_beneficiary(&self) -> eyre::Result<Address> {
        let balance = self.entry_point.eth_client().get_balance(self.wallet_address, None).await?;

        if balance <= self.min_beneficiary_balance {
            warn!(
                "Signer {:?} balance {balance} at or below minimum {}, bundling to self",
                self.wallet_address, self.min_beneficiary_balance
            );
            Ok(self.wallet_address)
        } else {
            Ok(self.beneficiary)
        }
    }

    async fn submit_bundle(
        &self,
        uos: &[UserOperation],
        beneficiary: Address,
        storage_map: StorageMap,
    ) -> eyre::Result<H256> {
        let ops = uos.iter().map(|uo| uo.user_operation.clone().into()).collect();
        let call = self.entry_point.entry_point_api().handle_ops(ops, beneficiary);
        let mut tx: TypedTransaction = call.tx;
        tx.set_from(self.wallet_address);
        tx.set_chain_id(self.chain.id());

        self.sender.send_bundle(tx, storage_map).await
    }

    /// Classifies a bundle submission failure and applies the corresponding reputation
    /// penalty or mempool removal. `AA1`/`AA2`/`AA3` prefixed revert reasons identify which
    /// entity (factory, sender, paymaster) is at fault; anything else only removes the
    /// offending operation.
    fn handle_submission_error(&mut self, err: eyre::Report, uos: &[UserOperation]) -> eyre::Result<()> {
        let message = err.to_string();

        if message.to_lowercase().contains("method not found") {
            return Err(format_err!("bundle submission method not supported by the node: {message}"));
        }

        let Some((op_index, reason)) = decode_failed_op(&message) else {
            error!("Bundle submission failed: {message}");
            return Ok(());
        };

        warn!("Bundle reverted at op {op_index}: {reason}");

        let Some(uo) = uos.get(op_index) else {
            return Ok(());
        };

        let (sender, factory, paymaster) = uo.get_entities();
        let offending = if reason.starts_with("AA1") {
            factory
        } else if reason.starts_with("AA2") {
            Some(sender)
        } else if reason.starts_with("AA3") {
            paymaster
        } else {
            None
        };

        if let Some(addr) = offending {
            self.reputation.update_handle_ops_reverted(&addr).ok();
        }

        self.mempool.remove(&uo.hash).ok();

        Ok(())
    }
}

/// Extracts a `FailedOp(opIndex, reason)` decoding attempt out of a stringified submission
/// error, by locating the revert data's hex payload the way `EntryPointError` does for
/// JSON-RPC errors.
fn decode_failed_op(message: &str) -> Option<(usize, String)> {
    let re = Regex::new(r"0x[0-9a-fA-F]{8,}").ok()?;
    let hex = re.find(message)?;
    let bytes = ethers::types::Bytes::from_str(hex.as_str()).ok()?;

    match decode_revert_error(bytes) {
        Ok(EntryPointAPIErrors::FailedOp(op)) => Some((op.op_index.as_usize(), op.reason)),
        _ => None,
    }
}
