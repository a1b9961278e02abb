use crate::{cli::args::NodeArgs, utils::unwrap_path_or_home};
use alloy_chains::{Chain, NamedChain};
use ethers::{providers::Middleware, types::Address};
use parking_lot::RwLock;
use silius_bundler::{BundleHandle, BundleManager, ConditionalClient, EthereumClient, ExecutionManager};
use silius_contracts::EntryPoint;
use silius_metrics::{launch_metrics_exporter, mempool::MetricsHandler};
use silius_mempool::{
    validate::{
        validator::{new_canonical, new_canonical_unsafe, StandardUserOperationValidator},
        SanityCheck, SimulationCheck, SimulationTraceCheck,
    },
    Mempool, Reputation, UoPool, UoPoolBuilder,
};
use silius_primitives::{
    bundler::{BundleMode, BundleStrategy},
    constants::{
        entry_point,
        supported_chains::CHAINS,
        validation::reputation::{BAN_SLACK, MIN_INCLUSION_RATE_DENOMINATOR, MIN_UNSTAKE_DELAY, THROTTLING_SLACK},
    },
    reputation::ReputationEntry,
    simulation::CodeHash,
    UserOperationHash, UserOperationSigned, Wallet,
};

use crate::cli::args::CreateWalletArgs;
use silius_rpc::{
    debug_api::DebugApiServer, eth_api::EthApiServer, web3_api::Web3ApiServer, DebugApiServerImpl,
    EthApiServerImpl, JsonRpcServer, Web3ApiServerImpl,
};
use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
    sync::Arc,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Wires the mempool, bundler and RPC server together and runs them in a single process.
pub async fn launch_node<M>(args: NodeArgs, eth_client: Arc<M>) -> eyre::Result<()>
where
    M: Middleware + Clone + 'static,
{
    let eth_client_version = check_connected_chain(eth_client.clone(), args.chain).await?;
    info!("Connected to Ethereum execution client with version {}", eth_client_version);

    let chain = Chain::from(eth_client.get_chainid().await?.as_u64());

    let entry_point_address = *args
        .entry_points
        .first()
        .unwrap_or(&Address::from_str(entry_point::ADDRESS).expect("address should be valid"));
    if args.entry_points.len() > 1 {
        warn!("Only the first entry point {entry_point_address:?} is used, multiple entry points are not supported yet");
    }
    let entry_point_api = EntryPoint::new(eth_client.clone(), entry_point_address);

    let wallet = if let Some(mnemonic_file) = args.mnemonic_file.clone() {
        Wallet::from_file(mnemonic_file.into(), &chain.id().into())
            .map_err(|error| eyre::format_err!("Could not load mnemonic file: {}", error))?
    } else if let Some(private_key) = args.private_key.clone() {
        Wallet::from_phrase(&private_key, &chain.id().into())
            .map_err(|error| eyre::format_err!("Could not load private key: {}", error))?
    } else {
        return Err(eyre::eyre!("Either a mnemonic file or a private key must be provided"));
    };
    info!("Bundler wallet signer: {:?}", wallet.signer);

    let mempool = Mempool::new_with_max_size(
        Box::new(Arc::new(parking_lot::RwLock::new(MetricsHandler::new(HashMap::<
            UserOperationHash,
            UserOperationSigned,
        >::default())))),
        Box::new(Arc::new(parking_lot::RwLock::new(
            HashMap::<Address, HashSet<UserOperationHash>>::default(),
        ))),
        Box::new(Arc::new(parking_lot::RwLock::new(
            HashMap::<Address, HashSet<UserOperationHash>>::default(),
        ))),
        Box::new(Arc::new(parking_lot::RwLock::new(
            HashMap::<UserOperationHash, Vec<CodeHash>>::default(),
        ))),
        args.mempool_max_size,
    );

    let mut reputation = Reputation::new(
        MIN_INCLUSION_RATE_DENOMINATOR,
        THROTTLING_SLACK,
        BAN_SLACK,
        args.min_stake,
        MIN_UNSTAKE_DELAY.into(),
        Arc::new(RwLock::new(HashSet::<Address>::default())),
        Arc::new(RwLock::new(HashSet::<Address>::default())),
        Box::new(Arc::new(parking_lot::RwLock::new(MetricsHandler::new(HashMap::<
            Address,
            ReputationEntry,
        >::default())))),
    );
    for whitelisted in args.whitelist.iter() {
        reputation.add_whitelist(whitelisted);
    }

    let eth_client_bundler = eth_client.clone();

    macro_rules! run_with_validator {
        ($validator:expr) => {{
            let validator = $validator;
            let (uopool, mempool, reputation) = build_uopool(
                eth_client.clone(),
                entry_point_address,
                chain,
                args.max_verification_gas,
                mempool,
                reputation,
                validator.clone(),
            );

            match args.bundle_strategy {
                BundleStrategy::EthereumClient => {
                    let sender = EthereumClient::new(eth_client_bundler.clone(), wallet.clone());
                    let bundler_manager = BundleManager::new(
                        entry_point_api,
                        mempool,
                        reputation,
                        validator,
                        sender,
                        wallet.address(),
                        args.beneficiary,
                        args.min_balance,
                        args.bundle_gas_limit,
                        chain,
                    );
                    run_node(args, uopool, bundler_manager).await
                }
                BundleStrategy::Conditional => {
                    let sender = ConditionalClient::new(eth_client_bundler.clone(), wallet.clone());
                    let bundler_manager = BundleManager::new(
                        entry_point_api,
                        mempool,
                        reputation,
                        validator,
                        sender,
                        wallet.address(),
                        args.beneficiary,
                        args.min_balance,
                        args.bundle_gas_limit,
                        chain,
                    );
                    run_node(args, uopool, bundler_manager).await
                }
            }
        }};
    }

    if args.unsafe_mode {
        let validator = new_canonical_unsafe(
            entry_point_api.clone(),
            chain,
            args.max_verification_gas,
            args.min_priority_fee_per_gas,
        );
        run_with_validator!(validator)
    } else {
        let validator = new_canonical(
            entry_point_api.clone(),
            chain,
            args.max_verification_gas,
            args.min_priority_fee_per_gas,
        );
        run_with_validator!(validator)
    }
}

type NodeValidator<M, SanCk, SimCk, SimTrCk> = StandardUserOperationValidator<M, SanCk, SimCk, SimTrCk>;

#[allow(clippy::too_many_arguments)]
fn build_uopool<M, SanCk, SimCk, SimTrCk>(
    eth_client: Arc<M>,
    entrypoint: Address,
    chain: Chain,
    max_verification_gas: ethers::types::U256,
    mempool: Mempool,
    reputation: Reputation,
    validator: NodeValidator<M, SanCk, SimCk, SimTrCk>,
) -> (Arc<Mutex<UoPool<M, NodeValidator<M, SanCk, SimCk, SimTrCk>>>>, Mempool, Reputation)
where
    M: Middleware + Clone + 'static,
    SanCk: SanityCheck<M> + Clone + 'static,
    SimCk: SimulationCheck + Clone + 'static,
    SimTrCk: SimulationTraceCheck<M> + Clone + 'static,
{
    let builder = UoPoolBuilder::new(
        eth_client,
        entrypoint,
        chain,
        max_verification_gas,
        mempool.clone(),
        reputation.clone(),
        validator,
    );
    builder.register_reputation_updates();
    (Arc::new(Mutex::new(builder.uopool())), mempool, reputation)
}

async fn run_node<M, V, C>(
    args: NodeArgs,
    uopool: Arc<Mutex<UoPool<M, V>>>,
    bundler_manager: BundleManager<M, V, C>,
) -> eyre::Result<()>
where
    M: Middleware + Clone + 'static,
    V: silius_mempool::validate::UserOperationValidator + 'static,
    C: silius_bundler::SendBundleOp + 'static,
{
    let mode =
        if args.manual_bundle_mode { BundleMode::Manual } else { BundleMode::Auto(args.bundle_interval) };
    let execution_manager = ExecutionManager::new(bundler_manager, mode, args.auto_bundle_size);
    execution_manager.spawn_interval_trigger();
    let bundler: Arc<dyn BundleHandle> = Arc::new(execution_manager);

    let mut server = JsonRpcServer::new(args.rpc.listen_addr().to_string())
        .with_cors(args.rpc.http_corsdomain.clone());

    if args.rpc.is_api_method_enabled("eth") {
        server.add_method(EthApiServerImpl { uopool: uopool.clone() }.into_rpc())?;
    }
    if args.rpc.is_api_method_enabled("debug") {
        server.add_method(DebugApiServerImpl { uopool: uopool.clone(), bundler }.into_rpc())?;
    }
    if args.rpc.is_api_method_enabled("web3") {
        server.add_method(Web3ApiServerImpl {}.into_rpc())?;
    }

    let handle = server.start().await?;
    info!("Started bundler JSON-RPC server at {}", args.rpc.listen_addr());

    if args.metrics.enable_metrics {
        launch_metrics_exporter(args.metrics.listen_addr(), args.metrics.custom_label_value);
    }

    handle.stopped().await;

    Ok(())
}

pub fn create_wallet(args: CreateWalletArgs) -> eyre::Result<()> {
    info!("Creating bundler wallet... Storing to: {:?}", args.output_path);

    let path = unwrap_path_or_home(args.output_path)?;
    let wallet = Wallet::build_random(path, &args.chain_id.into())?;
    info!("Wallet signer {:?}", wallet.signer);

    Ok(())
}

async fn check_connected_chain<M>(eth_client: Arc<M>, chain: Option<NamedChain>) -> eyre::Result<String>
where
    M: Middleware + Clone + 'static,
{
    if let Some(chain) = chain {
        if !CHAINS.contains(&chain) {
            warn!("!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!");
            warn!("Chain {:?} is not officially supported yet! You could possibly meet a lot of problems with silius. Use at your own risk!!", chain);
            warn!("!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!");
        }

        let chain: Chain = chain.into();

        let chain_id = eth_client.get_chainid().await?.as_u64();
        if chain.id() != chain_id {
            return Err(eyre::format_err!(
                "Tried to connect to the execution client of different chain ids: {} != {}",
                chain.id(),
                chain_id
            ));
        }
    }

    Ok(eth_client.client_version().await?)
}
