use crate::utils::{parse_address, parse_bundle_strategy, parse_duration, parse_label_value, parse_u256};
use alloy_chains::NamedChain;
use clap::{ArgGroup, Parser};
use ethers::types::{Address, U256};
use expanded_pathbuf::ExpandedPathBuf;
use silius_metrics::label::LabelValue;
use silius_primitives::{
    bundler::BundleStrategy,
    constants::{bundler::BUNDLE_INTERVAL, mempool::MAX_SIZE, rpc::HTTP_PORT},
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

/// Bundling and mempool args shared by the node.
#[derive(Debug, Clone, Parser, PartialEq)]
#[clap(group(ArgGroup::new("account").required(true).args(&["mnemonic_file", "private_key"])))]
pub struct NodeArgs {
    /// Ethereum execution client RPC endpoint.
    #[clap(long, default_value = "http://127.0.0.1:8545")]
    pub eth_client_address: String,

    /// Chain information.
    #[clap(long)]
    pub chain: Option<NamedChain>,

    /// Entry point addresses.
    #[clap(long, value_delimiter=',', value_parser=parse_address)]
    pub entry_points: Vec<Address>,

    /// Poll interval event filters and pending transactions in milliseconds.
    #[clap(long, default_value = "500", value_parser= parse_duration)]
    pub poll_interval: Duration,

    /// Path to the mnemonic file.
    #[clap(long, group = "account")]
    pub mnemonic_file: Option<PathBuf>,

    /// Private key for the wallet.
    #[clap(long, group = "account")]
    pub private_key: Option<String>,

    /// The bundler beneficiary address.
    #[clap(long, value_parser=parse_address)]
    pub beneficiary: Address,

    /// The minimum balance required for the beneficiary address.
    #[clap(long, default_value = "100000000000000000", value_parser=parse_u256)]
    pub min_balance: U256,

    /// Whether the bundler should send bundles manually.
    #[clap(long)]
    pub manual_bundle_mode: bool,

    /// The bundle interval in seconds, used when bundling automatically.
    #[clap(long, default_value_t = BUNDLE_INTERVAL)]
    pub bundle_interval: u64,

    /// Number of pending user operations that trigger an immediate bundle attempt, in addition
    /// to the interval trigger. 0 disables the size-driven trigger.
    #[clap(long, default_value = "0")]
    pub auto_bundle_size: usize,

    /// Gas budget for a single bundle.
    #[clap(long, default_value = "5000000", value_parser=parse_u256)]
    pub bundle_gas_limit: U256,

    /// Sets the bundle strategy.
    #[clap(long, default_value = "ethereum-client", value_parser=parse_bundle_strategy)]
    pub bundle_strategy: BundleStrategy,

    /// Max allowed verification gas.
    #[clap(long, default_value="5000000", value_parser=parse_u256)]
    pub max_verification_gas: U256,

    /// Minimum stake required for entities.
    #[clap(long, value_parser=parse_u256, default_value = "1")]
    pub min_stake: U256,

    /// Minimum priority fee per gas.
    #[clap(long, value_parser=parse_u256, default_value = "0")]
    pub min_priority_fee_per_gas: U256,

    /// Addresses of whitelisted entities.
    #[clap(long, value_delimiter=',', value_parser = parse_address)]
    pub whitelist: Vec<Address>,

    /// Maximum number of user operations the mempool holds at once. Once full, the lowest-tip
    /// entry is evicted to make room for a higher-tip submission; lower-or-equal-tip
    /// submissions are rejected.
    #[clap(long, default_value_t = MAX_SIZE)]
    pub mempool_max_size: usize,

    /// Skips the unsafe opcode/storage simulation trace checks. Only use against a node that
    /// doesn't support `debug_traceCall`.
    #[clap(long)]
    pub unsafe_mode: bool,

    #[clap(flatten)]
    pub rpc: RpcArgs,

    #[clap(flatten)]
    pub metrics: MetricsArgs,
}

/// RPC CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct RpcArgs {
    /// Enables or disables the JSON-RPC server.
    #[clap(long)]
    pub http: bool,

    /// Sets the JSON-RPC address to listen on.
    #[clap(long = "http.addr", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub http_addr: IpAddr,

    /// Sets the JSON-RPC port to listen on.
    #[clap(long = "http.port", default_value_t = HTTP_PORT)]
    pub http_port: u16,

    /// Configures the RPC API namespaces to expose.
    #[clap(long = "http.api", value_delimiter=',', default_value = "eth", value_parser = ["eth", "debug", "web3"])]
    pub http_api: Vec<String>,

    /// Configures the allowed CORS domains.
    #[clap(long = "http.corsdomain", value_delimiter = ',', default_value = "*")]
    pub http_corsdomain: Vec<String>,
}

impl RpcArgs {
    /// Socket address the server listens on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_addr, self.http_port)
    }

    /// Checks if the given API namespace is enabled.
    pub fn is_api_method_enabled(&self, method: &str) -> bool {
        self.http_api.contains(&method.into())
    }
}

/// Create wallet CLI args
#[derive(Debug, Clone, Parser)]
pub struct CreateWalletArgs {
    /// The path where the wallet will be stored.
    #[clap(long, short)]
    pub output_path: Option<ExpandedPathBuf>,

    /// The chain id.
    #[clap(long, default_value = "1")]
    pub chain_id: u64,
}

#[derive(Clone, Debug, Parser, PartialEq)]
pub struct MetricsArgs {
    #[clap(long)]
    pub enable_metrics: bool,
    #[clap(long, value_delimiter = ',', value_parser=parse_label_value)]
    pub custom_label_value: Option<Vec<LabelValue>>,
    #[clap(long = "metrics.addr", default_value = "127.0.0.1")]
    pub listen_address: Ipv4Addr,
    #[clap(long = "metrics.port", default_value = "3030")]
    pub port: u16,
}

impl MetricsArgs {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(self.listen_address), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn node_args_mnemonic_file() {
        let args = vec![
            "nodeargs",
            "--mnemonic-file",
            "~/.silius/0x690B9A9E9aa1C9dB991C7721a92d351Db4FaC990",
            "--beneficiary",
            "0x690B9A9E9aa1C9dB991C7721a92d351Db4FaC990",
            "--entry-points",
            "0x690B9A9E9aa1C9dB991C7721a92d351Db4FaC990",
            "--chain",
            "holesky",
        ];
        let parsed = NodeArgs::try_parse_from(args).unwrap();
        assert_eq!(
            parsed.mnemonic_file,
            Some(PathBuf::from("~/.silius/0x690B9A9E9aa1C9dB991C7721a92d351Db4FaC990"))
        );
        assert_eq!(parsed.chain, Some(NamedChain::Holesky));
        assert_eq!(
            parsed.beneficiary,
            Address::from_str("0x690B9A9E9aa1C9dB991C7721a92d351Db4FaC990").unwrap()
        );
        assert_eq!(parsed.bundle_strategy, BundleStrategy::EthereumClient);
        assert!(!parsed.manual_bundle_mode);
    }

    #[test]
    fn node_args_private_key() {
        let args = vec![
            "nodeargs",
            "--private-key",
            "4c5e5d3076c425e8d8affe9c2a0da32b779820ef008fdda02d5c7b783674d8c4",
            "--beneficiary",
            "0x690B9A9E9aa1C9dB991C7721a92d351Db4FaC990",
            "--entry-points",
            "0x690B9A9E9aa1C9dB991C7721a92d351Db4FaC990",
            "--manual-bundle-mode",
        ];
        let parsed = NodeArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.mnemonic_file, None);
        assert!(parsed.manual_bundle_mode);
    }

    #[test]
    fn rpc_args_when_http_flag() {
        let args = vec![
            "rpcargs",
            "--http",
            "--http.addr",
            "127.0.0.1",
            "--http.port",
            "3000",
            "--http.api",
            "eth,debug,web3",
            "--http.corsdomain",
            "127.0.0.1:4321",
        ];
        assert_eq!(
            RpcArgs {
                http: true,
                http_addr: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
                http_port: 3000,
                http_api: vec![String::from("eth"), String::from("debug"), String::from("web3")],
                http_corsdomain: vec![String::from("127.0.0.1:4321")],
            },
            RpcArgs::try_parse_from(args).unwrap()
        );
    }

    #[test]
    fn rpc_args_is_api_method_enabled() {
        let args = RpcArgs {
            http: true,
            http_addr: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            http_port: 3000,
            http_api: vec![String::from("eth")],
            http_corsdomain: vec![String::from("*")],
        };
        assert!(args.is_api_method_enabled("eth"));
        assert!(!args.is_api_method_enabled("debug"));
    }

    #[test]
    fn metrics_args() {
        let args = vec![
            "metricsargs",
            "--enable-metrics",
            "--metrics.addr",
            "127.0.0.1",
            "--metrics.port",
            "9090",
            "--custom-label-value",
            "custom=value",
        ];
        assert_eq!(
            MetricsArgs {
                enable_metrics: true,
                listen_address: Ipv4Addr::new(127, 0, 0, 1),
                port: 9090,
                custom_label_value: Some(vec![LabelValue::new(
                    String::from("custom"),
                    String::from("value")
                )])
            },
            MetricsArgs::try_parse_from(args).unwrap()
        )
    }
}
