//! Account abstraction (ERC-4337)-related constants

/// Entry point smart contract
pub mod entry_point {
    /// Address of the entry point smart contract
    pub const ADDRESS: &str = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789";
    /// Version of the entry point smart contract
    pub const VERSION: &str = "0.6.0";
}

/// Bundler
pub mod bundler {
    /// Default time interval for auto bundling mode (in seconds)
    pub const BUNDLE_INTERVAL: u64 = 10;
}

/// User operation mempool
pub mod mempool {
    /// Percentage increase of gas price to replace a user operation in the mempool
    pub const GAS_INCREASE_PERC: u64 = 10;
    /// Depth scan when searching for previous user operations
    pub const LATEST_SCAN_DEPTH: u64 = 1000;
    /// Default maximum number of user operations the mempool holds at once
    pub const MAX_SIZE: usize = 4096;
}

/// User operation validation
pub mod validation {
    /// Entities (factory, sender/account, paymaster, aggregator)
    pub mod entities {
        // 0 - factory, 1 - sender/account, 2 - paymaster
        pub const NUMBER_OF_LEVELS: usize = 3;

        pub const FACTORY: &str = "factory";
        pub const SENDER: &str = "account";
        pub const PAYMASTER: &str = "paymaster";

        pub const FACTORY_LEVEL: usize = 0;
        pub const SENDER_LEVEL: usize = 1;
        pub const PAYMASTER_LEVEL: usize = 2;

        pub const LEVEL_TO_ENTITY: [&str; NUMBER_OF_LEVELS] = [FACTORY, SENDER, PAYMASTER];
    }

    /// Reputation
    /// <https://github.com/eth-infinitism/account-abstraction/blob/develop/eip/EIPS/eip-aa-rules.md#constants>
    pub mod reputation {
        pub const MIN_UNSTAKE_DELAY: u64 = 86400;
        // pub const MIN_STAKE_VALUE - Adjustable per chain value, Equivalent to ~$1000 in native
        // tokens
        pub const SAME_SENDER_MEMPOOL_COUNT: usize = 4;
        pub const SAME_UNSTAKED_ENTITY_MEMPOOL_COUNT: usize = 10;
        pub const THROTTLED_ENTITY_MEMPOOL_COUNT: usize = 4;
        pub const THROTTLED_ENTITY_LIVE_BLOCKS: usize = 4;
        pub const THROTTLED_ENTITY_BUNDLE_COUNT: usize = 4;
        pub const MIN_INCLUSION_RATE_DENOMINATOR: u64 = 10;
        pub const INCLUSION_RATE_FACTOR: u64 = 10;
        pub const THROTTLING_SLACK: u64 = 10;
        pub const BAN_SLACK: u64 = 50;
    }

    /// Simulation
    pub mod simulation {
        pub const MIN_EXTRA_GAS: u64 = 2000;
    }
}

/// Supported chains
pub mod supported_chains {
    use alloy_chains::NamedChain;

    pub const CHAINS: [NamedChain; 10] = [
        NamedChain::Dev,
        NamedChain::Mainnet,
        NamedChain::Sepolia,
        NamedChain::Holesky,
        NamedChain::PolygonMumbai,
        NamedChain::OptimismSepolia,
        NamedChain::ArbitrumSepolia,
        NamedChain::BinanceSmartChainTestnet,
        NamedChain::BaseSepolia,
        NamedChain::AvalancheFuji,
    ];
}

/// RPC
pub mod rpc {
    /// The default port for HTTP
    pub const HTTP_PORT: u16 = 3000;
}

/// Error codes used in JSON-RPC responses for bundler-specific error conditions
pub mod error_codes {
    pub const VALIDATION: i32 = -32500;
    pub const PAYMASTER: i32 = -32501;
    pub const OPCODE: i32 = -32502;
    pub const EXPIRATION: i32 = -32503;
    pub const ENTITY_BANNED_OR_THROTTLED: i32 = -32504;
    pub const STAKE_TOO_LOW: i32 = -32505;
    pub const SIGNATURE_AGGREGATOR: i32 = -32506;
    pub const SIGNATURE: i32 = -32507;
    pub const EXECUTION: i32 = -32521;
    pub const SANITY_CHECK: i32 = -32602;
}
