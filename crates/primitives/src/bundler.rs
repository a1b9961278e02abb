//! Bundler-related primitives

use serde::Deserialize;
use strum_macros::{EnumString, EnumVariantNames};

/// Bundle modes
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum BundleMode {
    /// Sends bundles automatically every x seconds
    #[serde(rename = "auto")]
    Auto(u64),
    /// Sends bundles upon request
    #[serde(rename = "manual")]
    Manual,
}

/// Determines the mode how bundler sends the bundle
#[derive(Clone, Copy, Debug, Default, EnumString, EnumVariantNames, PartialEq, Eq)]
#[strum(serialize_all = "kebab_case")]
pub enum BundleStrategy {
    /// Sends the bundle as a plain transaction to the Ethereum execution client
    #[default]
    EthereumClient,
    /// Sends the bundle to the Ethereum execution client over the conditional RPC method,
    /// pinning the storage state the simulation relied on
    Conditional,
}
