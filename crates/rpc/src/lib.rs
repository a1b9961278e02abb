#![allow(dead_code)]

mod codes;
mod debug;
mod debug_api;
pub mod error;
mod eth;
mod eth_api;
mod middleware;
mod rpc;
mod web3;
mod web3_api;

pub use debug::DebugApiServerImpl;
pub use debug_api::DebugApiServer;
pub use error::JsonRpcError;
pub use eth::EthApiServerImpl;
pub use eth_api::EthApiServer;
pub use middleware::{ProxyJsonRpcLayer, ProxyJsonRpcRequest};
pub use rpc::JsonRpcServer;
pub use web3::Web3ApiServerImpl;
pub use web3_api::Web3ApiServer;
