use super::args::{CreateWalletArgs, NodeArgs};
use crate::bundler::{create_wallet, launch_node};
use clap::Parser;
use silius_metrics::ethers::MetricsMiddleware;
use silius_primitives::provider::{create_http_provider, create_ws_provider};
use std::{future::pending, sync::Arc};

/// Start the bundler node (mempool, bundling component and RPC server all in one process)
#[derive(Debug, Parser)]
pub struct NodeCommand {
    #[clap(flatten)]
    node: NodeArgs,
}

impl NodeCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        if self.node.eth_client_address.starts_with("http") {
            let provider =
                create_http_provider(&self.node.eth_client_address, self.node.poll_interval)
                    .await?;
            let eth_client = Arc::new(MetricsMiddleware::new(provider));
            launch_node(self.node, eth_client).await?;
        } else {
            let provider = create_ws_provider(&self.node.eth_client_address).await?;
            let eth_client = Arc::new(MetricsMiddleware::new(provider));
            launch_node(self.node, eth_client).await?;
        }

        pending().await
    }
}

/// Create wallet for the bundling component
#[derive(Debug, Parser)]
pub struct CreateWalletCommand {
    #[clap(flatten)]
    create_wallet: CreateWalletArgs,
}

impl CreateWalletCommand {
    /// Execute the command
    pub fn execute(self) -> eyre::Result<()> {
        create_wallet(self.create_wallet)
    }
}
