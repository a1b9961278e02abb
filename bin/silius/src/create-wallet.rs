use clap::Parser;
use silius::{bundler::create_wallet, cli::args::CreateWalletArgs};

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();
    create_wallet(CreateWalletArgs::parse())
}
