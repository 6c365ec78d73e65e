use clap::Parser;
use webhook_guard::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::EncryptToken(args) => cli::encrypt::run(args),
        Command::GenerateKey => cli::encrypt::generate_key(),
    }
}
