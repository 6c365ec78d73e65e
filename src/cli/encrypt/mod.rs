//! Tenant token encryption commands

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::secrets::SecretCipher;

#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Plaintext provider auth token
    pub plaintext: String,
}

/// Prints `iv:tag:data` for the token; logs go to stderr
pub fn run(args: EncryptArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    println!("{}", encrypt_with_config(&config, &args.plaintext)?);
    info!("Token encrypted");

    Ok(())
}

pub fn generate_key() -> anyhow::Result<()> {
    println!("{}", SecretCipher::generate_hex_key());
    Ok(())
}

fn encrypt_with_config(config: &AppConfig, plaintext: &str) -> anyhow::Result<String> {
    let key = config
        .security
        .encryption_key
        .as_deref()
        .context("security.encryption_key is not set (APP__SECURITY__ENCRYPTION_KEY)")?;

    let cipher = SecretCipher::from_hex_key(key)?;
    Ok(cipher.encrypt(plaintext)?)
}
