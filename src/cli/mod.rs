//! CLI module for Webhook Guard
//!
//! - `serve`: run the HTTP edge
//! - `encrypt-token`: encrypt a tenant auth token for the `tenants` config
//! - `generate-key`: print a fresh AES-256 key for `security.encryption_key`

pub mod encrypt;
pub mod serve;

use clap::{Parser, Subcommand};

/// Webhook Guard - signature verification and rate limiting for telephony callbacks
#[derive(Parser)]
#[command(name = "webhook-guard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the server
    Serve,

    /// Encrypt a tenant auth token with the configured key
    EncryptToken(encrypt::EncryptArgs),

    /// Print a new random encryption key (64 hex chars)
    GenerateKey,
}
