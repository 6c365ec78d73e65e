//! Tenant secret decryption and lookup

mod cipher;
mod config_store;
mod resolver;

pub use cipher::SecretCipher;
pub use config_store::ConfigTenantSecretStore;
pub use resolver::{DecryptFallback, SecretResolution, TenantSecretResolver};
