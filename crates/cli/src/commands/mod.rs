//! CLI command implementations.

pub mod cart;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Database URL from `CLEMENTINE_DATABASE_URL` or `DATABASE_URL`.
pub(crate) fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    std::env::var("CLEMENTINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "CLEMENTINE_DATABASE_URL not set".into())
}
