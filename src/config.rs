use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://ape.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Reads `DATABASE_URL` and `APE_BIND`, after loading a `.env` file if
    /// one is present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind = env::var("APE_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|e| AppError::Config(format!("APE_BIND {:?} is not an address: {}", bind, e)))?;

        Ok(Self {
            database_url,
            bind_addr,
        })
    }
}
