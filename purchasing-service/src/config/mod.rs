use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LedgerConfig {
    pub base_url: String,
    pub api_token: Secret<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("PURCHASING_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PURCHASING_SERVICE_PORT")
            .unwrap_or_else(|_| "3006".to_string())
            .parse()?;

        let ledger_base_url =
            env::var("LEDGER_BASE_URL").unwrap_or_else(|_| "http://localhost:3007".to_string());
        let ledger_api_token = env::var("LEDGER_API_TOKEN").unwrap_or_else(|_| "dev-token".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            ledger: LedgerConfig {
                base_url: ledger_base_url,
                api_token: Secret::new(ledger_api_token),
            },
            service_name: "purchasing-service".to_string(),
        })
    }
}
