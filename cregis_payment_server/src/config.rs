use std::env;

use cpg_common::parse_boolean_flag;
use cregis_payment_engine::GatewayOptions;
use cregis_tools::CregisConfig;
use log::*;

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 8370;
const DEFAULT_VALID_TIME: u32 = 60;
const MIN_VALID_TIME: u32 = 10;
const MAX_VALID_TIME: u32 = 1440;
const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Processor API connection settings.
    pub cregis: CregisConfig,
    /// Merchant checkout settings.
    pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            cregis: CregisConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CPG_HOST").ok().unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = env::var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("{s} is not a valid port for CPG_PORT. {e} Using the default, {DEFAULT_CPG_PORT}, instead.");
                    DEFAULT_CPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPG_PORT);
        let cregis = CregisConfig::new_from_env_or_default();
        let gateway = GatewayConfig::from_env_or_default();
        Self { host, port, cregis, gateway }
    }
}

/// Checkout-facing settings: how long orders stay payable, which tokens are offered, and whether partial and
/// over-payments are accepted.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub valid_time: u32,
    pub accepted_tokens: Vec<String>,
    pub language: String,
    pub accept_partial: bool,
    pub accept_over: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            valid_time: DEFAULT_VALID_TIME,
            accepted_tokens: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            accept_partial: true,
            accept_over: true,
        }
    }
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let valid_time = env::var("CPG_VALID_TIME")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .map(|t| {
                if !(MIN_VALID_TIME..=MAX_VALID_TIME).contains(&t) {
                    warn!(
                        "CPG_VALID_TIME must be between {MIN_VALID_TIME} and {MAX_VALID_TIME} minutes. Clamping {t}."
                    );
                }
                t.clamp(MIN_VALID_TIME, MAX_VALID_TIME)
            })
            .unwrap_or(DEFAULT_VALID_TIME);
        let accepted_tokens = env::var("CPG_ACCEPTED_TOKENS")
            .map(|s| s.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default();
        let language = env::var("CPG_LANGUAGE").ok().unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let accept_partial = parse_boolean_flag(env::var("CPG_ACCEPT_PARTIAL").ok(), true);
        let accept_over = parse_boolean_flag(env::var("CPG_ACCEPT_OVER").ok(), true);
        Self { valid_time, accepted_tokens, language, accept_partial, accept_over }
    }

    pub fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            valid_time: self.valid_time,
            accepted_tokens: self.accepted_tokens.clone(),
            language: self.language.clone(),
            accept_partial: self.accept_partial,
            accept_over: self.accept_over,
        }
    }
}
