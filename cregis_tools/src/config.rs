use cpg_common::{parse_boolean_flag, Secret};
use log::*;

/// Connection settings for the Cregis API.
///
/// `debug` is threaded through explicitly so request/response payload logging is a deliberate configuration choice
/// rather than ambient process state.
#[derive(Debug, Clone, Default)]
pub struct CregisConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// The merchant project id assigned by the processor.
    pub pid: u64,
    pub debug: bool,
}

impl CregisConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("CPG_API_URL").unwrap_or_else(|_| {
            warn!("CPG_API_URL not set, using https://api.cregis.io as default");
            "https://api.cregis.io".to_string()
        });
        let api_key = Secret::new(std::env::var("CPG_API_KEY").unwrap_or_else(|_| {
            warn!("CPG_API_KEY not set, using (probably useless) default");
            String::default()
        }));
        let pid = std::env::var("CPG_PID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(|| {
                warn!("CPG_PID is not set to a valid project id. Using 0, which the processor will reject.");
                0
            });
        let debug = parse_boolean_flag(std::env::var("CPG_DEBUG").ok(), false);
        Self { api_url, api_key, pid, debug }
    }
}
