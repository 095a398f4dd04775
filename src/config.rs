use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub admin_token: String,
    pub agent_name: String,
    pub agent_voice: String,
    pub default_company_name: String,
    pub include_state_listing: bool,
    pub ended_call_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            agent_name: env::var("AGENT_NAME").unwrap_or_else(|_| "Alex".to_string()),
            agent_voice: env::var("AGENT_VOICE").unwrap_or_else(|_| "Mark".to_string()),
            default_company_name: env::var("DEFAULT_COMPANY_NAME")
                .unwrap_or_else(|_| "Acme Appointments".to_string()),
            include_state_listing: env::var("INCLUDE_STATE_LISTING")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            ended_call_ttl_secs: env::var("ENDED_CALL_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
