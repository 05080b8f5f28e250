use crate::cache::DEFAULT_CACHE_TTL_HOURS;
use crate::error::{BriefingError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE: &str = "accounting_balance_sheets";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    #[serde(skip_serializing)]
    pub key: String,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingConfig {
    /// Absent when `SUPABASE_URL` or `SUPABASE_KEY` is unset.
    pub supabase: Option<SupabaseSettings>,
    /// Absent when `OPENAI_API_KEY` is unset; narrative features are then disabled.
    pub llm: Option<LlmSettings>,
    pub cache_ttl_hours: i64,
    pub bind_address: String,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            supabase: None,
            llm: None,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl BriefingConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_KEY")) {
            (Some(url), Some(key)) => Some(SupabaseSettings {
                url: url.trim_end_matches('/').to_string(),
                key,
                table: get("BALANCE_SHEET_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            }),
            (Some(_), None) => {
                return Err(BriefingError::ConfigError(
                    "SUPABASE_URL is set but SUPABASE_KEY is missing".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(BriefingError::ConfigError(
                    "SUPABASE_KEY is set but SUPABASE_URL is missing".to_string(),
                ))
            }
            (None, None) => None,
        };

        let llm = get("OPENAI_API_KEY").map(|api_key| LlmSettings {
            api_key,
            base_url: get("LLM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        });

        let cache_ttl_hours = match get("CACHE_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours >= 0)
                .ok_or_else(|| {
                    BriefingError::ConfigError(format!(
                        "CACHE_TTL_HOURS must be a non-negative integer, got '{}'",
                        raw
                    ))
                })?,
            None => DEFAULT_CACHE_TTL_HOURS,
        };

        Ok(Self {
            supabase,
            llm,
            cache_ttl_hours,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
        })
    }
}
