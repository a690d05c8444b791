use std::env;

use anyhow::Context;

use crate::curriculum::{HttpBackend, DEFAULT_BASE_URL};

pub const API_URL_VAR: &str = "COURSEFORGE_API_URL";
pub const TOKEN_VAR: &str = "COURSEFORGE_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub token: String,
}

impl Config {
    pub fn new(api_url: &str, token: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            token: token.to_string(),
        }
    }

    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token = lookup(TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .context(format!("{TOKEN_VAR} must be set to an access token"))?;

        Ok(Self::new(&api_url, &token))
    }

    pub fn backend(&self) -> HttpBackend {
        HttpBackend::new(&self.api_url, &self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn api_url_defaults_to_local_server() {
        let config = Config::from_lookup(lookup(&[(TOKEN_VAR, "abc")])).unwrap();
        assert_eq!(config, Config::new(DEFAULT_BASE_URL, "abc"));
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(lookup(&[(API_URL_VAR, "https://api.example")])).unwrap_err();
        assert!(err.to_string().contains(TOKEN_VAR));
    }
}
