use std::str::FromStr;

/// Default log filter when neither `ROD_SERVICE_LOG` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "rod_service=debug,tower_http=debug";

/// Runtime settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, spreadsheet uploads included
    pub max_upload_bytes: usize,
    /// Largest chain accepted for validation or analysis
    pub max_nodes: usize,
    pub log_filter: String,
    /// Variables that were set but could not be parsed
    pub warnings: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8085,
            max_upload_bytes: 5 * 1024 * 1024,
            max_nodes: 2_000,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            warnings: Vec::new(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);
        let port = parse_or("PORT", lookup("PORT"), defaults.port, &mut warnings);
        let max_upload_bytes = parse_or(
            "MAX_UPLOAD_BYTES",
            lookup("MAX_UPLOAD_BYTES"),
            defaults.max_upload_bytes,
            &mut warnings,
        );
        let max_nodes = parse_or(
            "MAX_NODES",
            lookup("MAX_NODES"),
            defaults.max_nodes,
            &mut warnings,
        );
        let log_filter = lookup("ROD_SERVICE_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or(defaults.log_filter);

        Self {
            host,
            port,
            max_upload_bytes,
            max_nodes,
            log_filter,
            warnings,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// The subscriber is not installed yet when the config is read, so problems are
// collected and logged by the caller.
fn parse_or<T>(key: &str, raw: Option<String>, default: T, warnings: &mut Vec<String>) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warnings.push(format!("Invalid {}={:?}, using default {}", key, value, default));
                default
            }
        },
    }
}
