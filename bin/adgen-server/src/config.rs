//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

use strum::{Display, EnumString};

/// Which generation capability the server dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CapabilityKind {
    /// Built-in stand-in that echoes the reference image.
    Placeholder,
    /// External inference service reached over HTTP.
    Remote,
}

/// Runtime configuration for adgen-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Externally visible base URL, used to build artifact URLs
    /// (default: `"http://localhost:8000"`).
    pub public_base_url: String,

    /// Directory generated images are written to and served from.
    pub output_dir: PathBuf,

    /// Upper bound on a request body, in MiB.
    pub max_upload_size_mb: usize,

    /// Comma-separated CORS origin allow-list. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    pub capability: CapabilityKind,

    /// Endpoint of the inference service when `capability` is `remote`.
    pub capability_url: Option<String>,

    pub capability_timeout_secs: u64,

    /// Images produced per request by the placeholder capability.
    pub placeholder_count: usize,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Self {
            bind_address: env_or("ADGEN_BIND", "0.0.0.0:8000"),
            log_level: env_or("ADGEN_LOG", "info"),
            log_json: parse_flag(lookup("ADGEN_LOG_JSON"), false),
            public_base_url: env_or("ADGEN_PUBLIC_BASE_URL", "http://localhost:8000"),
            output_dir: PathBuf::from(env_or("ADGEN_OUTPUT_DIR", "generated_images")),
            max_upload_size_mb: parse_or(lookup("ADGEN_MAX_UPLOAD_SIZE_MB"), 50),
            cors_allowed_origins: lookup("ADGEN_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_swagger: parse_flag(lookup("ADGEN_ENABLE_SWAGGER"), true),
            capability: parse_or(lookup("ADGEN_CAPABILITY"), CapabilityKind::Placeholder),
            capability_url: lookup("ADGEN_CAPABILITY_URL").filter(|v| !v.trim().is_empty()),
            capability_timeout_secs: parse_or(lookup("ADGEN_CAPABILITY_TIMEOUT_SECS"), 120),
            placeholder_count: parse_or(lookup("ADGEN_PLACEHOLDER_COUNT"), 2),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// URL prefix under which stored artifacts are served.
    pub fn static_url_prefix(&self) -> String {
        format!("{}/static", self.public_base_url.trim_end_matches('/'))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
