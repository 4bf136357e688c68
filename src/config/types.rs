use serde::Deserialize;

/// Main configuration structure for the harvester
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the values used against the production portal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote registration listing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the registration listing
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of rows requested per page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Hard ceiling on the number of pages fetched in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Total time allowed for one page request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://112.137.129.87/qldt".to_string(),
            page_size: 25_000,
            max_pages: 10_000,
            request_timeout_secs: 600,
            connect_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Strategy used to pull records out of a listing page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserStrategy {
    /// One regular expression over the raw markup
    #[default]
    Pattern,
    /// Walk the parsed table rows
    Table,
}

/// Record parser configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub strategy: ParserStrategy,
}

/// Record filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Case-sensitive substrings marking exempted or placeholder sections
    #[serde(rename = "exemption-markers")]
    pub exemption_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exemption_markers: vec!["mien".to_string(), "PES".to_string()],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "database.db".to_string(),
        }
    }
}
