//! # Configuration
//!
//! Settings come from environment variables; log filtering stays with `RUST_LOG`.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `INVENTORY_PAGE_SIZE` | unset | Objects per page; unset lets the service choose |
//! | `INVENTORY_OUTPUT` | `text` | `text` or `json` |
//! | `INVENTORY_SERVICE_BUFFER` | `32` | Request channel capacity of the collector |

use crate::error::BrowserError;
use property_collector::RetrieveOptions;
use std::str::FromStr;

pub const PAGE_SIZE_VAR: &str = "INVENTORY_PAGE_SIZE";
pub const OUTPUT_VAR: &str = "INVENTORY_OUTPUT";
pub const SERVICE_BUFFER_VAR: &str = "INVENTORY_SERVICE_BUFFER";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(BrowserError::Config(format!(
                "{OUTPUT_VAR} must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    pub page_size: Option<u32>,
    pub output: OutputFormat,
    pub service_buffer: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: None,
            output: OutputFormat::Text,
            service_buffer: 32,
        }
    }
}

impl BrowserConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, BrowserError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BrowserError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(PAGE_SIZE_VAR) {
            config.page_size = Some(parse_positive(PAGE_SIZE_VAR, &raw)?);
        }
        if let Some(raw) = lookup(OUTPUT_VAR) {
            config.output = raw.parse()?;
        }
        if let Some(raw) = lookup(SERVICE_BUFFER_VAR) {
            config.service_buffer = parse_positive(SERVICE_BUFFER_VAR, &raw)? as usize;
        }
        Ok(config)
    }

    pub fn retrieve_options(&self) -> RetrieveOptions {
        RetrieveOptions {
            max_objects: self.page_size,
        }
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u32, BrowserError> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(BrowserError::Config(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}
