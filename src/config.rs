use std::env;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub service_port: u16,
    pub service_host: String,
    pub filter_parallel_threshold: usize,
    pub filter_chunk_size: usize,
    pub default_page_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());

        let filter_parallel_threshold = lookup("FILTER_PARALLEL_THRESHOLD")
            .unwrap_or_else(|| "2048".to_string())
            .parse::<usize>()
            .context("FILTER_PARALLEL_THRESHOLD must be a non-negative integer")?;

        let filter_chunk_size = lookup("FILTER_CHUNK_SIZE")
            .unwrap_or_else(|| "512".to_string())
            .parse::<usize>()
            .ok()
            .filter(|size| *size > 0)
            .context("FILTER_CHUNK_SIZE must be a positive integer")?;

        let default_page_limit = lookup("DEFAULT_PAGE_LIMIT")
            .unwrap_or_else(|| "100".to_string())
            .parse::<usize>()
            .context("DEFAULT_PAGE_LIMIT must be a non-negative integer")?;

        Ok(Config {
            service_port,
            service_host,
            filter_parallel_threshold,
            filter_chunk_size,
            default_page_limit,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
        tracing::info!(
            "  Chunked filtering from {} responses ({} per chunk)",
            self.filter_parallel_threshold,
            self.filter_chunk_size
        );
        tracing::info!("  Default page limit: {}", self.default_page_limit);
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
            filter_parallel_threshold: 2048,
            filter_chunk_size: 512,
            default_page_limit: 100,
        }
    }
}
