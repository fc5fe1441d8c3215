//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first, if present.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::DEFAULT_MIN_STOCK;
use crate::stats::DEFAULT_TOP_MEDICATIONS;

pub const DATABASE_PATH_VAR: &str = "PATIENT_RECORDS_DB";
pub const TOP_MEDICATIONS_VAR: &str = "PATIENT_RECORDS_TOP_MEDICATIONS";
pub const MIN_STOCK_VAR: &str = "PATIENT_RECORDS_MIN_STOCK";
pub const LOG_FILTER_VAR: &str = "PATIENT_RECORDS_LOG";

pub const DEFAULT_DATABASE_PATH: &str = "patient_records.db";
pub const DEFAULT_LOG_FILTER: &str = "patient_records_core=info";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    /// Length of the dashboard's top medications list
    pub top_medications: usize,
    /// Restock threshold given to medications created without one
    pub default_min_stock: u32,
    /// `tracing_subscriber::EnvFilter` directives
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            top_medications: DEFAULT_TOP_MEDICATIONS,
            default_min_stock: DEFAULT_MIN_STOCK,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any variable source. Unset or blank variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            database_path: get(DATABASE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            top_medications: match get(TOP_MEDICATIONS_VAR) {
                Some(value) => parse_number(TOP_MEDICATIONS_VAR, &value)?,
                None => defaults.top_medications,
            },
            default_min_stock: match get(MIN_STOCK_VAR) {
                Some(value) => parse_number(MIN_STOCK_VAR, &value)?,
                None => defaults.default_min_stock,
            },
            log_filter: get(LOG_FILTER_VAR).unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
