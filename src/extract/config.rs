//! Extraction configuration.
//!
//! Defaults can be overridden from the environment (and a local `.env`):
//!
//! | variable | field |
//! | --- | --- |
//! | `VSHAPES_PARALLELISM` | worker threads |
//! | `VSHAPES_DIMENSIONS_PER_TASK` | dimensions per worker task |
//! | `VSHAPES_SELECTOR` | selector preset name |
//! | `VSHAPES_EMPIRICAL_PENALTY` | overrides the preset's penalty |
//! | `VSHAPES_COLLECT_ALL_FITS` | `true`/`false`/`1`/`0` |
//! | `VSHAPES_SPARKLINE_WIDTH` | sparkline characters |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};
use crate::extract::{DEFAULT_DIMENSIONS_PER_TASK, DatasetExtractor};
use crate::fit::SelectorPreset;
use crate::plot::DEFAULT_SPARKLINE_WIDTH;

pub const ENV_PARALLELISM: &str = "VSHAPES_PARALLELISM";
pub const ENV_DIMENSIONS_PER_TASK: &str = "VSHAPES_DIMENSIONS_PER_TASK";
pub const ENV_SELECTOR: &str = "VSHAPES_SELECTOR";
pub const ENV_EMPIRICAL_PENALTY: &str = "VSHAPES_EMPIRICAL_PENALTY";
pub const ENV_COLLECT_ALL_FITS: &str = "VSHAPES_COLLECT_ALL_FITS";
pub const ENV_SPARKLINE_WIDTH: &str = "VSHAPES_SPARKLINE_WIDTH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// `None` = available parallelism.
    pub parallelism: Option<usize>,
    pub dimensions_per_task: usize,
    pub selector: SelectorPreset,
    /// Replaces the preset's empirical penalty when set.
    pub empirical_penalty: Option<f64>,
    pub collect_all_fits: bool,
    pub sparkline_width: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            dimensions_per_task: DEFAULT_DIMENSIONS_PER_TASK,
            selector: SelectorPreset::default(),
            empirical_penalty: None,
            collect_all_fits: false,
            sparkline_width: DEFAULT_SPARKLINE_WIDTH,
        }
    }
}

impl ExtractionConfig {
    /// Defaults overridden by `VSHAPES_*` variables (loads `.env` first).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_PARALLELISM) {
            config.parallelism = Some(parse(ENV_PARALLELISM, &v)?);
        }
        if let Some(v) = get(ENV_DIMENSIONS_PER_TASK) {
            config.dimensions_per_task = parse(ENV_DIMENSIONS_PER_TASK, &v)?;
        }
        if let Some(v) = get(ENV_SELECTOR) {
            config.selector = v.parse()?;
        }
        if let Some(v) = get(ENV_EMPIRICAL_PENALTY) {
            config.empirical_penalty = Some(parse(ENV_EMPIRICAL_PENALTY, &v)?);
        }
        if let Some(v) = get(ENV_COLLECT_ALL_FITS) {
            config.collect_all_fits = parse_bool(ENV_COLLECT_ALL_FITS, &v)?;
        }
        if let Some(v) = get(ENV_SPARKLINE_WIDTH) {
            config.sparkline_width = parse(ENV_SPARKLINE_WIDTH, &v)?;
        }

        Ok(config)
    }

    pub fn build(&self) -> Result<DatasetExtractor> {
        let mut selector = self.selector.selector();
        if let Some(p) = self.empirical_penalty {
            selector = selector.with_empirical_penalty(p)?;
        }

        DatasetExtractor::builder()
            .selector(selector)
            .parallelism(self.parallelism)
            .dimensions_per_task(self.dimensions_per_task)
            .collect_all_fits(self.collect_all_fits)
            .sparkline_width(self.sparkline_width)
            .build()
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ExtractError::Config(format!("{key}: cannot parse '{value}'")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ExtractError::Config(format!(
            "{key}: expected a boolean, got '{value}'"
        ))),
    }
}
