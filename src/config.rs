use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{Error, Result};

pub const DEFAULT_GRID_NAME: &str = "Singapore";
pub const DEFAULT_GRID_ID: u64 = 3617140517;

/// Earth radius in metres, used as the Mercator scale factor.
pub const DEFAULT_PROJECTION_SCALE: f64 = 6371393.0;

const DEFAULT_MAX_BODY_BYTES: u64 = 512 * 1024 * 1024;

/// What to do when a way references a node that is missing from the node
/// table or has no coordinates.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingNodePolicy {
    #[default]
    Skip,
    Warn,
    Fail,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoaderConfig {
    pub default_name: String,
    pub default_id: u64,
    pub default_is_area: bool,
    pub projection_scale: f64,
    pub missing_node_policy: MissingNodePolicy,
    pub http_timeout_secs: Option<u64>,
    pub max_body_bytes: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            default_name: DEFAULT_GRID_NAME.to_string(),
            default_id: DEFAULT_GRID_ID,
            default_is_area: true,
            projection_scale: DEFAULT_PROJECTION_SCALE,
            missing_node_policy: MissingNodePolicy::Skip,
            http_timeout_secs: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            user_agent: concat!("osm-grid-loader/", env!("CARGO_PKG_VERSION")).to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl LoaderConfig {
    fn validate(self) -> Result<Self> {
        if !(self.projection_scale.is_finite() && self.projection_scale > 0.0) {
            return Err(Error::Config(format!(
                "projection_scale must be a positive number, got {}",
                self.projection_scale
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(Error::Config("max_body_bytes must be non-zero".to_string()));
        }
        Ok(self)
    }
}

pub fn load_config(path: &Path) -> Result<LoaderConfig> {
    let file = File::open(path)
        .map_err(|err| Error::Config(format!("could not open {}: {}", path.display(), err)))?;
    let config: LoaderConfig = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::Config(format!("could not parse {}: {}", path.display(), err)))?;
    config.validate()
}
