use serde::{Deserialize, Serialize};
use skiload_client::ClientConfig;
use skiload_common::{Result, SkiLoadError, MAX_LIFTS, MAX_SKI_DAY, MAX_THREADS, MIN_LIFTS, MIN_THREADS};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::phase::{PhaseProfile, PhaseProfiles};

pub const DEFAULT_RESORT_ID: &str = "SilverMt";
pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:8080";

/// Everything a run needs. Every field has a default, so a config file only
/// has to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Worker budget `M`: phase two runs `M` workers, phases one and three `M / 4`.
    pub max_threads: u32,
    pub num_skiers: u32,
    pub num_lifts: u32,
    pub ski_day: u32,
    pub resort_id: String,
    pub server_address: String,
    /// Latency log destination; defaults to `latency_<max_threads>_threads.csv`.
    pub output_file: Option<PathBuf>,
    /// Connect and request timeout for every API call, in seconds.
    pub timeout_secs: u64,
    pub phases: PhaseProfiles,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_threads: MAX_THREADS,
            num_skiers: 50_000,
            num_lifts: 40,
            ski_day: 1,
            resort_id: DEFAULT_RESORT_ID.to_string(),
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            output_file: None,
            timeout_secs: 120,
            phases: PhaseProfiles::default(),
        }
    }
}

impl RunConfig {
    /// Parse a TOML config file. Values are not range-checked here; call
    /// [`RunConfig::validate`] once every override has been applied.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SkiLoadError::InvalidConfig(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SkiLoadError::InvalidConfig(e.to_string()))
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            Some(p) => {
                warn!(path = %p.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("max_threads", self.max_threads, MIN_THREADS, MAX_THREADS)?;
        check_range("num_lifts", self.num_lifts, MIN_LIFTS, MAX_LIFTS)?;
        check_range("ski_day", self.ski_day, 1, MAX_SKI_DAY)?;
        if self.resort_id.trim().is_empty() {
            return Err(SkiLoadError::InvalidConfig("resort_id must not be empty".to_string()));
        }
        if self.server_address.trim().is_empty() {
            return Err(SkiLoadError::InvalidConfig("server_address must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(SkiLoadError::InvalidConfig("timeout_secs must be at least 1".to_string()));
        }
        check_profile("startup", &self.phases.startup)?;
        check_profile("peak", &self.phases.peak)?;
        check_profile("cooldown", &self.phases.cooldown)?;
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("latency_{}_threads.csv", self.max_threads)))
    }

    pub fn client_config(&self) -> ClientConfig {
        let timeout = Duration::from_secs(self.timeout_secs);
        ClientConfig {
            base_url: self.server_address.clone(),
            connect_timeout: timeout,
            request_timeout: timeout,
        }
    }
}

/// Values given on the command line; each one replaces the file's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub max_threads: Option<u32>,
    pub num_skiers: Option<u32>,
    pub num_lifts: Option<u32>,
    pub ski_day: Option<u32>,
    pub resort_id: Option<String>,
    pub server_address: Option<String>,
    pub output_file: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut RunConfig) {
        if let Some(v) = self.max_threads {
            config.max_threads = v;
        }
        if let Some(v) = self.num_skiers {
            config.num_skiers = v;
        }
        if let Some(v) = self.num_lifts {
            config.num_lifts = v;
        }
        if let Some(v) = self.ski_day {
            config.ski_day = v;
        }
        if let Some(v) = self.resort_id {
            config.resort_id = v;
        }
        if let Some(v) = self.server_address {
            config.server_address = v;
        }
        if let Some(v) = self.output_file {
            config.output_file = Some(v);
        }
    }
}

fn check_range(name: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SkiLoadError::InvalidConfig(format!("{name} must be in {min}..={max}, got {value}")))
    }
}

fn check_profile(name: &str, profile: &PhaseProfile) -> Result<()> {
    if profile.time_start >= profile.time_end {
        return Err(SkiLoadError::InvalidConfig(format!(
            "{name} phase time_start ({}) must be below time_end ({})",
            profile.time_start, profile.time_end
        )));
    }
    Ok(())
}
