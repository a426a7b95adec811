use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_QUANTUM_NS;
use crate::error::{OssError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Scheduler configuration.
///
/// Resolved from defaults, then an optional TOML file, then `OSS_*`
/// environment variables; the CLI applies its own flags last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Total number of workers to launch over the whole run (`-n`).
    #[serde(default = "default_task_quota")]
    pub task_quota: u32,
    /// Maximum simultaneously running workers (`-s`).
    #[serde(default = "default_concurrency")]
    pub concurrency_ceiling: u32,
    /// Upper bound, in whole seconds, of a worker's randomized lifetime (`-t`).
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u64,
    /// Minimum gap between launches in milliseconds (`-i`), applied in virtual time.
    #[serde(default = "default_launch_interval")]
    pub launch_interval_ms: u64,
    /// Virtual nanoseconds added to the clock per loop iteration.
    #[serde(default = "default_quantum")]
    pub quantum_ns: u64,
    /// Virtual nanoseconds between status table reports.
    #[serde(default = "default_report_interval")]
    pub report_interval_ns: u64,
    /// Real-time limit for the whole run, in seconds.
    #[serde(default = "default_watchdog")]
    pub watchdog_secs: u64,
    /// Worker executable. Defaults to `worker` next to the scheduler binary.
    #[serde(default)]
    pub worker_bin: Option<PathBuf>,
    /// Clock region path. Defaults to a per-process file in the temp dir.
    #[serde(default)]
    pub region_path: Option<PathBuf>,
}

fn default_task_quota() -> u32 { 5 }
fn default_concurrency() -> u32 { 2 }
fn default_time_limit() -> u64 { 3 }
fn default_launch_interval() -> u64 { 100 }
fn default_quantum() -> u64 { DEFAULT_QUANTUM_NS }
fn default_report_interval() -> u64 { 500_000_000 }
fn default_watchdog() -> u64 { 60 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            task_quota: default_task_quota(),
            concurrency_ceiling: default_concurrency(),
            time_limit_secs: default_time_limit(),
            launch_interval_ms: default_launch_interval(),
            quantum_ns: default_quantum(),
            report_interval_ns: default_report_interval(),
            watchdog_secs: default_watchdog(),
            worker_bin: None,
            region_path: None,
        }
    }
}

impl SchedulerConfig {
    /// Parse config from a TOML string. Env overrides are not applied here.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| OssError::ConfigIo(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Apply `OSS_*` environment variable overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve each `OSS_*` key.
    ///
    /// Convention: `OSS_<FIELD>` overrides the matching field. Empty values are
    /// ignored; unparsable numbers are a configuration error.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("OSS_TASK_QUOTA") {
            self.task_quota = parse_env("OSS_TASK_QUOTA", &v)?;
        }
        if let Some(v) = get("OSS_CONCURRENCY") {
            self.concurrency_ceiling = parse_env("OSS_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("OSS_TIME_LIMIT") {
            self.time_limit_secs = parse_env("OSS_TIME_LIMIT", &v)?;
        }
        if let Some(v) = get("OSS_LAUNCH_INTERVAL_MS") {
            self.launch_interval_ms = parse_env("OSS_LAUNCH_INTERVAL_MS", &v)?;
        }
        if let Some(v) = get("OSS_QUANTUM_NS") {
            self.quantum_ns = parse_env("OSS_QUANTUM_NS", &v)?;
        }
        if let Some(v) = get("OSS_WATCHDOG_SECS") {
            self.watchdog_secs = parse_env("OSS_WATCHDOG_SECS", &v)?;
        }
        if let Some(v) = get("OSS_WORKER_BIN") {
            self.worker_bin = Some(PathBuf::from(v));
        }
        if let Some(v) = get(crate::shared::REGION_ENV) {
            self.region_path = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Check parameter bounds. Must pass before any shared state is created.
    pub fn validate(&self) -> Result<()> {
        if self.task_quota < 1 {
            return Err(OssError::Config(
                "task quota (-n) must be at least 1".to_string(),
            ));
        }
        if self.time_limit_secs < 1 {
            return Err(OssError::Config(
                "worker time limit (-t) must be at least 1 second".to_string(),
            ));
        }
        if self.quantum_ns < 1 {
            return Err(OssError::Config(
                "clock quantum must be at least 1ns".to_string(),
            ));
        }
        if self.report_interval_ns < 1 {
            return Err(OssError::Config(
                "report interval must be at least 1ns".to_string(),
            ));
        }
        if self.watchdog_secs < 1 {
            return Err(OssError::Config(
                "watchdog must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// The launch interval converted to virtual nanoseconds.
    pub fn min_interval_nanos(&self) -> u64 {
        self.launch_interval_ms.saturating_mul(1_000_000)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.watchdog_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| OssError::Config(format!("{key}: invalid value '{value}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = SchedulerConfig::default();
        assert_eq!(config.quantum_ns, 100_000);
        assert_eq!(config.watchdog_secs, 60);
        assert_eq!(config.report_interval_ns, 500_000_000);
        config.validate().unwrap();
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let config = SchedulerConfig::from_toml(
            r#"
            task_quota = 9
            launch_interval_ms = 250
            worker_bin = "/opt/oss/worker"
            "#,
        )
        .unwrap();
        assert_eq!(config.task_quota, 9);
        assert_eq!(config.launch_interval_ms, 250);
        assert_eq!(config.worker_bin, Some(PathBuf::from("/opt/oss/worker")));
        assert_eq!(config.concurrency_ceiling, 2);
        assert_eq!(config.min_interval_nanos(), 250_000_000);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = SchedulerConfig::from_toml("task_quota = \"many\"").unwrap_err();
        assert!(matches!(err, OssError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_config_io_error() {
        let err = SchedulerConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, OssError::ConfigIo(_)));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oss.toml");
        std::fs::write(&path, "concurrency_ceiling = 7\n").unwrap();
        let config = SchedulerConfig::from_file(&path).unwrap();
        assert_eq!(config.concurrency_ceiling, 7);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SchedulerConfig::default();
        config
            .apply_overrides_from(env_of(&[
                ("OSS_TASK_QUOTA", "12"),
                ("OSS_CONCURRENCY", "4"),
                ("OSS_TIME_LIMIT", "2"),
                ("OSS_LAUNCH_INTERVAL_MS", "0"),
                ("OSS_CLOCK_REGION", "/tmp/clock"),
                ("OSS_WORKER_BIN", ""),
            ]))
            .unwrap();
        assert_eq!(config.task_quota, 12);
        assert_eq!(config.concurrency_ceiling, 4);
        assert_eq!(config.time_limit_secs, 2);
        assert_eq!(config.launch_interval_ms, 0);
        assert_eq!(config.region_path, Some(PathBuf::from("/tmp/clock")));
        assert_eq!(config.worker_bin, None);
    }

    #[test]
    fn unparsable_env_override_is_config_error() {
        let mut config = SchedulerConfig::default();
        let err = config
            .apply_overrides_from(env_of(&[("OSS_TASK_QUOTA", "lots")]))
            .unwrap_err();
        assert!(matches!(err, OssError::Config(_)));
    }

    #[test]
    fn validate_rejects_zero_quota_and_time_limit() {
        let mut config = SchedulerConfig::default();
        config.task_quota = 0;
        assert!(matches!(config.validate(), Err(OssError::Config(_))));

        let mut config = SchedulerConfig::default();
        config.time_limit_secs = 0;
        assert!(matches!(config.validate(), Err(OssError::Config(_))));
    }

    #[test]
    fn zero_concurrency_is_allowed() {
        let mut config = SchedulerConfig::default();
        config.concurrency_ceiling = 0;
        config.validate().unwrap();
    }
}
