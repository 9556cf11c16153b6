//! CLI configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use runtime::RuntimeConfig;

/// Configuration for a scripted simulation session.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Directory holding `config.toml`, `samples.ron` and `attributes.ron`.
    /// The bundled content is used when unset.
    pub data_dir: Option<PathBuf>,
    pub ticks: u64,
    pub runtime: RuntimeConfig,
    pub session_id: Option<String>,
    /// Where the final JSON report goes; stdout when unset.
    pub report_path: Option<PathBuf>,
    /// Mirror logs to stderr in addition to the session log file.
    pub log_to_stderr: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            ticks: 120,
            runtime: RuntimeConfig::default(),
            session_id: None,
            report_path: None,
            log_to_stderr: false,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `THERMAL_DATA_DIR` - Content directory (default: bundled content)
    /// - `THERMAL_TICKS` - Ticks to simulate (default: 120)
    /// - `THERMAL_TICK_MS` - Milliseconds per tick, 0 runs unpaced (default: 50)
    /// - `THERMAL_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `THERMAL_COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `THERMAL_SESSION_ID` - Session identifier for log files (default: auto-generated)
    /// - `THERMAL_REPORT` - Write the final report to this file instead of stdout
    /// - `THERMAL_LOG_STDERR` - Also log to stderr (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.data_dir = env::var("THERMAL_DATA_DIR").ok().map(PathBuf::from);

        if let Some(ticks) = read_env::<u64>("THERMAL_TICKS") {
            config.ticks = ticks;
        }

        if let Some(millis) = read_env::<u64>("THERMAL_TICK_MS") {
            config.runtime.tick_interval = Duration::from_millis(millis);
        }

        if let Some(capacity) = read_env::<usize>("THERMAL_EVENT_BUFFER") {
            config.runtime.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_env::<usize>("THERMAL_COMMAND_BUFFER") {
            config.runtime.command_buffer_size = capacity.max(1);
        }

        config.session_id = env::var("THERMAL_SESSION_ID").ok();
        config.report_path = env::var("THERMAL_REPORT").ok().map(PathBuf::from);

        if let Some(enable) = read_env::<bool>("THERMAL_LOG_STDERR") {
            config.log_to_stderr = enable;
        } else if env::var("THERMAL_LOG_STDERR").is_ok() {
            config.log_to_stderr = true;
        }

        config
    }

    /// Whether the run loop should sleep between ticks.
    pub fn paced(&self) -> bool {
        !self.runtime.tick_interval.is_zero()
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_paced_on_bundled_content() {
        let config = CliConfig::default();
        assert!(config.data_dir.is_none());
        assert!(config.paced());
        assert_eq!(config.runtime.tick_interval, RuntimeConfig::DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn zero_interval_disables_pacing() {
        let mut config = CliConfig::default();
        config.runtime.tick_interval = Duration::ZERO;
        assert!(!config.paced());
    }

    #[test]
    fn unset_variables_read_as_none() {
        assert_eq!(read_env::<u64>("THERMAL_TEST_SURELY_UNSET_VARIABLE"), None);
    }
}
