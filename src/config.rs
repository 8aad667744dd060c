use crate::flight_control::FlightThresholds;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: circuit-flyer [OPTIONS]

Options:
  --host <HOST>  Vehicle link host [default: 127.0.0.1]
  --port <PORT>  Vehicle link port [default: 5760]
  -h, --help     Print this help

Environment:
  FLYER_ARRIVAL_RADIUS, FLYER_SETTLE_SPEED, FLYER_ALTITUDE_FRACTION,
  FLYER_LANDED_EPSILON, FLYER_HOME_ALT_MARGIN
                 Override the phase guard thresholds
  FLYER_LOG_DIR, FLYER_LOG_FILE
                 Nav log location [default: Logs/NavLog.txt]
  LOG_FLYER_EVENTS
                 Trace every telemetry event and command";

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A flag was given without its value.
    MissingValue(String),
    /// A flag or environment value could not be parsed.
    InvalidValue { key: String, value: String },
    UnknownFlag(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingValue(flag) => write!(f, "missing value for {flag}"),
            ConfigError::InvalidValue { key, value } => write!(f, "invalid value '{value}' for {key}"),
            ConfigError::UnknownFlag(flag) => write!(f, "unknown option {flag}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// What the command line asked for.
#[derive(Debug, PartialEq)]
pub enum Invocation {
    Run(MissionConfig),
    Help,
}

/// Everything the binary needs to fly one mission.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionConfig {
    pub host: String,
    pub port: u16,
    pub thresholds: FlightThresholds,
    pub log_dir: PathBuf,
    pub log_file: String,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            thresholds: FlightThresholds::default(),
            log_dir: PathBuf::from(Self::DEFAULT_LOG_DIR),
            log_file: Self::DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl MissionConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 5760;
    pub const DEFAULT_LOG_DIR: &'static str = "Logs";
    pub const DEFAULT_LOG_FILE: &'static str = "NavLog.txt";

    /// Reads the process arguments and environment.
    ///
    /// # Errors
    /// See [`MissionConfig::parse`].
    pub fn from_env() -> Result<Invocation, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args, |key| std::env::var(key).ok())
    }

    /// Builds a config from command line arguments (without the program name)
    /// and an environment lookup.
    ///
    /// # Errors
    /// Unknown flags, flags missing their value and unparsable values.
    pub fn parse<F>(args: &[String], env: F) -> Result<Invocation, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut raw = args.iter();
        while let Some(arg) = raw.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
                _ => (arg.as_str(), None),
            };
            match flag {
                "-h" | "--help" => return Ok(Invocation::Help),
                "--host" | "--port" => {
                    let value = inline
                        .or_else(|| raw.next().cloned())
                        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
                    if flag == "--host" {
                        if value.is_empty() {
                            return Err(ConfigError::InvalidValue { key: flag.to_string(), value });
                        }
                        config.host = value;
                    } else {
                        config.port = parse_value(flag, &value)?;
                    }
                }
                other => return Err(ConfigError::UnknownFlag(other.to_string())),
            }
        }
        config.apply_env(env)?;
        Ok(Invocation::Run(config))
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let th = &mut self.thresholds;
        let overrides: [(&str, &mut f64); 5] = [
            ("FLYER_ARRIVAL_RADIUS", &mut th.arrival_radius),
            ("FLYER_SETTLE_SPEED", &mut th.settle_speed),
            ("FLYER_ALTITUDE_FRACTION", &mut th.altitude_fraction),
            ("FLYER_LANDED_EPSILON", &mut th.landed_epsilon),
            ("FLYER_HOME_ALT_MARGIN", &mut th.home_altitude_margin),
        ];
        for (key, slot) in overrides {
            if let Some(value) = env(key) {
                *slot = parse_value(key, &value)?;
            }
        }
        if let Some(dir) = env("FLYER_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(file) = env("FLYER_LOG_FILE") {
            self.log_file = file;
        }
        Ok(())
    }

    /// Vehicle link endpoint, `tcp:<host>:<port>`.
    pub fn endpoint(&self) -> String { format!("tcp:{}:{}", self.host, self.port) }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(raw: &[&str]) -> Vec<String> { raw.iter().map(ToString::to_string).collect() }

    fn no_env(_: &str) -> Option<String> { None }

    fn run(raw: &[&str]) -> MissionConfig {
        match MissionConfig::parse(&args(raw), no_env).unwrap() {
            Invocation::Run(config) => config,
            Invocation::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = run(&[]);
        assert_eq!(config, MissionConfig::default());
        assert_eq!(config.endpoint(), "tcp:127.0.0.1:5760");
        assert_eq!(config.thresholds, FlightThresholds::default());
    }

    #[test]
    fn test_host_and_port_forms() {
        assert_eq!(run(&["--port", "14550"]).endpoint(), "tcp:127.0.0.1:14550");
        assert_eq!(run(&["--port=14551", "--host", "sim.local"]).endpoint(), "tcp:sim.local:14551");
        assert_eq!(run(&["--host=10.0.0.2"]).endpoint(), "tcp:10.0.0.2:5760");
        // Last one wins.
        assert_eq!(run(&["--port", "1", "--port", "2"]).port, 2);
    }

    #[test]
    fn test_help() {
        assert_eq!(MissionConfig::parse(&args(&["--port", "1", "-h"]), no_env), Ok(Invocation::Help));
        assert_eq!(MissionConfig::parse(&args(&["--help"]), no_env), Ok(Invocation::Help));
    }

    #[test]
    fn test_cli_errors() {
        assert_eq!(
            MissionConfig::parse(&args(&["--port"]), no_env),
            Err(ConfigError::MissingValue("--port".to_string()))
        );
        assert_eq!(
            MissionConfig::parse(&args(&["--port", "70000"]), no_env),
            Err(ConfigError::InvalidValue { key: "--port".to_string(), value: "70000".to_string() })
        );
        assert_eq!(
            MissionConfig::parse(&args(&["--connect", "tcp:x:1"]), no_env),
            Err(ConfigError::UnknownFlag("--connect".to_string()))
        );
        assert!(matches!(
            MissionConfig::parse(&args(&["--host="]), no_env),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FLYER_ARRIVAL_RADIUS", "0.5"),
            ("FLYER_LANDED_EPSILON", " 0.05 "),
            ("FLYER_LOG_DIR", "/tmp/flights"),
            ("FLYER_LOG_FILE", "run.csv"),
        ]);
        let lookup = |key: &str| env.get(key).map(ToString::to_string);
        let Ok(Invocation::Run(config)) = MissionConfig::parse(&[], lookup) else {
            panic!("expected a run configuration");
        };
        assert!((config.thresholds.arrival_radius - 0.5).abs() < f64::EPSILON);
        assert!((config.thresholds.landed_epsilon - 0.05).abs() < f64::EPSILON);
        assert!((config.thresholds.settle_speed - FlightThresholds::DEFAULT_SETTLE_SPEED).abs() < f64::EPSILON);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/flights"));
        assert_eq!(config.log_file, "run.csv");
    }

    #[test]
    fn test_takeoff_altitude_not_configurable() {
        let lookup = |key: &str| (key == "FLYER_TAKEOFF_ALTITUDE").then(|| "10".to_string());
        assert_eq!(MissionConfig::parse(&[], lookup), Ok(Invocation::Run(MissionConfig::default())));
    }

    #[test]
    fn test_env_invalid_threshold() {
        let lookup = |key: &str| (key == "FLYER_SETTLE_SPEED").then(|| "fast".to_string());
        assert_eq!(
            MissionConfig::parse(&[], lookup),
            Err(ConfigError::InvalidValue {
                key: "FLYER_SETTLE_SPEED".to_string(),
                value: "fast".to_string()
            })
        );
    }
}
