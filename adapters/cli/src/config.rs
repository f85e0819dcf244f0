//! TOML configuration for the headless runner.

use std::{fs, io, path::Path, path::PathBuf, time::Duration};

use biscuit_battle_core::{ArbitrationTuning, Position};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_VISIBLE_MIN: [f32; 2] = [-8.0, -4.5];
const DEFAULT_VISIBLE_MAX: [f32; 2] = [8.0, 4.5];
const DEFAULT_OFFSCREEN_MARGIN: f32 = 1.0;

/// Errors raised while loading runner configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML for the expected tables.
    #[error("failed to parse config toml")]
    Parse(#[from] toml::de::Error),
    /// A duration in seconds was negative, non-finite or out of range.
    #[error("`{field}` must be a finite, non-negative number of seconds (received {value})")]
    InvalidDuration {
        /// Dotted key of the offending value.
        field: &'static str,
        /// Value found in the file.
        value: f64,
    },
    /// A numeric setting was outside its accepted range.
    #[error("`{field}` is out of range (received {value})")]
    InvalidNumber {
        /// Dotted key of the offending value.
        field: &'static str,
        /// Value found in the file.
        value: f64,
    },
}

/// Enemy spawner settings resolved from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpawnSettings {
    /// Time between enemies after the first.
    pub(crate) interval: Duration,
    /// Seed from the file, used when no seed flag is given.
    pub(crate) seed: Option<u64>,
    /// Lower corner of the visible region.
    pub(crate) visible_min: Position,
    /// Upper corner of the visible region.
    pub(crate) visible_max: Position,
    /// Distance outside the visible region where enemies appear.
    pub(crate) offscreen_margin: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            seed: None,
            visible_min: to_position(DEFAULT_VISIBLE_MIN),
            visible_max: to_position(DEFAULT_VISIBLE_MAX),
            offscreen_margin: DEFAULT_OFFSCREEN_MARGIN,
        }
    }
}

/// Fully resolved runner settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Settings {
    /// Arbitration thresholds applied to the world.
    pub(crate) tuning: ArbitrationTuning,
    /// Enemy spawner settings.
    pub(crate) spawning: SpawnSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    arbitration: ArbitrationTable,
    spawning: SpawningTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ArbitrationTable {
    claim_duration: Option<f64>,
    retarget_delay: Option<f64>,
    rate_per_second_for_max: Option<f32>,
    win_hold_duration: Option<f64>,
    stun_duration: Option<f64>,
    fade_duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpawningTable {
    interval: Option<f64>,
    seed: Option<u64>,
    visible_min: Option<[f32; 2]>,
    visible_max: Option<[f32; 2]>,
    offscreen_margin: Option<f32>,
}

/// Reads and resolves the configuration file at `path`.
pub(crate) fn load(path: &Path) -> Result<Settings, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents)
}

/// Resolves configuration text; missing keys keep their defaults.
pub(crate) fn parse(contents: &str) -> Result<Settings, ConfigError> {
    let file: FileConfig = toml::from_str(contents)?;
    let defaults = Settings::default();

    let arbitration = file.arbitration;
    let base = defaults.tuning;
    let tuning = ArbitrationTuning {
        claim_duration: seconds_or(
            "arbitration.claim_duration",
            arbitration.claim_duration,
            base.claim_duration,
        )?,
        retarget_delay: seconds_or(
            "arbitration.retarget_delay",
            arbitration.retarget_delay,
            base.retarget_delay,
        )?,
        rate_per_second_for_max: match arbitration.rate_per_second_for_max {
            Some(rate) if rate.is_finite() && rate > 0.0 => rate,
            Some(rate) => {
                return Err(ConfigError::InvalidNumber {
                    field: "arbitration.rate_per_second_for_max",
                    value: f64::from(rate),
                })
            }
            None => base.rate_per_second_for_max,
        },
        win_hold_duration: seconds_or(
            "arbitration.win_hold_duration",
            arbitration.win_hold_duration,
            base.win_hold_duration,
        )?,
        stun_duration: seconds_or(
            "arbitration.stun_duration",
            arbitration.stun_duration,
            base.stun_duration,
        )?,
        fade_duration: seconds_or(
            "arbitration.fade_duration",
            arbitration.fade_duration,
            base.fade_duration,
        )?,
    };

    let table = file.spawning;
    let spawn_defaults = defaults.spawning;
    let spawning = SpawnSettings {
        interval: seconds_or("spawning.interval", table.interval, spawn_defaults.interval)?,
        seed: table.seed,
        visible_min: corner_or("spawning.visible_min", table.visible_min, DEFAULT_VISIBLE_MIN)?,
        visible_max: corner_or("spawning.visible_max", table.visible_max, DEFAULT_VISIBLE_MAX)?,
        offscreen_margin: match table.offscreen_margin {
            Some(margin) if margin.is_finite() && margin >= 0.0 => margin,
            Some(margin) => {
                return Err(ConfigError::InvalidNumber {
                    field: "spawning.offscreen_margin",
                    value: f64::from(margin),
                })
            }
            None => spawn_defaults.offscreen_margin,
        },
    };

    check_span(spawning.visible_min, spawning.visible_max)?;

    Ok(Settings { tuning, spawning })
}

fn seconds_or(
    field: &'static str,
    value: Option<f64>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDuration { field, value });
    }
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}

fn corner_or(
    field: &'static str,
    value: Option<[f32; 2]>,
    default: [f32; 2],
) -> Result<Position, ConfigError> {
    let corner = value.unwrap_or(default);
    if let Some(bad) = corner.iter().find(|component| !component.is_finite()) {
        return Err(ConfigError::InvalidNumber {
            field,
            value: f64::from(*bad),
        });
    }
    Ok(to_position(corner))
}

fn check_span(min: Position, max: Position) -> Result<(), ConfigError> {
    for span in [max.x() - min.x(), max.y() - min.y()] {
        if !span.is_finite() {
            return Err(ConfigError::InvalidNumber {
                field: "spawning.visible_max",
                value: f64::from(span),
            });
        }
    }
    Ok(())
}

fn to_position([x, y]: [f32; 2]) -> Position {
    Position::new(x, y)
}
