//! Editor configuration loaded from `SITEMARK_*` environment variables.
//!
//! Every knob has a default from [`crate::consts`]; a variable that is set but
//! unparsable is an error rather than a silent fallback. Loading goes through
//! [`EditorConfig::from_lookup`] so tests can supply variables without
//! touching the process environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;
use std::str::FromStr;

use crate::camera::ZoomPolicy;
use crate::consts::{
    CLICK_THRESHOLD_PX, DOUBLE_CLICK_MS, DUPLICATE_OFFSET, FIT_MARGIN, HISTORY_LIMIT, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP,
};

const DEFAULT_USER_ID: &str = "local";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}")]
    Parse { key: &'static str, value: String },
    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

/// Tunables for the engine and store.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub zoom: ZoomPolicy,
    /// `SITEMARK_CLICK_THRESHOLD_PX`
    pub click_threshold_px: f64,
    /// `SITEMARK_DOUBLE_CLICK_MS`
    pub double_click_ms: u64,
    /// `SITEMARK_DUPLICATE_OFFSET`
    pub duplicate_offset: f64,
    /// `SITEMARK_HISTORY_LIMIT`
    pub history_limit: usize,
    /// `SITEMARK_USER_ID`, stamped on audit entries.
    pub user_id: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomPolicy::default(),
            click_threshold_px: CLICK_THRESHOLD_PX,
            double_click_ms: DOUBLE_CLICK_MS,
            duplicate_offset: DUPLICATE_OFFSET,
            history_limit: HISTORY_LIMIT,
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }
}

impl EditorConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but malformed or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| var_value(key, std::env::var(key)))
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// As for [`EditorConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::load(|key| Ok(lookup(key)))
    }

    fn load(lookup: impl Fn(&'static str) -> Result<Option<String>, ConfigError>) -> Result<Self, ConfigError> {
        let zoom = ZoomPolicy {
            step: parse_var(&lookup, "SITEMARK_ZOOM_STEP", ZOOM_STEP)?,
            min: parse_var(&lookup, "SITEMARK_MIN_ZOOM", MIN_ZOOM)?,
            max: parse_var(&lookup, "SITEMARK_MAX_ZOOM", MAX_ZOOM)?,
            fit_margin: parse_var(&lookup, "SITEMARK_FIT_MARGIN", FIT_MARGIN)?,
        };
        if zoom.step <= 1.0 {
            return Err(ConfigError::Invalid { key: "SITEMARK_ZOOM_STEP", reason: "must be greater than 1" });
        }
        if zoom.min <= 0.0 || zoom.min > zoom.max {
            return Err(ConfigError::Invalid { key: "SITEMARK_MIN_ZOOM", reason: "must be positive and at most SITEMARK_MAX_ZOOM" });
        }
        if zoom.fit_margin <= 0.0 || zoom.fit_margin > 1.0 {
            return Err(ConfigError::Invalid { key: "SITEMARK_FIT_MARGIN", reason: "must be in (0, 1]" });
        }

        let history_limit = parse_var(&lookup, "SITEMARK_HISTORY_LIMIT", HISTORY_LIMIT)?;
        if history_limit == 0 {
            return Err(ConfigError::Invalid { key: "SITEMARK_HISTORY_LIMIT", reason: "must be at least 1" });
        }

        let config = Self {
            zoom,
            click_threshold_px: parse_var(&lookup, "SITEMARK_CLICK_THRESHOLD_PX", CLICK_THRESHOLD_PX)?,
            double_click_ms: parse_var(&lookup, "SITEMARK_DOUBLE_CLICK_MS", DOUBLE_CLICK_MS)?,
            duplicate_offset: parse_var(&lookup, "SITEMARK_DUPLICATE_OFFSET", DUPLICATE_OFFSET)?,
            history_limit,
            user_id: lookup("SITEMARK_USER_ID")?
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
        };
        tracing::debug!(?config, "editor config loaded");
        Ok(config)
    }
}

/// A set but non-UTF-8 variable is a parse error, not an unset one.
fn var_value(key: &'static str, value: Result<String, VarError>) -> Result<Option<String>, ConfigError> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(ConfigError::Parse { key, value: raw.to_string_lossy().into_owned() }),
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Result<Option<String>, ConfigError>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key)? {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Parse { key, value: raw }),
    }
}
