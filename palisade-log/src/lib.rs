//! Palisade Logging
//!
//! Structured, environment-controlled logging for the Palisade validation
//! engine. Every rule evaluation can be traced down to the field and rule
//! token that produced it, which makes misbehaving rule sets easy to diagnose
//! without attaching a debugger.
//!
//! # Usage
//!
//! ```rust
//! use palisade_log::{debug, info, trace, warn};
//!
//! info!("Loaded {} scenarios", 2);
//! debug!(target: "palisade::engine", "Checking scenario '{}'", "add");
//!
//! // Key-value fields are rendered after the message (or as a JSON object)
//! let field = "age";
//! trace!(fields: [("field", field), ("rule", ">:15")], "Rule failed");
//! warn!("Unknown validator '{}'", "nope");
//! ```
//!
//! # Environment Variables
//!
//! - `PALISADE_DEBUG=1` - Enable debug logging
//! - `PALISADE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PALISADE_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `PALISADE_LOG_COLOR=1|0` - Enable/disable colors
//! - `PALISADE_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Log target used by the evaluation engine.
pub const TARGET_ENGINE: &str = "palisade::engine";
/// Log target used by the validator registry.
pub const TARGET_REGISTRY: &str = "palisade::registry";
/// Log target used by the rule-file loader.
pub const TARGET_CONFIG: &str = "palisade::config";

// ============================================================================
// Log Levels
// ============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Per-rule evaluation detail
    Trace = 0,
    /// Scenario loads, registrations, check results
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// No logging
    Off = 5,
}

impl Level {
    /// Parse a level name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => "TRACE".magenta(),
            Level::Debug => "DEBUG".blue(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
            Level::Off => "OFF".white(),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human readable, one event per line with aligned level
    Pretty,
    /// Short single-line format
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Validation engines are libraries; stay quiet unless asked.
static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Warn,
            format: Format::Pretty,
            color: false,
            timestamps: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// Build the configuration from `PALISADE_*` environment variables and
    /// publish level and debug flag to the global atomics.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("PALISADE_DEBUG").unwrap_or(false);

        let level = env::var("PALISADE_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env::var("PALISADE_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(defaults.format);

        let color = env_flag("PALISADE_LOG_COLOR")
            .unwrap_or_else(|| env::var("NO_COLOR").is_err() && env::var("TERM").is_ok());

        let timestamps = env_flag("PALISADE_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps);

        DEBUG_ENABLED.store(debug, Ordering::SeqCst);
        LOG_LEVEL.store(level as u8, Ordering::SeqCst);

        Self {
            debug,
            level,
            format,
            color,
            timestamps,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Eagerly read the environment configuration.
///
/// Called implicitly by the first emitted event; call it explicitly at
/// startup so `PALISADE_LOG_LEVEL` applies to the very first check.
pub fn init() {
    Lazy::force(&CONFIG);
}

#[inline]
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    if level == Level::Off {
        return false;
    }
    level as u8 >= LOG_LEVEL.load(Ordering::Relaxed) || (level == Level::Debug && is_debug_enabled())
}

pub fn current_level() -> Level {
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the level at runtime.
pub fn set_level(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode at runtime. Enabling it lowers the level to `Debug`.
pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_with_fields(level, target, message, &[]);
}

#[doc(hidden)]
pub fn log_with_fields(level: Level, target: &str, message: &str, fields: &[(&str, String)]) {
    let config = config();
    if !is_level_enabled(level) {
        return;
    }

    match config.format {
        Format::Pretty => write_pretty(level, target, message, fields, config),
        Format::Compact => write_compact(level, target, message, fields, config),
        Format::Json => write_json(level, target, message, fields),
    }
}

fn write_fields(out: &mut impl Write, fields: &[(&str, String)]) {
    for (key, value) in fields {
        let _ = write!(out, " {}={:?}", key, value);
    }
}

fn write_pretty(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, String)],
    config: &LogConfig,
) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(stderr, "{} ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    if config.color {
        let _ = write!(stderr, "{:5} ", level.colored());
    } else {
        let _ = write!(stderr, "{:5} ", level.as_str());
    }
    #[cfg(not(feature = "color"))]
    let _ = write!(stderr, "{:5} ", level.as_str());

    if !target.is_empty() {
        let _ = write!(stderr, "[{}] ", target);
    }

    let _ = write!(stderr, "{}", message);
    write_fields(&mut stderr, fields);
    let _ = writeln!(stderr);
}

fn write_compact(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, String)],
    config: &LogConfig,
) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let _ = write!(stderr, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }

    let initial = level.as_str().chars().next().unwrap_or('?');
    let _ = write!(stderr, "{} {}: {}", initial, target, message);
    write_fields(&mut stderr, fields);
    let _ = writeln!(stderr);
}

#[cfg(feature = "json")]
fn write_json(level: Level, target: &str, message: &str, fields: &[(&str, String)]) {
    let mut entry = serde_json::Map::new();
    entry.insert(
        "timestamp".into(),
        chrono::Utc::now().to_rfc3339().into(),
    );
    entry.insert("level".into(), level.as_str().into());
    entry.insert("target".into(), target.into());
    entry.insert("message".into(), message.into());
    if !fields.is_empty() {
        let map = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(v.as_str())))
            .collect();
        entry.insert("fields".into(), serde_json::Value::Object(map));
    }

    if let Ok(json) = serde_json::to_string(&entry) {
        eprintln!("{}", json);
    }
}

#[cfg(not(feature = "json"))]
fn write_json(level: Level, target: &str, message: &str, fields: &[(&str, String)]) {
    let mut line = format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}""#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    );
    if !fields.is_empty() {
        let pairs: Vec<String> = fields
            .iter()
            .map(|(k, v)| format!(r#""{}":"{}""#, escape_json(k), escape_json(v)))
            .collect();
        line.push_str(&format!(r#","fields":{{{}}}"#, pairs.join(",")));
    }
    line.push('}');
    eprintln!("{}", line);
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __emit {
    ($level:expr, target: $target:expr, fields: [$(($k:expr, $v:expr)),* $(,)?], $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log_with_fields(
                $level,
                $target,
                &format!($($arg)+),
                &[$(($k, ($v).to_string())),*],
            );
        }
    };
    ($level:expr, fields: [$(($k:expr, $v:expr)),* $(,)?], $($arg:tt)+) => {
        $crate::__emit!($level, target: module_path!(), fields: [$(($k, $v)),*], $($arg)+)
    };
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a trace event. Used for per-rule evaluation detail.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__emit!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug event.
///
/// Enabled by `PALISADE_DEBUG=1` or `PALISADE_LOG_LEVEL=debug`.
///
/// ```rust
/// use palisade_log::debug;
///
/// let scenario = "edit";
/// debug!(target: "palisade::engine", "Checking scenario '{}'", scenario);
/// debug!(fields: [("scenario", scenario)], "Scenario loaded");
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__emit!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__emit!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__emit!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__emit!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! Bridges the Palisade level configuration into a `tracing` subscriber.

    use super::*;

    /// Subscriber honoring `RUST_LOG` first, then `PALISADE_LOG_LEVEL`.
    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let config = config();
        let level = config.level.as_str().to_ascii_lowercase();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(config.color))
    }
}
