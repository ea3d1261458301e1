//! Tracing subscriber setup.
//!
//! A preset picks the base level per `scoopdeck::*` target; `--log` flags
//! override single targets and `RUST_LOG`, when set, replaces both.

use clap::ValueEnum;
use std::collections::BTreeMap;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Prefix shared by every log target in the workspace.
const TARGET_PREFIX: &str = "scoopdeck::";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Base verbosity selected by the CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Command lifecycle, favorites and startup.
    #[default]
    Production,
    /// Adds process spawns, table updates and HTTP requests.
    Verbose,
    Debug,
    /// Includes raw output chunks and parse misses.
    Trace,
    /// Warnings and errors only.
    Quiet,
}

impl LogPreset {
    /// Highest-priority flag wins: quiet, then trace, debug, verbose.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => LogPreset::Quiet,
            (_, true, ..) => LogPreset::Trace,
            (_, _, true, _) => LogPreset::Debug,
            (_, _, _, true) => LogPreset::Verbose,
            _ => LogPreset::Production,
        }
    }

    fn directives(self) -> &'static [&'static str] {
        match self {
            LogPreset::Production => &[
                "scoopdeck::startup=info",
                "scoopdeck::api=info",
                "scoopdeck::ws=info",
                "scoopdeck::correlator=info",
                "scoopdeck::favorites=info",
                "scoopdeck::process=warn",
                "scoopdeck::parser=warn",
                "scoopdeck::table=warn",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &["scoopdeck=info", "scoopdeck::parser=warn", "tower_http=info"],
            LogPreset::Debug => &["scoopdeck=debug", "tower_http=debug"],
            LogPreset::Trace => &["scoopdeck=trace", "tower_http=trace"],
            LogPreset::Quiet => &["scoopdeck=warn", "tower_http=error"],
        }
    }
}

/// Logging configuration built from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Full target name -> level, e.g. `scoopdeck::parser` -> trace.
    pub overrides: BTreeMap<String, LevelFilter>,
    pub format: LogFormat,
}

impl LogConfig {
    /// `log_overrides` entries are `target=level`, optionally comma-separated.
    /// Short targets get the `scoopdeck::` prefix; malformed entries are skipped.
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let overrides = log_overrides
            .iter()
            .flat_map(|entry| entry.split(','))
            .filter_map(|part| {
                let (target, level) = part.split_once('=')?;
                let level = level.trim().parse::<LevelFilter>().ok()?;
                Some((qualify_target(target.trim()), level))
            })
            .collect();

        Self {
            preset: LogPreset::from_flags(verbose, debug, trace, quiet),
            overrides,
            format,
        }
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }

        let directives = self
            .preset
            .directives()
            .iter()
            .map(|d| d.to_string())
            .chain(
                self.overrides
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level)),
            )
            .collect::<Vec<_>>()
            .join(",");

        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn qualify_target(target: &str) -> String {
    if target.starts_with(TARGET_PREFIX) || target == "tower_http" {
        target.to_string()
    } else {
        format!("{}{}", TARGET_PREFIX, target)
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) {
    let registry = tracing_subscriber::registry().with(config.build_filter());

    match config.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}
