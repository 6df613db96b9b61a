#![cfg(feature = "std")]

use log::{self, LevelFilter, Metadata, Record};
use std::env;
use std::sync::OnceLock;

/// Targets outside this crate never log above this level unless named.
const FOREIGN_CAP: LevelFilter = LevelFilter::Warn;

/// Per-target levels parsed from `TACTICS_LOG`, e.g.
/// `info,tactics::server=debug,tactics::core::combat=trace`.
///
/// A bare level sets the default for this crate. `target=level` entries
/// override it for that module path and everything below it; the longest
/// matching path wins.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSpec {
    default: LevelFilter,
    targets: Vec<(String, LevelFilter)>,
}

impl Default for LogSpec {
    fn default() -> Self {
        LogSpec {
            default: LevelFilter::Info,
            targets: Vec::new(),
        }
    }
}

impl LogSpec {
    /// Unknown levels and empty entries are skipped.
    pub fn parse(spec: &str) -> Self {
        let mut out = LogSpec::default();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((target, level)) => {
                    if let Ok(level) = level.trim().parse() {
                        out.targets.push((target.trim().to_string(), level));
                    }
                }
                None => {
                    if let Ok(level) = entry.parse() {
                        out.default = level;
                    }
                }
            }
        }
        out
    }

    /// Level allowed for records from `target`.
    pub fn level_for(&self, target: &str) -> LevelFilter {
        let named = self
            .targets
            .iter()
            .filter(|(path, _)| covers(path, target))
            .max_by_key(|(path, _)| path.len())
            .map(|(_, level)| *level);
        match named {
            Some(level) => level,
            None if covers(env!("CARGO_CRATE_NAME"), target) => self.default,
            None => self.default.min(FOREIGN_CAP),
        }
    }

    /// Most verbose level any target may use.
    pub fn max_level(&self) -> LevelFilter {
        self.targets
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

/// `path` is `target` itself or one of its parent modules.
fn covers(path: &str, target: &str) -> bool {
    target
        .strip_prefix(path)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

struct TacticsLogger;

static SPEC: OnceLock<LogSpec> = OnceLock::new();

impl log::Log for TacticsLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let spec = SPEC.get_or_init(LogSpec::default);
        metadata.level() <= spec.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // stderr keeps stdout free for the sim's JSON.
            eprintln!("{} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: TacticsLogger = TacticsLogger;

/// Initialize logging from the `TACTICS_LOG` environment variable (see
/// [`LogSpec`]). Defaults to `info` if the variable is not set.
pub fn init_logging() {
    let spec = env::var("TACTICS_LOG")
        .map(|s| LogSpec::parse(&s))
        .unwrap_or_default();
    let max = spec.max_level();
    if SPEC.set(spec).is_err() {
        return;
    }
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(max));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_module_path_wins() {
        let spec = LogSpec::parse("warn, tactics::server=debug,tactics::server::lobby=trace");
        assert_eq!(spec.level_for("tactics::core::game"), LevelFilter::Warn);
        assert_eq!(spec.level_for("tactics::server"), LevelFilter::Debug);
        assert_eq!(spec.level_for("tactics::server::match_actor"), LevelFilter::Debug);
        assert_eq!(spec.level_for("tactics::server::lobby"), LevelFilter::Trace);
        assert_eq!(spec.max_level(), LevelFilter::Trace);
    }

    #[test]
    fn path_match_respects_module_boundaries() {
        let spec = LogSpec::parse("error,tactics::core=debug");
        assert_eq!(spec.level_for("tactics::corext"), LevelFilter::Error);
    }

    #[test]
    fn other_crates_are_capped_unless_named() {
        let spec = LogSpec::parse("trace,mio=debug");
        assert_eq!(spec.level_for("tactics::client"), LevelFilter::Trace);
        assert_eq!(spec.level_for("tokio::net"), LevelFilter::Warn);
        assert_eq!(spec.level_for("mio::poll"), LevelFilter::Debug);
    }

    #[test]
    fn bad_entries_are_skipped() {
        let spec = LogSpec::parse("loud,,tactics::ui=nope,debug");
        assert_eq!(spec, LogSpec::parse("debug"));
        assert_eq!(LogSpec::parse(""), LogSpec::default());
    }
}
