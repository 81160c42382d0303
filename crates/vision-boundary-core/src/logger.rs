//! Stderr logging for programs embedding the boundary.
//!
//! Records are routed by the crate that emitted them: the simulated camera
//! SDK, the simulated calibration SDK, the boundary crates themselves, the
//! safe facade, or anything else in the process. Each source has its own
//! level, parsed from a spec such as `"info,camera=debug,external=off"`,
//! and lines are printed as `[elapsed LEVEL source] message`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Where a record comes from, decided by the crate in its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Camera,
    Calibration,
    Boundary,
    Facade,
    External,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Camera,
        Source::Calibration,
        Source::Boundary,
        Source::Facade,
        Source::External,
    ];

    pub fn of(target: &str) -> Self {
        match target.split("::").next().unwrap_or_default() {
            "vision_boundary_camera" => Source::Camera,
            "vision_boundary_calib" => Source::Calibration,
            "vision_boundary_core" | "vision_boundary_ffi" => Source::Boundary,
            "vision_boundary" => Source::Facade,
            _ => Source::External,
        }
    }

    /// Short name used in level specs and in the printed line.
    pub fn tag(self) -> &'static str {
        match self {
            Source::Camera => "camera",
            Source::Calibration => "calib",
            Source::Boundary => "boundary",
            Source::Facade => "facade",
            Source::External => "external",
        }
    }

    /// Crates whose records belong to this source. Empty for `External`.
    pub fn crates(self) -> &'static [&'static str] {
        match self {
            Source::Camera => &["vision_boundary_camera"],
            Source::Calibration => &["vision_boundary_calib"],
            Source::Boundary => &["vision_boundary_core", "vision_boundary_ffi"],
            Source::Facade => &["vision_boundary"],
            Source::External => &[],
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Source::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

/// One level per [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevels {
    levels: [LevelFilter; 5],
}

impl LogLevels {
    /// `level` everywhere, except that other crates stay at `Warn` or
    /// quieter.
    pub fn uniform(level: LevelFilter) -> Self {
        let mut levels = [level; 5];
        levels[Source::External as usize] = level.min(LevelFilter::Warn);
        Self { levels }
    }

    /// Parse `"<level>[,<source>=<level>]..."`. The leading bare level
    /// applies through [`LogLevels::uniform`]; unknown sources are ignored
    /// and unknown level names mean `Info`.
    pub fn parse(spec: &str) -> Self {
        let mut levels = Self::uniform(LevelFilter::Info);
        let mut overrides = Vec::new();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((tag, level)) => overrides.push((tag.trim(), level)),
                None => levels = Self::uniform(level_from_name(part)),
            }
        }
        for (tag, level) in overrides {
            if let Some(source) = Source::from_tag(tag) {
                levels = levels.with(source, level_from_name(level));
            }
        }
        levels
    }

    pub fn with(mut self, source: Source, level: LevelFilter) -> Self {
        self.levels[source as usize] = level;
        self
    }

    pub fn level(&self, source: Source) -> LevelFilter {
        self.levels[source as usize]
    }

    /// The most verbose level any source allows.
    pub fn max(&self) -> LevelFilter {
        self.levels.into_iter().max().unwrap_or(LevelFilter::Off)
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level(Source::of(metadata.target()))
    }
}

struct BoundaryLogger {
    levels: LogLevels,
    started: Instant,
}

impl Log for BoundaryLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.levels.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            Source::of(record.target()).tag(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<BoundaryLogger> = OnceLock::new();

/// Install the logger with per-source levels.
///
/// Only the first successful call takes effect.
pub fn init_with_levels(levels: LogLevels) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| BoundaryLogger {
            levels,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(levels.max());
    }
    Ok(())
}

/// Parse a level name as found in config files (`"off"`, `"warn"`, ...).
///
/// Unknown names fall back to `Info`.
pub fn level_from_name(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(LevelFilter::Info)
}

/// `EnvFilter` directives equivalent to `levels`.
#[cfg(feature = "tracing")]
fn directives(levels: &LogLevels) -> String {
    let mut directives = vec![levels.level(Source::External).to_string()];
    for source in Source::ALL {
        for name in source.crates() {
            directives.push(format!("{name}={}", levels.level(source)));
        }
    }
    directives.join(",").to_lowercase()
}

/// Install a `tracing` subscriber for the facade's spans. `RUST_LOG` wins
/// over `levels` when set.
#[cfg(feature = "tracing")]
pub fn init_tracing(levels: LogLevels, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(&levels)));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    fn metadata(target: &str, level: Level) -> Metadata<'_> {
        Metadata::builder().target(target).level(level).build()
    }

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(level_from_name("TRACE"), LevelFilter::Trace);
        assert_eq!(level_from_name(" warn "), LevelFilter::Warn);
        assert_eq!(level_from_name("off"), LevelFilter::Off);
        assert_eq!(level_from_name("chatty"), LevelFilter::Info);
    }

    #[test]
    fn targets_map_to_their_crate() {
        assert_eq!(Source::of("vision_boundary_camera::fake::stream"), Source::Camera);
        assert_eq!(Source::of("vision_boundary_calib"), Source::Calibration);
        assert_eq!(Source::of("vision_boundary_ffi"), Source::Boundary);
        assert_eq!(Source::of("vision_boundary::camera::stream"), Source::Facade);
        assert_eq!(Source::of("vision_boundary_extra"), Source::External);
        assert_eq!(Source::of("hyper::proto"), Source::External);
    }

    #[test]
    fn bare_level_keeps_other_crates_quiet() {
        let levels = LogLevels::parse("trace");
        assert_eq!(levels.level(Source::Camera), LevelFilter::Trace);
        assert_eq!(levels.level(Source::External), LevelFilter::Warn);
        assert_eq!(levels.max(), LevelFilter::Trace);
        assert_eq!(LogLevels::parse("warn"), LogLevels::uniform(LevelFilter::Warn));
    }

    #[test]
    fn overrides_apply_after_the_default() {
        let levels = LogLevels::parse("camera=debug, warn ,external=off,gpu=trace");
        assert_eq!(levels.level(Source::Camera), LevelFilter::Debug);
        assert_eq!(levels.level(Source::Calibration), LevelFilter::Warn);
        assert_eq!(levels.level(Source::External), LevelFilter::Off);
        assert_eq!(levels.max(), LevelFilter::Debug);
        assert_eq!(LogLevels::parse(""), LogLevels::uniform(LevelFilter::Info));
    }

    #[test]
    fn records_are_filtered_by_source() {
        let levels = LogLevels::parse("info,calib=off");
        assert!(levels.enabled(&metadata("vision_boundary_camera::fake", Level::Info)));
        assert!(!levels.enabled(&metadata("vision_boundary_camera::fake", Level::Debug)));
        assert!(!levels.enabled(&metadata("vision_boundary_calib::fake", Level::Error)));
        assert!(!levels.enabled(&metadata("tempfile", Level::Info)));
        assert!(levels.enabled(&metadata("tempfile", Level::Warn)));
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_directives_name_every_crate() {
        let levels = LogLevels::parse("info,camera=trace");
        let directives = directives(&levels);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("vision_boundary_camera=trace"));
        assert!(directives.contains("vision_boundary_ffi=info"));
        assert!(directives.contains("vision_boundary=info"));
    }
}
