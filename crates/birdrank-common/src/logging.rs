//! Tracing setup shared by the birdrank binaries
//!
//! Console output always goes to stderr: stdout is reserved for the report, and the
//! progress markers interleave with log lines on the terminal. A daily rolling file can
//! be added next to (or instead of) the console.
//!
//! ```no_run
//! use birdrank_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::for_app("birdrank")
//!         .with_level(LogLevel::Debug)
//!         .merge_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!(region = "RS", "Starting run");
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type DynLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Looks `raw` up in a table of accepted spellings, ignoring case
fn parse_choice<T: Copy>(kind: &str, raw: &str, choices: &[(&str, T)]) -> Result<T> {
    let wanted = raw.trim().to_ascii_lowercase();
    choices
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, value)| *value)
        .ok_or_else(|| anyhow!("Unknown log {} '{}'", kind, raw))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice(
            "level",
            s,
            &[
                ("trace", Self::Trace),
                ("debug", Self::Debug),
                ("info", Self::Info),
                ("warn", Self::Warn),
                ("warning", Self::Warn),
                ("error", Self::Error),
            ],
        )
    }
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        matches!(self, Self::Console | Self::Both)
    }

    fn file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

impl FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice(
            "output",
            s,
            &[
                ("console", Self::Console),
                ("stderr", Self::Console),
                ("file", Self::File),
                ("both", Self::Both),
            ],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("format", s, &[("text", Self::Text), ("json", Self::Json)])
    }
}

/// Optional metadata attached to every event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFields {
    pub location: bool,
    pub thread_ids: bool,
    pub targets: bool,
}

impl Default for LogFields {
    fn default() -> Self {
        Self {
            location: false,
            thread_ids: false,
            targets: true,
        }
    }
}

/// Logging configuration
///
/// Built with [`LogConfig::for_app`] and the `with_*` methods, then usually overridden
/// from the environment with [`LogConfig::merge_env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub output: LogOutput,
    pub format: LogFormat,
    /// Directory of the rolling log files
    pub dir: PathBuf,
    /// File name prefix; the appender adds the date
    pub file_prefix: String,
    /// Extra `EnvFilter` directives, comma separated (e.g. `reqwest=warn,html5ever=error`)
    pub directives: Option<String>,
    pub fields: LogFields,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::for_app("birdrank")
    }
}

impl LogConfig {
    pub fn for_app(name: impl Into<String>) -> Self {
        Self {
            level: LogLevel::default(),
            output: LogOutput::default(),
            format: LogFormat::default(),
            dir: PathBuf::from("./logs"),
            file_prefix: name.into(),
            directives: None,
            fields: LogFields::default(),
        }
    }

    /// Defaults overridden by the `LOG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Applies whichever of these variables are set:
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `LOG_LEVEL` | trace, debug, info, warn, error |
    /// | `LOG_OUTPUT` | console, file, both |
    /// | `LOG_FORMAT` | text, json |
    /// | `LOG_DIR` | log file directory |
    /// | `LOG_FILE_PREFIX` | log file prefix |
    /// | `LOG_FILTER` | extra filter directives |
    /// | `LOG_INCLUDE_LOCATION`, `LOG_INCLUDE_THREAD_IDS`, `LOG_INCLUDE_TARGETS` | true/false |
    pub fn merge_env(self) -> Result<Self> {
        self.merge_from(|key| std::env::var(key).ok())
    }

    fn merge_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup("LOG_LEVEL") {
            self.level = raw.parse()?;
        }
        if let Some(raw) = lookup("LOG_OUTPUT") {
            self.output = raw.parse()?;
        }
        if let Some(raw) = lookup("LOG_FORMAT") {
            self.format = raw.parse()?;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("LOG_FILE_PREFIX") {
            self.file_prefix = prefix;
        }
        if let Some(directives) = lookup("LOG_FILTER") {
            self.directives = Some(directives);
        }

        let flag = |key: &str, current: bool| {
            lookup(key)
                .map(|raw| raw.trim().eq_ignore_ascii_case("true") || raw.trim() == "1")
                .unwrap_or(current)
        };
        self.fields = LogFields {
            location: flag("LOG_INCLUDE_LOCATION", self.fields.location),
            thread_ids: flag("LOG_INCLUDE_THREAD_IDS", self.fields.thread_ids),
            targets: flag("LOG_INCLUDE_TARGETS", self.fields.targets),
        };

        Ok(self)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    pub fn with_fields(mut self, fields: LogFields) -> Self {
        self.fields = fields;
        self
    }

    /// `RUST_LOG` first, then the configured level and directives on top
    fn env_filter(&self) -> Result<EnvFilter> {
        let base = EnvFilter::from_default_env().add_directive(LevelFilter::from(self.level).into());

        self.directives
            .iter()
            .flat_map(|all| all.split(','))
            .map(str::trim)
            .filter(|directive| !directive.is_empty())
            .try_fold(base, |filter, directive| -> Result<EnvFilter> {
                let parsed = directive
                    .parse()
                    .with_context(|| format!("Invalid log filter directive '{}'", directive))?;
                Ok(filter.add_directive(parsed))
            })
    }

    fn layer<W>(&self, writer: W, ansi: bool) -> DynLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let fields = self.fields;
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(fields.targets)
            .with_thread_ids(fields.thread_ids)
            .with_file(fields.location)
            .with_line_number(fields.location);

        if self.format == LogFormat::Json {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    }
}

/// Installs the global subscriber for `config`
///
/// Call once at startup. With file output the returned guard owns the background writer;
/// keep it alive until exit or buffered lines are lost.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = config.env_filter()?;
    let mut layers: Vec<DynLayer> = Vec::with_capacity(2);

    if config.output.console() {
        layers.push(config.layer(std::io::stderr, true));
    }

    let guard = if config.output.file() {
        std::fs::create_dir_all(&config.dir)
            .with_context(|| format!("Cannot create log directory {}", config.dir.display()))?;
        let appender = tracing_appender::rolling::daily(&config.dir, &config.file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(config.layer(writer, false));
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("A tracing subscriber is already installed")?;

    Ok(guard)
}
