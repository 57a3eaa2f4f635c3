//! Unified logging module for VoltageEMS services
//!
//! Console output plus an optional daily rolling log file, both using the
//! bracketed `timestamp [LEVEL] message` layout (or JSON when requested).

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Custom event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2025-12-02T00:50:44.809Z [INFO] Slave context reset`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Keeps the non-blocking file writer alive for the life of the process
static GUARDS: OnceLock<Arc<Mutex<Vec<WorkerGuard>>>> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used as the log file name and the default debug target
    pub service_name: String,
    /// Directory for the daily rolling log file; `None` logs to console only
    pub log_dir: Option<PathBuf>,
    /// Default level when `RUST_LOG` is not set
    pub level: Level,
    /// Enable JSON format for structured logging
    pub enable_json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "voltage_datastore".to_string(),
            log_dir: None,
            level: Level::INFO,
            enable_json: false,
        }
    }
}

impl LogConfig {
    /// Filter used when `RUST_LOG` is absent: `{level},{service}=debug`
    fn default_filter(&self) -> String {
        format!(
            "{},{}=debug",
            self.level.as_str().to_lowercase(),
            self.service_name.replace('-', "_")
        )
    }
}

fn text_or_json<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_ansi(ansi)
            .event_format(BracketedLevelFormat)
            .with_writer(writer)
            .boxed()
    }
}

/// Initialize logging system with configuration
///
/// Respects `RUST_LOG` when set. Installing a subscriber when one is already
/// active (a second call, or a test harness subscriber) is not an error.
pub fn init_with_config(config: LogConfig) -> anyhow::Result<()> {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(env_str) if !env_str.is_empty() => EnvFilter::try_new(env_str)?,
        _ => EnvFilter::try_new(config.default_filter())?,
    };

    let mut layers: Vec<BoxedLayer> = vec![text_or_json(
        std::io::stdout,
        config.enable_json,
        true,
    )];

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;
        let appender =
            tracing_appender::rolling::daily(log_dir, format!("{}.log", config.service_name));
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let guards = GUARDS.get_or_init(|| Arc::new(Mutex::new(Vec::new())));
        match guards.lock() {
            Ok(mut guards) => guards.push(guard),
            Err(poisoned) => poisoned.into_inner().push(guard),
        }

        layers.push(text_or_json(non_blocking, config.enable_json, false));
    }

    if let Err(e) = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
    {
        tracing::debug!("Logging already initialized: {}", e);
    }

    Ok(())
}

/// Console-only init at the given level ("debug", "info", ...)
pub fn init(level: &str) -> anyhow::Result<()> {
    let config = LogConfig {
        level: level.parse().unwrap_or(Level::INFO),
        ..Default::default()
    };
    init_with_config(config)
}
