use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, Write};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// One JSON log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLogEntry {
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub level: String,
    /// Module path of the event
    pub target: String,
    pub message: String,
    /// Remaining event fields (model, strategy, confidence, ...)
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ExecutionContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

/// Process-level context attached to JSON entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub app_version: String,
    pub hostname: String,
    pub pid: u32,
    pub thread_id: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            thread_id: format!("{:?}", std::thread::current().id()),
        }
    }
}

/// Timing data pulled out of well-known event fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub duration_ms: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// Layer writing one [`StructuredLogEntry`] per event to stderr
pub struct JsonFormatter {
    include_context: bool,
}

impl<S> Layer<S> for JsonFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let level = match *event.metadata().level() {
            Level::ERROR => "ERROR",
            Level::WARN => "WARN",
            Level::INFO => "INFO",
            Level::DEBUG => "DEBUG",
            Level::TRACE => "TRACE",
        };

        let performance = visitor.extract_performance_metrics();

        let entry = StructuredLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level.to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            context: self.include_context.then(ExecutionContext::default),
            performance,
        };

        if let Ok(json) = serde_json::to_string(&entry) {
            let _ = writeln!(io::stderr(), "{}", json);
        }
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: HashMap<String, Value>,
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields.insert(field.name().to_string(), Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), Value::Bool(value));
    }
}

impl JsonVisitor {
    fn extract_performance_metrics(&self) -> Option<PerformanceMetrics> {
        let duration_ms = self.fields.get("duration_ms").and_then(|v| v.as_u64());
        let total_tokens = self.fields.get("total_tokens").and_then(|v| v.as_u64());

        if duration_ms.is_none() && total_tokens.is_none() {
            return None;
        }

        Some(PerformanceMetrics {
            duration_ms,
            total_tokens,
        })
    }
}

/// Logging settings, loadable from the `[logging]` config table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub json_output: bool,
    /// ANSI colors for the human formatter
    pub color_output: bool,
    pub include_context: bool,
    pub include_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
            color_output: true,
            include_context: true,
            include_line_numbers: cfg!(debug_assertions),
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for results.
pub fn init_structured_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json_output {
        let json_layer = JsonFormatter {
            include_context: config.include_context,
        };

        let subscriber = Registry::default().with(env_filter).with(json_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_line_number(config.include_line_numbers)
            .with_ansi(config.color_output)
            .with_span_events(FmtSpan::CLOSE);

        let subscriber = Registry::default().with(env_filter).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Measures an operation and logs its duration when finished
pub struct OperationTimer {
    start: std::time::Instant,
    operation_name: String,
    fields: HashMap<String, Value>,
}

impl OperationTimer {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation_name: operation_name.into(),
            fields: HashMap::new(),
        }
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn finish_with_result<T, E: std::fmt::Display>(self, result: &Result<T, E>) -> f64 {
        let elapsed = self.start.elapsed();
        let duration_ms = elapsed.as_millis() as u64;

        match result {
            Ok(_) => {
                tracing::info!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    success = true,
                    fields = ?self.fields,
                    "Operation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    success = false,
                    error = %e,
                    fields = ?self.fields,
                    "Operation failed"
                );
            }
        }

        elapsed.as_secs_f64()
    }
}
