pub mod errors;
pub mod structured_logging;

pub use errors::{
    ConfigError, ConfigResult, OrchestrationError, ParseError, ParseResult, ProviderError,
    ProviderErrorKind, ProviderResult, SelectionError, SelectionResult,
};

pub use structured_logging::{
    init_structured_logging, ExecutionContext, LoggingConfig, OperationTimer,
    PerformanceMetrics, StructuredLogEntry,
};

/// Correlation id for one orchestration request
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
