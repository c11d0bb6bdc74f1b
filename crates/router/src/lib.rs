//! Model orchestration: content analysis, capability-based routing,
//! response arbitration and the chat pipeline.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod content;
pub mod recorder;
pub mod scorer;
pub mod selector;
pub mod strategies;

pub use catalog::{CapabilityTag, ModelCatalog, ModelProfile};
pub use chat::{ChatEngine, ChatTurn, ConversationHistory, InMemoryHistory};
pub use config::{RoutingConfig, RoutingStrategy};
pub use content::{ContentAnalyzer, ContentSignals};
pub use recorder::{InMemoryRecorder, OrchestrationRecord, OrchestrationRecorder};
pub use scorer::ResponseScorer;
pub use selector::{ModelSelector, OrchestrationContext, OrchestrationResult};
pub use strategies::{LoadBalanceMode, SequentialTicks, TickSource, WallClockTicks};
