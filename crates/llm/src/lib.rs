//! Backend invocation layer: message types, the `LlmBackend` capability,
//! HTTP providers and the prefix-routing provider registry.

pub mod factory;
pub mod providers;
pub mod registry;
pub mod testing;

pub use factory::{LlmProviderFactory, ProviderSettings, ProvidersConfig};
pub use providers::{
    AnthropicProvider, BackendResponse, ChatMessage, GenerationParams, GoogleProvider,
    HttpTimeouts, LlmBackend, MessageRole, OpenAICompatibleProvider, TokenUsage,
};
pub use registry::{ProviderRegistry, DEFAULT_PROVIDER};
