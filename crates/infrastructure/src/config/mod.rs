pub mod loader;
pub mod settings;
pub mod validator;

pub use loader::{ConfigLoader, ConfigSource};
pub use settings::{EmotionSettings, ForgeConfig, ModelProfileConfig, RoutingDefaults};
pub use validator::ConfigValidator;
