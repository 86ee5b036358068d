pub mod config;
pub mod config_file;
pub mod discovery;
pub mod generator;
pub mod presets;
pub mod sanitize;
pub mod service;
pub mod shutdown;
pub mod tracker;

// Re-export commonly used types
pub use config::Config;
pub use generator::{ChatGenerator, DocsGenerator};
pub use service::DocumentationService;
pub use tracker::ProgressTracker;
