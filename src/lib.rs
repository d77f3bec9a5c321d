pub mod api;
pub mod config;
pub mod food;
pub mod providers;

// Re-export commonly used items
pub use config::AppConfig;
pub use providers::cohere::cohere::CohereProvider;
pub use providers::traits::CompletionProvider;
