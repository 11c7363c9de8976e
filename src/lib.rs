pub mod cli;
pub mod config;
pub mod llm;
pub mod render;
pub mod report;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use report::Report;
pub use session::launch;
