/// Runtime configuration (defaults, TOML, environment).
pub mod config;

pub use config::ResearcherConfig;
