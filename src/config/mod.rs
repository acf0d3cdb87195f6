#[cfg(feature = "cli")]
pub mod cli;
pub mod local;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use local::LocalTree;
pub use toml_config::CoverageConfig;
