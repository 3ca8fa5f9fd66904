use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Versioned entity store sidecar and its control plane.
#[derive(Parser, Debug)]
#[command(name = "eventstored")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the configured stores next to an application.
    Sidecar(SidecarArgs),
    /// Hold the configuration catalog and push changes to sidecars.
    ControlPlane(ControlPlaneArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Configurations come from a local file.
    Standalone,
    /// Configurations come from the operator.
    Kubernetes,
}

#[derive(Args, Debug)]
pub struct SidecarArgs {
    #[arg(long, env = "EVENTSTORED_MODE", value_enum, default_value_t = Mode::Standalone)]
    pub mode: Mode,

    #[arg(long, env = "EVENTSTORED_PORT", default_value_t = 5000)]
    pub port: u16,

    /// YAML or JSON configuration file, standalone mode only.
    #[arg(long, env = "EVENTSTORED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma separated store names served by this sidecar, kubernetes mode only.
    #[arg(long, env = "EVENTSTORED_EVENTSTORES")]
    pub eventstores: Option<String>,

    /// Base URL of the operator, kubernetes mode only.
    #[arg(long, env = "EVENTSTORED_OPERATOR_ENDPOINT")]
    pub operator_endpoint: Option<String>,
}

#[derive(Args, Debug)]
pub struct ControlPlaneArgs {
    #[arg(long, env = "EVENTSTORED_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Initial catalog, a YAML or JSON file.
    #[arg(long, env = "EVENTSTORED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma separated sidecar base URLs.
    #[arg(long, env = "EVENTSTORED_SIDECARS", default_value = "")]
    pub sidecars: String,

    #[arg(long, env = "EVENTSTORED_MAX_CONCURRENT_PUSHES", default_value_t = 8)]
    pub max_concurrent_pushes: usize,

    #[arg(long, env = "EVENTSTORED_PUSH_TIMEOUT_MS", default_value_t = 5000)]
    pub push_timeout_ms: u64,
}
