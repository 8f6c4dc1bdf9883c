//! Command definitions.

use crate::{LogFormat, SettingsOverrides, parse_parameter};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fanout_core::EndpointMode;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Fire concurrent generation requests at an LLM inference server.
#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(version)]
#[command(about = "Concurrent generation client for LLM inference servers")]
pub struct Cli {
    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch a batch of prompts and report every result
    Run(RunArgs),
    /// Check that the server is ready to serve requests
    Health(ConnectionArgs),
}

/// Where and how to reach the server.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Settings file (defaults to ./fanout.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server address, e.g. http://localhost:3000
    #[arg(long)]
    pub address: Option<String>,

    /// Transport: http or grpc
    #[arg(long)]
    pub transport: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Arguments for `fanout run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Use the single-shot endpoint instead of streaming
    #[arg(long)]
    pub generate: bool,

    /// Model family supplying generation defaults
    #[arg(long)]
    pub model: Option<String>,

    /// Adapter to apply to every request
    #[arg(long)]
    pub adapter: Option<String>,

    /// Generation parameter override, repeatable (e.g. --set top_p=0.21)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_parameter)]
    pub parameters: Vec<(String, Value)>,

    /// Prompt to send, repeatable
    #[arg(long = "prompt", value_name = "TEXT")]
    pub prompts: Vec<String>,

    /// File with one prompt per line, or a JSON array of strings
    #[arg(long = "prompts", value_name = "FILE", conflicts_with = "prompts")]
    pub prompt_file: Option<PathBuf>,

    /// Send at most this many prompts
    #[arg(long)]
    pub limit: Option<usize>,

    /// Maximum requests in flight
    #[arg(long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Result output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,
}

/// Result output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Divider-separated prompt and generation blocks
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

impl ConnectionArgs {
    /// Settings overrides carried by these flags.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_file: self.config.clone(),
            address: self.address.clone(),
            transport: self.transport.clone(),
            timeout_secs: self.timeout,
            ..SettingsOverrides::default()
        }
    }
}

impl RunArgs {
    /// Settings overrides carried by these flags.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            model: self.model.clone(),
            adapter_name: self.adapter.clone(),
            concurrency: self.concurrency.map(NonZeroUsize::get),
            mode: self.generate.then_some(EndpointMode::Generate),
            parameters: self.parameters.clone(),
            ..self.connection.overrides()
        }
    }
}
