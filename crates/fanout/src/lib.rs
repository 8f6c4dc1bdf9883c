//! Concurrent generation client for LLM inference servers.
//!
//! `fanout` sends a batch of prompts to one inference server at once and
//! reports every result as it arrives.
//!
//! ```no_run
//! use fanout::{DispatchOptions, Dispatcher, HumanReporter};
//! use fanout_client::{DEFAULT_TIMEOUT, create_client};
//! use fanout_core::GenerationConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("http://localhost:3000", "http", DEFAULT_TIMEOUT)?;
//! let config = Arc::new(GenerationConfig::for_model("llama")?.with_override("top_p", 0.21)?);
//! let prompts = vec!["What is the meaning of life?".to_string()];
//!
//! let dispatcher = Dispatcher::new(&client, DispatchOptions::default());
//! let mut reporter = HumanReporter::new(std::io::stdout());
//! let report = dispatcher.dispatch(&prompts, config, &mut reporter).await;
//! println!("{} of {} succeeded", report.succeeded(), report.total());
//! # Ok(())
//! # }
//! ```

mod batch;
pub mod cli;
mod dispatch;
mod logging;
mod prompts;
mod report;
mod settings;

pub use batch::BatchReport;
pub use dispatch::{
    DispatchOptions, DispatchOptionsBuilder, DispatchOptionsBuilderError, Dispatcher,
};
pub use logging::{LogFormat, init_tracing};
pub use prompts::{PromptSource, benchmark_prompts, load_prompts, parse_prompt_lines};
pub use report::{HumanReporter, JsonLinesReporter, ResultSink, result_json, summary_json};
pub use settings::{
    DEFAULT_ADDRESS, DEFAULT_SETTINGS_FILE, Settings, SettingsOverrides, parse_parameter,
};
