//! Run command handler.

use super::{OutputFormat, RunArgs};
use crate::{
    BatchReport, DispatchOptions, Dispatcher, HumanReporter, JsonLinesReporter, PromptSource,
    ResultSink, Settings,
};
use fanout_client::create_client;
use fanout_error::FanoutResult;
use std::sync::Arc;
use tracing::{info, instrument};

/// Handles the run command.
///
/// Configuration and prompt errors surface before any request is sent.
/// Results stream to stdout as they complete.
///
/// # Errors
///
/// Fails on invalid settings, an unusable prompt source, a client that cannot
/// be built, or a batch in which every request failed. Partial failures are
/// reported per result and do not fail the command.
#[instrument(skip_all, fields(output = ?args.output))]
pub async fn handle_run_command(args: RunArgs) -> FanoutResult<BatchReport> {
    let settings = Settings::load(&args.overrides())?;
    let config = Arc::new(settings.generation_config()?);
    let prompts = PromptSource::select(args.prompts.clone(), args.prompt_file.clone())
        .resolve(args.limit)?;
    info!(
        prompts = prompts.len(),
        model = %config.model(),
        mode = %settings.mode(),
        "Prepared batch"
    );

    let client = create_client(settings.address(), settings.transport(), settings.timeout())?;
    let options = DispatchOptions::new(
        *settings.mode(),
        settings.adapter_name().clone(),
        *settings.concurrency(),
    );
    let dispatcher = Dispatcher::new(&client, options);

    let mut sink: Box<dyn ResultSink> = match args.output {
        OutputFormat::Human => Box::new(HumanReporter::new(std::io::stdout())),
        OutputFormat::Json => Box::new(JsonLinesReporter::new(std::io::stdout())),
    };
    let report = dispatcher.dispatch(&prompts, config, sink.as_mut()).await;
    sink.finish(&report);
    client.close();

    Ok(report.into_result()?)
}
