//! Concurrent request dispatch.
//!
//! A [`Dispatcher`] turns an ordered prompt list into one batch of requests
//! multiplexed on the calling task. Requests are issued in prompt order and
//! reported in completion order. A failed request is recorded and never
//! cancels its siblings; [`Dispatcher::dispatch`] returns only once every
//! request has resolved.

use crate::report::millis;
use crate::{BatchReport, ResultSink};
use derive_builder::Builder;
use derive_getters::Getters;
use fanout_core::{
    EndpointMode, GenerationConfig, GenerationOutput, GenerationRequest, GenerationResult,
    GenerationStatus,
};
use fanout_error::ClientResult;
use fanout_interface::GenerationClient;
use futures_util::stream::{FuturesUnordered, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Per-batch dispatch options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Builder)]
#[builder(setter(into), default)]
pub struct DispatchOptions {
    /// Endpoint every request targets
    mode: EndpointMode,
    /// Adapter sent with every request
    #[builder(setter(into, strip_option))]
    adapter_name: Option<String>,
    /// Maximum requests in flight; unbounded when `None`
    #[builder(setter(into, strip_option))]
    concurrency: Option<usize>,
}

impl DispatchOptions {
    /// Options for a batch against `mode`.
    pub fn new(mode: EndpointMode, adapter_name: Option<String>, concurrency: Option<usize>) -> Self {
        Self {
            mode,
            adapter_name,
            concurrency,
        }
    }

    /// Creates a new builder for DispatchOptions.
    pub fn builder() -> DispatchOptionsBuilder {
        DispatchOptionsBuilder::default()
    }
}

/// Fans a prompt list out over one shared client.
#[derive(Debug)]
pub struct Dispatcher<'a, C: ?Sized> {
    client: &'a C,
    options: DispatchOptions,
}

impl<'a, C> Dispatcher<'a, C>
where
    C: GenerationClient + ?Sized,
{
    /// Borrow `client` for the lifetime of the dispatcher.
    pub fn new(client: &'a C, options: DispatchOptions) -> Self {
        Self { client, options }
    }

    /// Options in effect.
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Send one request per prompt and wait for all of them.
    ///
    /// Each completion reaches `sink` as soon as it resolves. The report
    /// holds exactly one result per prompt.
    #[instrument(
        skip_all,
        fields(
            prompts = prompts.len(),
            mode = %self.options.mode,
            transport = %self.client.transport(),
            concurrency = ?self.options.concurrency,
        )
    )]
    pub async fn dispatch<S>(
        &self,
        prompts: &[String],
        config: Arc<GenerationConfig>,
        sink: &mut S,
    ) -> BatchReport
    where
        S: ResultSink + ?Sized,
    {
        let started = Instant::now();
        let total = prompts.len();
        let limit = self.options.concurrency.unwrap_or(total).max(1);

        let mut pending = prompts.iter().enumerate().map(|(index, prompt)| {
            let request = GenerationRequest::new(
                prompt.as_str(),
                Arc::clone(&config),
                self.options.adapter_name.clone(),
            );
            (index, request)
        });

        let mut in_flight = FuturesUnordered::new();
        for (index, request) in pending.by_ref().take(limit) {
            in_flight.push(self.execute(index, request));
        }
        info!(in_flight = in_flight.len(), "Batch issued");

        let mut results = Vec::with_capacity(total);
        while let Some(result) = in_flight.next().await {
            sink.record(&result);
            results.push(result);
            if let Some((index, request)) = pending.next() {
                in_flight.push(self.execute(index, request));
            }
        }

        let report = BatchReport::new(results, started.elapsed());
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = millis(*report.elapsed()),
            "Batch complete"
        );
        report
    }

    async fn execute(&self, index: usize, request: GenerationRequest) -> GenerationResult {
        let started = Instant::now();
        let mode = self.options.mode;
        debug!(index, "Issuing request");

        let outcome = match mode {
            EndpointMode::Generate => self
                .client
                .generate(&request)
                .await
                .map(GenerationOutput::single),
            EndpointMode::GenerateStream => self.collect_stream(&request).await,
        };

        let status = match outcome {
            Ok(output) => {
                debug!(index, bytes = output.raw_response().len(), "Request succeeded");
                GenerationStatus::Success(output)
            }
            Err(err) => {
                warn!(index, kind = err.kind().label(), error = %err.kind(), "Request failed");
                GenerationStatus::Failure(err)
            }
        };

        GenerationResult::new(
            index,
            request.prompt().as_str(),
            mode,
            status,
            started.elapsed(),
        )
    }

    async fn collect_stream(&self, request: &GenerationRequest) -> ClientResult<GenerationOutput> {
        let chunks = self
            .client
            .generate_stream(request)
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(GenerationOutput::streamed(chunks))
    }
}
