//! Result sinks.
//!
//! The dispatcher hands every completion to a [`ResultSink`] as soon as it
//! resolves. Two writers ship with the crate: [`HumanReporter`] for terminal
//! output and [`JsonLinesReporter`] for machine consumption. Any
//! `FnMut(&GenerationResult)` closure is a sink as well.

use crate::BatchReport;
use fanout_core::{GenerationResult, GenerationStatus};
use serde_json::{Value, json};
use std::io::Write;
use std::time::Duration;
use tracing::warn;

const DIVIDER: &str = "----------";

/// Receives batch results as they complete.
pub trait ResultSink {
    /// Called once per request, in completion order.
    fn record(&mut self, result: &GenerationResult);

    /// Called once after the whole batch has resolved.
    fn finish(&mut self, _report: &BatchReport) {}
}

impl<F> ResultSink for F
where
    F: FnMut(&GenerationResult),
{
    fn record(&mut self, result: &GenerationResult) {
        self(result)
    }
}

/// Writes a divider/prompt/generation block per result and a summary line.
#[derive(Debug)]
pub struct HumanReporter<W> {
    writer: W,
}

impl<W: Write> HumanReporter<W> {
    /// Report to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_result(&mut self, result: &GenerationResult) -> std::io::Result<()> {
        writeln!(self.writer, "{DIVIDER}\n")?;
        writeln!(self.writer, " prompt: {}", result.prompt())?;
        match result.status() {
            GenerationStatus::Success(output) => {
                writeln!(self.writer, "Generation: {}", output.raw_response())?;
            }
            GenerationStatus::Failure(err) => {
                writeln!(self.writer, "Failed ({}): {}", err.kind().label(), err.kind())?;
            }
        }
        writeln!(self.writer, "\n{DIVIDER}")?;
        self.writer.flush()
    }

    fn write_summary(&mut self, report: &BatchReport) -> std::io::Result<()> {
        write!(
            self.writer,
            "{}/{} succeeded, {} failed in {:.2}s",
            report.succeeded(),
            report.total(),
            report.failed(),
            report.elapsed().as_secs_f64()
        )?;
        if let (Some(mean), Some(max)) = (report.mean_latency(), report.max_latency()) {
            write!(
                self.writer,
                " (mean latency {}ms, max {}ms)",
                mean.as_millis(),
                max.as_millis()
            )?;
        }
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

impl<W: Write> ResultSink for HumanReporter<W> {
    fn record(&mut self, result: &GenerationResult) {
        if let Err(e) = self.write_result(result) {
            warn!(index = result.index(), error = %e, "Failed to write result");
        }
    }

    fn finish(&mut self, report: &BatchReport) {
        if let Err(e) = self.write_summary(report) {
            warn!(error = %e, "Failed to write summary");
        }
    }
}

/// Writes one JSON object per result, one per line.
#[derive(Debug)]
pub struct JsonLinesReporter<W> {
    writer: W,
}

impl<W: Write> JsonLinesReporter<W> {
    /// Report to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, value: &Value) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

/// JSON form of one result.
pub fn result_json(result: &GenerationResult) -> Value {
    let mut line = json!({
        "index": result.index(),
        "prompt": result.prompt(),
        "mode": result.mode(),
        "elapsed_ms": millis(*result.elapsed()),
    });

    match result.status() {
        GenerationStatus::Success(output) => {
            line["status"] = json!("success");
            line["text"] = json!(output.text());
            line["raw_response"] = json!(output.raw_response());
            if !output.chunks().is_empty() {
                line["chunks"] = json!(output.chunks());
            }
        }
        GenerationStatus::Failure(err) => {
            line["status"] = json!("failure");
            line["error"] = json!({
                "kind": err.kind().label(),
                "message": err.kind().to_string(),
            });
        }
    }
    line
}

/// JSON form of the batch summary.
pub fn summary_json(report: &BatchReport) -> Value {
    json!({
        "summary": {
            "total": report.total(),
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "success_ratio": report.success_ratio(),
            "elapsed_ms": millis(*report.elapsed()),
            "mean_latency_ms": report.mean_latency().map(millis),
            "max_latency_ms": report.max_latency().map(millis),
        }
    })
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl<W: Write> ResultSink for JsonLinesReporter<W> {
    fn record(&mut self, result: &GenerationResult) {
        if let Err(e) = self.write_line(&result_json(result)) {
            warn!(index = result.index(), error = %e, "Failed to write result");
        }
    }

    fn finish(&mut self, report: &BatchReport) {
        if let Err(e) = self.write_line(&summary_json(report)) {
            warn!(error = %e, "Failed to write summary");
        }
    }
}
