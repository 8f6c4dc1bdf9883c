//! Decoding of chunked `generate_stream` bodies.
//!
//! The body is a sequence of newline-delimited records. Records may be framed
//! as server-sent events (`data: <payload>`), in which case `[DONE]` ends the
//! stream and comment/`event:`/`id:`/`retry:` lines are skipped. A body is
//! treated as framed once it is declared `text/event-stream` or its first
//! `data:` line arrives. Until then lines are payloads as they stand.

use super::classify;
use fanout_core::Chunk;
use fanout_error::{ClientError, ClientErrorKind, ClientResult};
use fanout_interface::ChunkStream;
use futures_util::{Stream, StreamExt};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Data(String),
    Done,
}

#[derive(Debug, Default)]
struct LineDecoder {
    buffer: Vec<u8>,
    framed: bool,
}

impl LineDecoder {
    fn new(framed: bool) -> Self {
        Self {
            buffer: Vec::new(),
            framed,
        }
    }

    /// Feed raw bytes, returning every frame completed by them.
    fn push(&mut self, bytes: &[u8]) -> ClientResult<Vec<Frame>> {
        self.buffer.extend_from_slice(bytes);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(frame) = self.parse_line(&line[..pos])? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Flush a trailing record that was not newline-terminated.
    fn finish(&mut self) -> ClientResult<Option<Frame>> {
        let rest = std::mem::take(&mut self.buffer);
        self.parse_line(&rest)
    }

    fn parse_line(&mut self, line: &[u8]) -> ClientResult<Option<Frame>> {
        let line = std::str::from_utf8(line).map_err(|e| {
            ClientError::new(ClientErrorKind::ResponseDecode(format!(
                "stream record is not valid UTF-8: {e}"
            )))
        })?;
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            return Ok(None);
        }
        if let Some(data) = line.strip_prefix("data:") {
            self.framed = true;
            let data = data.trim_start();
            return Ok(match data {
                "" => None,
                "[DONE]" => Some(Frame::Done),
                payload => Some(Frame::Data(payload.to_string())),
            });
        }
        if self.framed && is_event_field(line) {
            return Ok(None);
        }
        Ok(Some(Frame::Data(line.to_string())))
    }
}

fn is_event_field(line: &str) -> bool {
    line.starts_with(':')
        || ["event:", "id:", "retry:"]
            .iter()
            .any(|field| line.starts_with(field))
}

/// Turn a response body into a stream of chunks.
///
/// `framed` marks a body already known to carry server-sent events.
pub(crate) fn chunk_stream<S, B>(body: S, framed: bool) -> ChunkStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut decoder = LineDecoder::new(framed);
        let mut index = 0;
        let mut done = false;

        while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(classify)?;
            for frame in decoder.push(bytes.as_ref())? {
                match frame {
                    Frame::Data(payload) => {
                        trace!(index, "Received chunk");
                        yield Chunk::from_payload(index, payload);
                        index += 1;
                    }
                    Frame::Done => {
                        done = true;
                        break;
                    }
                }
            }
            if done {
                break;
            }
        }

        if !done {
            if let Some(Frame::Data(payload)) = decoder.finish()? {
                yield Chunk::from_payload(index, payload);
            }
        }
    })
}
