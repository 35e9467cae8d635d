//! Incremental decoding of streamed completion responses.
//!
//! The wire format is newline-delimited server-sent events: frames separated
//! by a blank line, each carrying `data: <json>` lines, terminated by a frame
//! whose data is the literal `[DONE]` sentinel. [`SseDecoder`] is a pure
//! state machine over raw byte chunks so that arbitrary fragmentation across
//! network reads can be tested without a socket; [`EventStream`] adapts it to
//! a pull-based [`futures::Stream`] over a live response body.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BoxError, Error};

/// Terminal marker; consumed by the decoder, never surfaced as an event.
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded unit of a streamed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub payload: Value,
}

/// Accumulates raw bytes and yields whole decoded frames.
///
/// A frame is only ever emitted complete: partial frames stay buffered until
/// the blank-line terminator arrives, however many chunks that takes.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sentinel has been seen or an unrecoverable frame was reported;
    /// no further events will be produced.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Append a chunk and drain every frame it completes, in wire order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<StreamEvent, Error>> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }
        self.buffer.extend_from_slice(chunk);

        while let Some((end, delim)) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + delim).collect();
            match self.decode_frame(&frame[..end]) {
                Ok(None) => {}
                Ok(Some(event)) => out.push(Ok(event)),
                Err(err) => {
                    // A malformed frame is unrecoverable in-stream.
                    self.done = true;
                    out.push(Err(err));
                    break;
                }
            }
            if self.done {
                break;
            }
        }
        out
    }

    /// Signal end-of-source. Leftover non-blank content without a preceding
    /// sentinel means the stream was cut mid-frame.
    pub fn finish(&mut self) -> Option<Error> {
        if self.done {
            return None;
        }
        self.done = true;
        let residue = String::from_utf8_lossy(&self.buffer);
        if residue.trim().is_empty() {
            None
        } else {
            Some(Error::truncated(format!(
                "stream ended mid-frame: {:?}",
                residue.trim()
            )))
        }
    }

    /// Decode one complete frame. Returns `Ok(None)` for frames with no data
    /// (comments, bare keep-alives) and after the sentinel.
    fn decode_frame(&mut self, frame: &[u8]) -> Result<Option<StreamEvent>, Error> {
        let text = std::str::from_utf8(frame)
            .map_err(|e| Error::decode("stream frame is not valid UTF-8", e))?;

        let data: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|rest| rest.trim())
            .collect();
        if data.is_empty() {
            return Ok(None);
        }
        let data = data.join("\n");

        if data == DONE_SENTINEL {
            self.done = true;
            return Ok(None);
        }

        let payload: Value = serde_json::from_str(&data)
            .map_err(|e| Error::decode(format!("invalid JSON in stream frame: {data:?}"), e))?;
        Ok(Some(StreamEvent { payload }))
    }
}

/// Locate the first blank-line terminator, tolerating `\r\n\r\n` as well as
/// bare `\n\n`. Returns the frame content length and the delimiter width.
fn find_frame_end(buffer: &[u8]) -> Option<(usize, usize)> {
    (0..buffer.len()).find_map(|i| {
        if buffer[i..].starts_with(b"\n\n") {
            Some((i, 2))
        } else if buffer[i..].starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else {
            None
        }
    })
}

/// Byte-chunk source feeding an [`EventStream`].
pub type ByteChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Lazy, forward-only sequence of [`StreamEvent`]s over a live response body.
///
/// Each pull drives the underlying byte source only as far as needed to
/// complete one frame; events are delivered in wire order. Dropping the
/// stream drops the response body, which closes the connection — abandoning
/// a stream early releases its transport resources.
pub struct EventStream {
    source: Option<ByteChunkStream>,
    decoder: SseDecoder,
    pending: VecDeque<Result<StreamEvent, Error>>,
    finished: bool,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("pending", &self.pending.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl EventStream {
    pub fn new<S>(source: S) -> Self
    where
        S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
    {
        Self {
            source: Some(Box::pin(source)),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }
}

impl Stream for EventStream {
    type Item = Result<StreamEvent, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(item) = this.pending.pop_front() {
                if item.is_err() {
                    // Errors are terminal; release the connection now.
                    this.finished = true;
                    this.source = None;
                }
                return Poll::Ready(Some(item));
            }
            if this.finished {
                return Poll::Ready(None);
            }
            if this.decoder.is_done() {
                this.finished = true;
                this.source = None;
                continue;
            }

            let source = match this.source.as_mut() {
                Some(source) => source,
                None => {
                    this.finished = true;
                    continue;
                }
            };
            match source.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.pending.extend(this.decoder.feed(&chunk));
                }
                Poll::Ready(Some(Err(source_err))) => {
                    this.finished = true;
                    this.source = None;
                    return Poll::Ready(Some(Err(Error::network(
                        "connection lost mid-stream",
                        source_err,
                    ))));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    this.source = None;
                    if let Some(err) = this.decoder.finish() {
                        return Poll::Ready(Some(Err(err)));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
