//! Event-stream framing for the generation endpoint.
//!
//! Frames are raw `data: <payload>\n\n` units with no `event:` field. Every
//! stream is closed by [`DONE_FRAME`], including after an in-band error.

/// Terminal frame; nothing may follow it on a stream.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Wrap a payload as one event-stream frame.
pub fn frame(payload: &str) -> String {
    format!("data: {}\n\n", payload)
}
