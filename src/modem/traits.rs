// ABOUTME: The line-oriented modem link abstraction consumed by the send transaction
// ABOUTME: Uses native async functions in traits so links can be scripted in tests

use std::io;

/// Half-duplex, line-oriented channel to a modem
///
/// Implementations own framing and timeouts: a read that does not complete
/// in time must surface as an `io::Error` (typically `TimedOut`). Only one
/// command/response exchange may be in flight at a time; callers serialize
/// access by holding `&mut` for the whole transaction.
pub trait ModemLink {
    /// Write raw bytes to the modem
    async fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read the next response line, without its line terminator
    async fn read_line(&mut self) -> io::Result<String>;

    /// Read until `prompt` is seen or a complete line arrives.
    ///
    /// The AT+CMGS continuation prompt is not followed by a line terminator,
    /// so this returns `prompt` as soon as it is buffered. Anything else is
    /// returned as a regular line for the caller to reject.
    async fn read_prompt(&mut self, prompt: &str) -> io::Result<String>;
}
