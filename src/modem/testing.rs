// ABOUTME: Scripted in-memory modem link used by unit and integration tests
// ABOUTME: Replays canned response lines and records every write in order

use crate::modem::traits::ModemLink;
use std::collections::VecDeque;
use std::io;

/// A `ModemLink` that answers from a fixed script
///
/// Both `read_line` and `read_prompt` consume the next scripted response.
/// Once the script is exhausted reads fail with `UnexpectedEof`, like a
/// modem that closed the line.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    responses: VecDeque<String>,
    writes: Vec<Vec<u8>>,
}

impl ScriptedLink {
    pub fn new<'a>(responses: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            responses: responses.into_iter().map(str::to_string).collect(),
            writes: Vec::new(),
        }
    }

    /// Every write observed so far, in order
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    fn next_response(&mut self) -> io::Result<String> {
        self.responses
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

impl ModemLink for ScriptedLink {
    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.writes.push(data.to_vec());
        Ok(())
    }

    async fn read_line(&mut self) -> io::Result<String> {
        self.next_response()
    }

    async fn read_prompt(&mut self, _prompt: &str) -> io::Result<String> {
        self.next_response()
    }
}
