// ABOUTME: Line-framed modem connection over any tokio byte stream such as a serial bridge socket
// ABOUTME: Buffers reads to split responses into lines and to spot the unterminated "> " prompt

use crate::modem::ModemLink;
use bytes::{Buf, BytesMut};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::trace;

/// AT command connection to a modem
///
/// Wraps a byte stream and exposes it as a [`ModemLink`]. Responses from a
/// modem are CR/LF terminated lines, usually surrounded by blank lines, with
/// one exception: the AT+CMGS continuation prompt `"> "` is sent without a
/// terminator. The read buffer is kept between calls, so bytes that arrive
/// after a complete line stay available for the next read.
///
/// ```rust,no_run
/// use gsm_sms::connection::Connection;
/// use gsm_sms::modem::ModemLink;
/// use std::time::Duration;
/// use tokio::net::TcpStream;
///
/// # async fn example() -> std::io::Result<()> {
/// let socket = TcpStream::connect("127.0.0.1:7000").await?;
/// let mut connection = Connection::new(socket).with_read_timeout(Duration::from_secs(30));
/// connection.write(b"AT\r").await?;
/// let reply = connection.read_line().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection<S> {
    // Writes are buffered and flushed once per `write` call.
    stream: BufWriter<S>,

    // Bytes read but not yet returned as a line or prompt.
    buffer: BytesMut,

    read_timeout: Option<Duration>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Create a new `Connection` backed by `stream`, without a read timeout
    pub fn new(stream: S) -> Connection<S> {
        Connection {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(1024),
            read_timeout: None,
        }
    }

    /// Fail any single read that waits longer than `timeout` with
    /// `io::ErrorKind::TimedOut`
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    /// Return the underlying stream. Buffered but unread input is dropped.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    /// Drop blank lines and stray line terminators at the head of the buffer
    fn skip_line_ends(&mut self) {
        let blank = self
            .buffer
            .iter()
            .take_while(|&&b| b == b'\r' || b == b'\n')
            .count();
        self.buffer.advance(blank);
    }

    /// Take one complete line off the buffer, or `None` if no line
    /// terminator has arrived yet
    fn parse_line(&mut self) -> Option<String> {
        self.skip_line_ends();
        let end = self.buffer.iter().position(|&b| b == b'\n' || b == b'\r')?;
        let line = self.buffer.split_to(end);
        self.skip_line_ends();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Read more bytes from the stream into the buffer
    async fn fill_buffer(&mut self) -> io::Result<()> {
        let read = self.stream.read_buf(&mut self.buffer);
        let count = match self.read_timeout {
            Some(timeout) => tokio::time::timeout(timeout, read).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no response from modem within {timeout:?}"),
                )
            })??,
            None => read.await?,
        };

        if count == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "modem closed the connection",
            ));
        }
        Ok(())
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> ModemLink for Connection<S> {
    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        trace!("> {:?}", String::from_utf8_lossy(data));
        self.stream.write_all(data).await?;
        self.stream.flush().await
    }

    async fn read_line(&mut self) -> io::Result<String> {
        loop {
            if let Some(line) = self.parse_line() {
                trace!("< {:?}", line);
                return Ok(line);
            }
            self.fill_buffer().await?;
        }
    }

    async fn read_prompt(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            self.skip_line_ends();
            if self.buffer.starts_with(prompt.as_bytes()) {
                self.buffer.advance(prompt.len());
                trace!("< {:?}", prompt);
                return Ok(prompt.to_string());
            }
            // A complete line that is not the prompt goes back to the caller
            if let Some(line) = self.parse_line() {
                trace!("< {:?}", line);
                return Ok(line);
            }
            self.fill_buffer().await?;
        }
    }
}
