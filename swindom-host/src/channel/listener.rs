//! Command channel listener
//!
//! Connects once, as a client, to the channel the parent serves and reads
//! newline-delimited commands until the stream ends or `ExitProcess` arrives.

use std::future::Future;
use std::io;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, FramedRead};

use super::command::Command;

const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Failed to connect to channel '{name}': {source}")]
    Connect { name: String, source: io::Error },

    #[error("Channel read failed: {0}")]
    Read(#[from] io::Error),
}

/// How a session ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The parent closed the stream
    Closed,
    /// `ExitProcess` arrived; the caller terminates the process
    ExitRequested,
}

/// Splits the stream on `\n` and never faults on line content.
///
/// Lines are decoded lossily. A line longer than `max_line_length` is
/// dropped and reading resumes after its newline.
#[derive(Debug)]
pub struct CommandCodec {
    inner: AnyDelimiterCodec,
}

impl CommandCodec {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                Vec::new(),
                max_line_length,
            ),
        }
    }

    fn next_line(
        &mut self,
        buf: &mut BytesMut,
        mut decode: impl FnMut(
            &mut AnyDelimiterCodec,
            &mut BytesMut,
        ) -> Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> Result<Option<String>, io::Error> {
        loop {
            match decode(&mut self.inner, buf) {
                Ok(line) => {
                    return Ok(line.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()));
                }
                // The inner codec is now discarding up to the next newline
                Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                    tracing::trace!("Skipping overlong command line");
                }
                Err(AnyDelimiterCodecError::Io(e)) => return Err(e),
            }
        }
    }
}

impl Decoder for CommandCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        self.next_line(buf, |inner, buf| inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        self.next_line(buf, |inner, buf| inner.decode_eof(buf))
    }
}

/// One client connection to a named channel
#[derive(Debug, Clone)]
pub struct CommandListener {
    name: String,
    connect_timeout: Option<Duration>,
    max_line_length: usize,
}

impl CommandListener {
    /// `connect_timeout` of `None` waits for the parent's channel indefinitely
    pub fn new(
        name: impl Into<String>,
        connect_timeout: Option<Duration>,
        max_line_length: usize,
    ) -> Self {
        Self {
            name: name.into(),
            connect_timeout,
            max_line_length,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect and run the session. `on_show` is called once per `ShowWindow`.
    pub async fn run(self, on_show: impl FnMut()) -> Result<ChannelOutcome, ChannelError> {
        let stream = connect(&self.name, self.connect_timeout)
            .await
            .map_err(|source| ChannelError::Connect {
                name: self.name.clone(),
                source,
            })?;
        tracing::debug!(channel = %self.name, "Command channel connected");

        run_session(stream, self.max_line_length, on_show).await
    }
}

/// Read commands from an already-connected stream
pub async fn run_session<R>(
    stream: R,
    max_line_length: usize,
    mut on_show: impl FnMut(),
) -> Result<ChannelOutcome, ChannelError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(stream, CommandCodec::new(max_line_length));

    while let Some(line) = lines.next().await {
        let line = line?;
        match Command::parse(&line) {
            Some(Command::ShowWindow) => on_show(),
            Some(Command::ExitProcess) => return Ok(ChannelOutcome::ExitRequested),
            None => tracing::trace!(line = %line, "Ignoring unknown command"),
        }
    }

    Ok(ChannelOutcome::Closed)
}

/// Server not up yet, or all pipe instances busy
fn is_not_ready(e: &io::Error) -> bool {
    is_pipe_busy(e)
        || matches!(
            e.kind(),
            io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused
        )
}

#[cfg(windows)]
fn is_pipe_busy(e: &io::Error) -> bool {
    e.raw_os_error() == Some(windows_sys::Win32::Foundation::ERROR_PIPE_BUSY as i32)
}

#[cfg(not(windows))]
fn is_pipe_busy(_e: &io::Error) -> bool {
    false
}

/// Retry `attempt` while the server is not ready, until `timeout` elapses.
/// Without a timeout, retry until the server shows up.
async fn retry_connect<T, F, Fut>(timeout: Option<Duration>, mut attempt: F) -> io::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    let deadline = timeout.map(|timeout| Instant::now() + timeout);
    loop {
        match attempt().await {
            Err(e) if is_not_ready(&e) && deadline.is_none_or(|d| Instant::now() < d) => {
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            result => return result,
        }
    }
}

#[cfg(windows)]
async fn connect(
    name: &str,
    timeout: Option<Duration>,
) -> io::Result<tokio::net::windows::named_pipe::NamedPipeClient> {
    use tokio::net::windows::named_pipe::ClientOptions;

    let pipe_name = format!(r"\\.\pipe\{name}");
    retry_connect(timeout, || {
        let result = ClientOptions::new().write(false).open(&pipe_name);
        async move { result }
    })
    .await
}

#[cfg(unix)]
async fn connect(
    name: &str,
    timeout: Option<Duration>,
) -> io::Result<tokio::net::unix::OwnedReadHalf> {
    let path = socket_path(name);
    let stream = retry_connect(timeout, || tokio::net::UnixStream::connect(&path)).await?;
    // Inbound only: dropping the write half shuts it down
    let (reader, _writer) = stream.into_split();
    Ok(reader)
}

/// Absolute names are used as-is, others live in the temp directory
#[cfg(unix)]
pub fn socket_path(name: &str) -> std::path::PathBuf {
    let path = std::path::Path::new(name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::temp_dir().join(name)
    }
}
