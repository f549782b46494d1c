//! Remote-control channel from the parent application
//!
//! Wire format: newline-terminated UTF-8 tokens, server to host only, no
//! acknowledgement. Recognized tokens are `ShowWindow` and `ExitProcess`;
//! anything else is ignored, including undecodable and overlong lines.

mod command;
mod listener;

pub use command::Command;
#[cfg(unix)]
pub use listener::socket_path;
pub use listener::{ChannelError, ChannelOutcome, CommandCodec, CommandListener, run_session};
