//! Top-level error type for the plugin host

use thiserror::Error;

use crate::args::ArgumentError;
use crate::plugin::LoadError;

/// Startup failures. Any of these ends the host with a non-zero exit code.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Argument error: {0}")]
    Arguments(#[from] ArgumentError),

    #[error("Plugin load error: {0}")]
    Load(#[from] LoadError),
}
