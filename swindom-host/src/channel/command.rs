//! Command vocabulary of the parent's channel

use std::fmt;

/// A recognized command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the plugin's window
    ShowWindow,
    /// Terminate the host immediately with exit code 0
    ExitProcess,
}

impl Command {
    /// Parse one line. Surrounding whitespace is ignored; matching is exact
    /// and case-sensitive. Unknown lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "ShowWindow" => Some(Self::ShowWindow),
            "ExitProcess" => Some(Self::ExitProcess),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShowWindow => "ShowWindow",
            Self::ExitProcess => "ExitProcess",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
