//! Positional command-line arguments handed over by the parent application

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

/// Errors from reading the argument vector
#[derive(Error, Debug)]
pub enum ArgumentError {
    /// Missing, extra-malformed or unparsable tokens
    #[error("Invalid command line: {0}")]
    Parse(#[from] clap::Error),

    #[error("Plugin file not found: {path}")]
    PluginNotFound { path: PathBuf },

    #[error("Settings directory not found: {path}")]
    SettingsDirNotFound { path: PathBuf },
}

#[derive(Parser, Debug)]
#[command(
    name = "swindom-run-plugin",
    about = "Host one swindom plugin on behalf of a parent process",
    version
)]
struct RawArguments {
    /// Path of the plugin dynamic library
    plugin_path: PathBuf,
    /// Directory the plugin keeps its settings in
    settings_dir: PathBuf,
    /// UI language tag
    language: String,
    /// Name of the command channel served by the parent
    channel_name: String,
    /// Process id of the parent application
    parent_pid: u32,
    /// Ignored trailing tokens
    #[arg(hide = true)]
    _rest: Vec<String>,
}

/// The validated startup values. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostArguments {
    plugin_path: PathBuf,
    settings_dir: PathBuf,
    language: String,
    channel_name: String,
    parent_pid: u32,
}

impl HostArguments {
    /// Parse and validate an argument vector whose first token is the program name.
    ///
    /// The plugin path must be an existing file and the settings directory an
    /// existing directory.
    pub fn parse_from<I, T>(args: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let raw = RawArguments::try_parse_from(args)?;
        Self::validate(raw)
    }

    /// Parse the current process's arguments
    pub fn from_env() -> Result<Self, ArgumentError> {
        Self::parse_from(std::env::args_os())
    }

    fn validate(raw: RawArguments) -> Result<Self, ArgumentError> {
        if !raw.plugin_path.is_file() {
            return Err(ArgumentError::PluginNotFound {
                path: raw.plugin_path,
            });
        }
        if !raw.settings_dir.is_dir() {
            return Err(ArgumentError::SettingsDirNotFound {
                path: raw.settings_dir,
            });
        }

        Ok(Self {
            plugin_path: raw.plugin_path,
            settings_dir: raw.settings_dir,
            language: raw.language,
            channel_name: raw.channel_name,
            parent_pid: raw.parent_pid,
        })
    }

    pub fn plugin_path(&self) -> &Path {
        &self.plugin_path
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn parent_pid(&self) -> u32 {
        self.parent_pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        plugin: PathBuf,
        settings: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let plugin = dir.path().join("plugin.so");
        std::fs::write(&plugin, b"not really a library").unwrap();
        let settings = dir.path().join("settings");
        std::fs::create_dir(&settings).unwrap();
        Fixture {
            dir,
            plugin,
            settings,
        }
    }

    fn argv(f: &Fixture) -> Vec<OsString> {
        vec![
            "swindom-run-plugin".into(),
            f.plugin.clone().into(),
            f.settings.clone().into(),
            "en-US".into(),
            "swindom-plugin-pipe".into(),
            "4242".into(),
        ]
    }

    #[test]
    fn test_parse_valid_arguments() {
        let f = fixture();
        let args = HostArguments::parse_from(argv(&f)).unwrap();

        assert_eq!(args.plugin_path(), f.plugin);
        assert_eq!(args.settings_dir(), f.settings);
        assert_eq!(args.language(), "en-US");
        assert_eq!(args.channel_name(), "swindom-plugin-pipe");
        assert_eq!(args.parent_pid(), 4242);
    }

    #[test]
    fn test_fewer_than_six_tokens_fails() {
        let f = fixture();
        for len in 0..6 {
            let mut tokens = argv(&f);
            tokens.truncate(len);
            let result = HostArguments::parse_from(tokens);
            assert!(
                matches!(result, Err(ArgumentError::Parse(_))),
                "{len} tokens should be rejected"
            );
        }
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        let f = fixture();
        let mut tokens = argv(&f);
        tokens.push("extra".into());
        assert!(HostArguments::parse_from(tokens).is_ok());
    }

    #[test]
    fn test_missing_plugin_file_fails() {
        let f = fixture();
        let mut tokens = argv(&f);
        tokens[1] = f.dir.path().join("missing.so").into();

        let result = HostArguments::parse_from(tokens);
        assert!(matches!(result, Err(ArgumentError::PluginNotFound { .. })));
    }

    #[test]
    fn test_plugin_path_that_is_a_directory_fails() {
        let f = fixture();
        let mut tokens = argv(&f);
        tokens[1] = f.settings.clone().into();

        let result = HostArguments::parse_from(tokens);
        assert!(matches!(result, Err(ArgumentError::PluginNotFound { .. })));
    }

    #[test]
    fn test_missing_settings_dir_fails() {
        let f = fixture();
        let mut tokens = argv(&f);
        tokens[2] = f.dir.path().join("nowhere").into();

        let result = HostArguments::parse_from(tokens);
        assert!(matches!(
            result,
            Err(ArgumentError::SettingsDirNotFound { .. })
        ));
    }

    #[test]
    fn test_non_numeric_pid_fails() {
        let f = fixture();
        let mut tokens = argv(&f);
        tokens[5] = "parent".into();

        let result = HostArguments::parse_from(tokens);
        assert!(matches!(result, Err(ArgumentError::Parse(_))));
    }
}
