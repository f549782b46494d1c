//! swindom-host: per-plugin host process
//!
//! The parent application starts one host per plugin. The host:
//!
//! - loads the plugin library and initializes it ([`plugin`])
//! - hooks the window events the plugin asks for ([`hook`])
//! - relays `ShowWindow`/`ExitProcess` from the parent's channel ([`channel`])
//! - shuts down when the parent process exits ([`watchdog`])
//!
//! All plugin calls happen on the [`HostShell`] main loop.
//!
//! # Quick Start
//!
//! ```no_run
//! use swindom_host::{HostArguments, HostConfig, run_host};
//!
//! async fn example() -> Result<(), swindom_host::HostError> {
//!     let args = HostArguments::from_env()?;
//!     let (config, _) = HostConfig::load(args.settings_dir());
//!     let reason = run_host(args, config).await?;
//!     println!("stopped: {reason}");
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod channel;
pub mod config;
pub mod error;
pub mod hook;
pub mod plugin;
pub mod shell;
pub mod watchdog;

pub use args::{ArgumentError, HostArguments};
pub use config::{ConfigError, HostConfig};
pub use error::HostError;
pub use plugin::{LoadError, PluginBinding, PluginLoader};
pub use shell::{HostHandle, HostMessage, HostShell};
pub use watchdog::{ExitSignal, ParentExit, Watchdog};

use channel::CommandListener;

/// Run the host until the parent goes away.
///
/// Loads and initializes the plugin, hooks its window events, connects the
/// command channel and starts the parent watchdog. Returns why the host
/// stopped; the plugin has been destroyed by then.
pub async fn run_host(args: HostArguments, config: HostConfig) -> Result<ParentExit, HostError> {
    let mut shell = HostShell::new(hook::platform_event_source());

    let binding = PluginLoader::load(&args, shell.handle().event_type_notifier())?;
    shell.attach(binding);
    tracing::info!(
        plugin = %args.plugin_path().display(),
        language = args.language(),
        hook = ?shell.hook_state(),
        "Plugin ready"
    );

    let channel = shell.spawn_channel_listener(CommandListener::new(
        args.channel_name(),
        config.channel_connect_timeout,
        config.channel_max_line_length,
    ));
    let _watchdog = shell.start_watchdog(args.parent_pid(), config.watchdog_poll_interval);

    let reason = shell.run().await;
    shell.shutdown();
    channel.abort();

    Ok(reason)
}
