//! Loader tests against real plugin libraries
//!
//! These build `swindom-fixture-plugin` in several broken variants and check
//! that the loader reports each one, and that a working library is created
//! once, initialized once and destroyed once.

mod common;

use std::ffi::OsString;
use std::path::Path;

use common::{Fixture, fixture_library, read_calls};
use swindom_host::{HostArguments, LoadError, PluginLoader};
use swindom_plugin_api::{API_VERSION, EventTypeNotifier, WindowEventType};
use tempfile::TempDir;

fn host_arguments(library: &Path, settings_dir: &Path) -> HostArguments {
    let args: Vec<OsString> = vec![
        "swindom-run-plugin".into(),
        library.into(),
        settings_dir.into(),
        "en-US".into(),
        "fixture-channel".into(),
        std::process::id().to_string().into(),
    ];
    HostArguments::parse_from(args).unwrap()
}

#[test]
fn working_library_is_created_and_initialized_once() {
    let library = fixture_library(Fixture::Working);
    let settings = TempDir::new().unwrap();
    let args = host_arguments(&library, settings.path());

    let mut binding = PluginLoader::load(&args, EventTypeNotifier::noop()).unwrap();
    assert_eq!(
        binding.window_event_type(),
        Some(WindowEventType::FOREGROUND)
    );
    binding.show_window();
    binding.destroy();
    binding.destroy();
    drop(binding);

    assert_eq!(
        read_calls(settings.path()),
        vec![
            "initialize en-US instances=1",
            "subscribe",
            "show_window",
            "destruction",
        ]
    );
}

#[test]
fn version_mismatch_is_rejected() {
    let library = fixture_library(Fixture::VersionMismatch);
    let settings = TempDir::new().unwrap();

    let err = PluginLoader::open(&library, settings.path()).err().unwrap();

    match err {
        LoadError::ApiVersionMismatch { expected, found } => {
            assert_eq!(expected, API_VERSION);
            assert_eq!(found, API_VERSION + 1);
        }
        other => panic!("expected ApiVersionMismatch, got {other:?}"),
    }
}

#[test]
fn missing_factory_is_reported_by_name() {
    let library = fixture_library(Fixture::MissingEntryPoint);
    let settings = TempDir::new().unwrap();

    let err = PluginLoader::open(&library, settings.path()).err().unwrap();

    match err {
        LoadError::MissingEntryPoint { symbol, .. } => {
            assert_eq!(symbol, "_swindom_plugin_create");
        }
        other => panic!("expected MissingEntryPoint, got {other:?}"),
    }
}

#[test]
fn null_instance_is_rejected() {
    let library = fixture_library(Fixture::NullInstance);
    let settings = TempDir::new().unwrap();

    let err = PluginLoader::open(&library, settings.path()).err().unwrap();

    assert!(matches!(err, LoadError::NullInstance), "got {err:?}");
}

#[test]
fn failed_initialize_is_a_load_error_without_destruction() {
    let library = fixture_library(Fixture::InitFails);
    let settings = TempDir::new().unwrap();
    let args = host_arguments(&library, settings.path());

    let err = PluginLoader::load(&args, EventTypeNotifier::noop())
        .err()
        .unwrap();

    assert!(matches!(err, LoadError::InitFailed(_)), "got {err:?}");
    assert_eq!(
        read_calls(settings.path()),
        vec!["initialize en-US instances=1"]
    );
}
