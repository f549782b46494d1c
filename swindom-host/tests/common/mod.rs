//! Shared helpers for tests that need a real plugin library
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

/// Name of the call log the fixture plugin writes into its settings dir
pub const CALL_LOG: &str = "calls.log";

/// Which build of `swindom-fixture-plugin` to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    Working,
    VersionMismatch,
    MissingEntryPoint,
    NullInstance,
    InitFails,
}

impl Fixture {
    fn feature(self) -> Option<&'static str> {
        match self {
            Self::Working => None,
            Self::VersionMismatch => Some("version-mismatch"),
            Self::MissingEntryPoint => Some("missing-entry-point"),
            Self::NullInstance => Some("null-instance"),
            Self::InitFails => Some("init-fails"),
        }
    }
}

static BUILD_LOCK: Mutex<()> = Mutex::new(());

/// Build the fixture plugin for `fixture` and return the library path.
///
/// Each variant gets its own target directory so builds never overwrite a
/// library another test has loaded.
pub fn fixture_library(fixture: Fixture) -> PathBuf {
    let _guard = BUILD_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let feature = fixture.feature();
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR"))
        .join("fixture-plugin")
        .join(feature.unwrap_or("working"));
    let workspace_manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("../Cargo.toml");

    let mut cargo = Command::new(env!("CARGO"));
    cargo
        .args(["build", "--quiet", "--offline", "-p", "swindom-fixture-plugin"])
        .arg("--manifest-path")
        .arg(&workspace_manifest)
        .env("CARGO_TARGET_DIR", &target_dir);
    if let Some(feature) = feature {
        cargo.args(["--features", feature]);
    }
    let status = cargo.status().expect("failed to run cargo");
    assert!(status.success(), "building fixture plugin {fixture:?} failed");

    let library = target_dir.join("debug").join(format!(
        "{}swindom_fixture_plugin{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    ));
    assert!(library.is_file(), "missing {}", library.display());
    library
}

/// Lines the fixture plugin logged so far
pub fn read_calls(settings_dir: &Path) -> Vec<String> {
    std::fs::read_to_string(settings_dir.join(CALL_LOG))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
