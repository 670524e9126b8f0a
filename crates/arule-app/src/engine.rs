//! External prognostics engine invocation.
//!
//! The engine is a blocking command-line program:
//!
//! ```text
//! {executable} {system} {mode args...} {root}
//! ```
//!
//! It reads `{root}/ARULE/DEFS`, writes `{root}/ARULE/DATA`, and reports
//! failure through a non-zero exit code. Output parsing must not start after a
//! failed run, so failures are returned as terminal errors and never retried.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::error::{AppError, AppResult};

pub const DEFAULT_EXECUTABLE: &str = "UD_ARULE.exe";

fn default_executable() -> PathBuf {
    PathBuf::from(DEFAULT_EXECUTABLE)
}

fn default_mode_args() -> Vec<String> {
    vec!["2".to_string(), "0".to_string(), "1".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Relative paths are looked up under the run root first, then on `PATH`.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Numeric mode/version arguments passed between system name and root.
    #[serde(default = "default_mode_args")]
    pub mode_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            mode_args: default_mode_args(),
        }
    }
}

/// What to run: one system under one root directory.
#[derive(Debug, Clone, Copy)]
pub struct EngineInvocation<'a> {
    pub system: &'a str,
    pub root: &'a Path,
}

/// Seam between the pipeline and the engine process.
pub trait PrognosticsEngine {
    fn run(&self, invocation: &EngineInvocation<'_>) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config: EngineConfig,
}

impl ProcessEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn resolve_executable(&self, root: &Path) -> PathBuf {
        let executable = &self.config.executable;
        if executable.is_relative() {
            let under_root = root.join(executable);
            if under_root.is_file() {
                return under_root;
            }
        }
        executable.clone()
    }

    /// Arguments after the executable.
    pub fn arguments(&self, invocation: &EngineInvocation<'_>) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.config.mode_args.len() + 2);
        args.push(OsString::from(invocation.system));
        args.extend(self.config.mode_args.iter().map(OsString::from));
        args.push(invocation.root.as_os_str().to_os_string());
        args
    }
}

impl PrognosticsEngine for ProcessEngine {
    fn run(&self, invocation: &EngineInvocation<'_>) -> AppResult<()> {
        let executable = self.resolve_executable(invocation.root);
        let args = self.arguments(invocation);

        tracing::info!(
            system = invocation.system,
            executable = %executable.display(),
            root = %invocation.root.display(),
            "Starting engine run"
        );
        let started = Instant::now();

        // The child runs in the root; this process's working directory is untouched.
        let status = Command::new(&executable)
            .args(&args)
            .current_dir(invocation.root)
            .status()
            .map_err(|source| AppError::EngineLaunch {
                executable: executable.clone(),
                source,
            })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status.success() {
            tracing::info!(system = invocation.system, elapsed_ms, "Engine run succeeded");
            Ok(())
        } else {
            tracing::error!(
                system = invocation.system,
                elapsed_ms,
                code = ?status.code(),
                "Engine run failed"
            );
            Err(AppError::EngineInvocationFailed {
                system: invocation.system.to_string(),
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_system_modes_then_root() {
        let engine = ProcessEngine::new(EngineConfig::default());
        let args = engine.arguments(&EngineInvocation {
            system: "DEMO1",
            root: Path::new("/work"),
        });
        assert_eq!(args, ["DEMO1", "2", "0", "1", "/work"].map(OsString::from));
    }

    #[test]
    fn executable_falls_back_to_path_lookup() {
        let engine = ProcessEngine::new(EngineConfig::default());
        let resolved = engine.resolve_executable(Path::new("/definitely/not/here"));
        assert_eq!(resolved, PathBuf::from(DEFAULT_EXECUTABLE));
    }

    #[test]
    fn missing_executable_is_launch_error() {
        let engine = ProcessEngine::new(EngineConfig {
            executable: PathBuf::from("arule-engine-that-does-not-exist"),
            mode_args: vec![],
        });
        let root = std::env::temp_dir();
        let err = engine
            .run(&EngineInvocation {
                system: "DEMO1",
                root: &root,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::EngineLaunch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_invocation_failure() {
        let engine = ProcessEngine::new(EngineConfig {
            executable: PathBuf::from("false"),
            mode_args: vec![],
        });
        let root = std::env::temp_dir();
        let err = engine
            .run(&EngineInvocation {
                system: "DEMO1",
                root: &root,
            })
            .unwrap_err();
        match err {
            AppError::EngineInvocationFailed { system, code } => {
                assert_eq!(system, "DEMO1");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected EngineInvocationFailed, got {other:?}"),
        }
    }
}
