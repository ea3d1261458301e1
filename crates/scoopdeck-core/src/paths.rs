//! Locations of the interpreter and Scoop's scripts.

use std::path::{Path, PathBuf};

/// Interpreter and install-root locations used to build command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoopPaths {
    /// Shell executable every command is routed through.
    pub interpreter: PathBuf,
    /// Scoop installation root (`$SCOOP`).
    pub scoop_root: PathBuf,
}

impl ScoopPaths {
    pub fn new(interpreter: impl Into<PathBuf>, scoop_root: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            scoop_root: scoop_root.into(),
        }
    }

    /// Resolve from the `windir` and `SCOOP` environment variables.
    pub fn from_env() -> Self {
        Self::new(default_interpreter(), default_scoop_root())
    }

    fn bin_dir(&self) -> PathBuf {
        self.scoop_root
            .join("apps")
            .join("scoop")
            .join("current")
            .join("bin")
    }

    /// `<root>/apps/scoop/current/bin/scoop.ps1`
    pub fn scoop_script(&self) -> PathBuf {
        self.bin_dir().join("scoop.ps1")
    }

    /// `<root>/apps/scoop/current/bin/checkver.ps1`
    pub fn checkver_script(&self) -> PathBuf {
        self.bin_dir().join("checkver.ps1")
    }

    /// `<root>/buckets/<bucket>`; the name must already be sanitized.
    pub fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.scoop_root.join("buckets").join(bucket)
    }
}

/// Windows PowerShell under `%windir%`.
pub fn default_interpreter() -> PathBuf {
    let windir = std::env::var_os("windir").unwrap_or_else(|| "C:\\Windows".into());
    Path::new(&windir)
        .join("System32")
        .join("WindowsPowerShell")
        .join("v1.0")
        .join("powershell.exe")
}

/// `%SCOOP%`, or `~/scoop` when unset (Scoop's own default).
pub fn default_scoop_root() -> PathBuf {
    std::env::var_os("SCOOP")
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join("scoop"))
}
