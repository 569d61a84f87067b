//! Where RegressLab keeps its files.
//!
//! Everything lives under one `.regresslab` root: `config.toml`,
//! `profile.json`, `logs/` and `secrets/`. The root sits in the OS config
//! directory unless `REGRESSLAB_CONFIG_HOME` points somewhere else.

use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

pub const APP_DIR_NAME: &str = ".regresslab";
/// Relocates the directory that holds [`APP_DIR_NAME`].
pub const CONFIG_HOME_ENV: &str = "REGRESSLAB_CONFIG_HOME";

/// Files stored directly in the app root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppFile {
    Config,
    Profile,
}

impl AppFile {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Config => "config.toml",
            Self::Profile => "profile.json",
        }
    }
}

/// Directories created on demand inside the app root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppSubdir {
    Logs,
    Secrets,
}

impl AppSubdir {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Logs => "logs",
            Self::Secrets => "secrets",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No home for RegressLab files was found; set {CONFIG_HOME_ENV}")]
    NoBaseDir,
    #[error("Could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.regresslab` root, created if missing.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    create(base_dir()?.join(APP_DIR_NAME))
}

/// Path of a root-level file. The file itself is not created.
pub fn app_file(file: AppFile) -> Result<PathBuf, AppDirError> {
    Ok(app_root_dir()?.join(file.file_name()))
}

pub fn subdir(kind: AppSubdir) -> Result<PathBuf, AppDirError> {
    create(app_root_dir()?.join(kind.dir_name()))
}

pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    subdir(AppSubdir::Logs)
}

pub fn secrets_dir() -> Result<PathBuf, AppDirError> {
    subdir(AppSubdir::Secrets)
}

fn create(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn base_dir() -> Result<PathBuf, AppDirError> {
    overridden_base()
        .or_else(|| {
            std::env::var_os(CONFIG_HOME_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
        .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
        .ok_or(AppDirError::NoBaseDir)
}

#[cfg(test)]
fn overridden_base() -> Option<PathBuf> {
    test_base::current()
}

#[cfg(not(test))]
fn overridden_base() -> Option<PathBuf> {
    None
}
