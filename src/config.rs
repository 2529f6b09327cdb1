use anyhow::{Context, Result};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::expand::PATH_SEPARATOR;

/// The raw path strings a compiler driver hands over.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassPathSettings {
    pub boot: String,
    pub ext_dirs: String,
    pub user: String,
    pub source: String,
    /// Space-separated URLs.
    pub codebase: String,
    /// Directory that relative segments and `*` resolve against.
    pub base_dir: PathBuf,
}

pub fn resolve_settings(cli: &Cli) -> Result<ClassPathSettings> {
    resolve_settings_with(cli, |key| env::var(key).ok())
}

/// Flag first, then environment, then defaults derived from `JAVA_HOME`.
pub fn resolve_settings_with(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClassPathSettings> {
    let java_home = lookup("JAVA_HOME")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let boot = match cli.bootclasspath.clone() {
        Some(p) => p,
        None => java_home.as_deref().map(default_boot_path).unwrap_or_default(),
    };

    let ext_dirs = match cli.extdirs.clone() {
        Some(p) => p,
        None => java_home.as_deref().map(default_ext_dirs).unwrap_or_default(),
    };

    let user = cli
        .classpath
        .clone()
        .or_else(|| lookup("CLASSPATH").filter(|s| !s.is_empty()))
        .unwrap_or_else(|| ".".to_string());

    let base_dir = match cli.base_dir.clone() {
        Some(p) => p,
        None => env::current_dir().context("Failed to resolve current directory")?,
    };

    Ok(ClassPathSettings {
        boot,
        ext_dirs,
        user,
        source: cli.sourcepath.clone().unwrap_or_default(),
        codebase: cli.codebase.clone().unwrap_or_default(),
        base_dir,
    })
}

fn default_boot_path(java_home: &Path) -> String {
    join_paths(&[
        java_home.join("jre").join("lib").join("rt.jar"),
        java_home.join("lib").join("rt.jar"),
    ])
}

fn default_ext_dirs(java_home: &Path) -> String {
    join_paths(&[
        java_home.join("jre").join("lib").join("ext"),
        java_home.join("lib").join("ext"),
    ])
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}
