use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::EnvFilter;

/// Splits the log file path into the directory the appender writes to and the file name
fn log_location(path: &Path) -> anyhow::Result<(PathBuf, OsString)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log file {} has no file name", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((directory, file_name.to_os_string()))
}

/// Sends logs to `path` from a background writer thread. The terminal belongs
/// to the UI, so nothing is written to stdout.
///
/// Logs are flushed until the returned guard is dropped.
pub fn init(path: &Path) -> anyhow::Result<WorkerGuard> {
    let (directory, file_name) = log_location(path)?;
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("could not create log directory {}", directory.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(rolling::never(directory, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_name_logs_to_the_working_directory() {
        let (directory, file_name) = log_location(Path::new("codeshare-tui.log")).unwrap();

        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, OsString::from("codeshare-tui.log"));
    }

    #[test]
    fn nested_path_keeps_its_directory() {
        let (directory, file_name) = log_location(Path::new("/var/log/codeshare/tui.log")).unwrap();

        assert_eq!(directory, PathBuf::from("/var/log/codeshare"));
        assert_eq!(file_name, OsString::from("tui.log"));
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(log_location(Path::new("/")).is_err());
        assert!(log_location(Path::new("logs/..")).is_err());
    }
}
