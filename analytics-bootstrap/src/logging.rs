use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use analytics_infrastructure::AppConfig;

/// Human output on stderr, plus JSON lines into `log_file` when configured.
///
/// `RUST_LOG` wins over `log_level`. The returned guard flushes the file
/// writer on drop and must live as long as the process.
pub fn init(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log_level")?;

    let (file_layer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log dir {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name)
                .build(dir)
                .with_context(|| format!("cannot open log file {}", path))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!("logging already initialized: {}", err))?;
    Ok(guard)
}

fn split_log_path(path: &str) -> Result<(&Path, &str)> {
    let path = Path::new(path);
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("log_file has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_directory_and_file_name() {
        let (dir, name) = split_log_path("logs/analysis.log").expect("split");
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "analysis.log");

        let (dir, name) = split_log_path("analysis.log").expect("split");
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "analysis.log");

        assert!(split_log_path("logs/..").is_err());
    }

    #[test]
    fn file_layer_writes_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("analysis.log");
        let config = AppConfig {
            log_file: Some(path.to_string_lossy().to_string()),
            ..AppConfig::default()
        };

        let guard = init(&config).expect("init");
        tracing::info!(stage = "test", "hello from the file layer");
        drop(guard);

        let content = std::fs::read_to_string(&path).expect("log file");
        let line = content.lines().last().expect("one line");
        assert!(line.starts_with('{'));
        assert!(line.contains("hello from the file layer"));
    }
}
