use std::path::Path;

use anyhow::Context;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::config;

/// Start file logging under `log_dir` with size-based rotation.
///
/// `spec` is a flexi_logger spec string such as "info" or "minilm_embed=debug".
/// Warnings and errors are duplicated to stderr. Keep the returned handle alive
/// for as long as logs should be written.
pub fn init_logging(log_dir: &Path, spec: &str) -> anyhow::Result<LoggerHandle> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed creating log dir {}", log_dir.display()))?;

    let handle = Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(config::logging::LOG_FILE_NAME),
        )
        .rotate(
            Criterion::Size(config::logging::LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config::logging::LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .format(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    log::info!(
        "minilm-embed {} logging started ({} on {})",
        config::CRATE_VERSION,
        config::embedding::EMBEDDING_MODEL_NAME,
        std::env::consts::OS
    );

    Ok(handle)
}
