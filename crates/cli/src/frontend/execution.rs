//! crates/cli/src/frontend/execution.rs

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use logging::{ContextHandle, DumpFormat, LogError, Logger};
use thiserror::Error;

use super::arguments::Action;
use super::render;

/// Failure of one command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// An operation on a named context failed.
    #[error("{name}: {source}")]
    Context {
        name: String,
        #[source]
        source: LogError,
    },
    /// A logging call was rejected.
    #[error(transparent)]
    Log(#[from] LogError),
    /// The dump input could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Standard output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

pub(crate) fn execute<Out: Write>(action: Action, logger: &Logger, stdout: &mut Out) -> Result<(), CliError> {
    let registry = logger.registry();
    match action {
        Action::Show { name: None } => render::context_table(stdout, registry)?,
        Action::Show { name: Some(name) } => {
            let handle = find(logger, &name)?;
            let info = registry.info(handle).map_err(|source| CliError::Context { name, source })?;
            render::context_header(stdout)?;
            render::context_row(stdout, &info)?;
        }
        Action::SetLevel { name, level } => {
            let handle = find(logger, &name)?;
            registry
                .set_level(handle, level)
                .map_err(|source| CliError::Context { name: name.clone(), source })?;
            writeln!(stdout, "{name}: level {level}")?;
        }
        Action::SetFlag { name, flag, on } => {
            let handle = find(logger, &name)?;
            registry
                .set_flags(handle, flag, on)
                .map_err(|source| CliError::Context { name: name.clone(), source })?;
            let flags = registry
                .flags(handle)
                .map_err(|source| CliError::Context { name: name.clone(), source })?;
            writeln!(stdout, "{name}: flags {}", render::flag_list(flags))?;
        }
        Action::Log {
            context,
            msgid,
            kvpairs,
            level,
            message,
        } => {
            let handle = resolve(logger, context)?;
            logger.log_string(
                handle,
                level,
                msgid.as_deref(),
                kvpairs.as_deref(),
                Some(&message),
            )?;
        }
        Action::Dump { context, level, file } => {
            let handle = resolve(logger, context)?;
            let data = fs::read(&file).map_err(|source| CliError::Read { path: file, source })?;
            logger.dump_data(handle, level, Some(&data), DumpFormat::default())?;
        }
        Action::Reload => {
            let config = &logger.options().config;
            if logger.reload() {
                writeln!(stdout, "configuration reloaded from {}", config.config_dir.display())?;
            } else {
                writeln!(
                    stdout,
                    "configuration reloaded; {} not found",
                    config.default_path().display()
                )?;
            }
        }
        Action::DevMode { on } => {
            registry.set_dev_mode(on);
            writeln!(stdout, "dev-mode: {}", render::on_off(on))?;
        }
        Action::Errors => render::error_table(stdout)?,
    }
    Ok(())
}

fn find(logger: &Logger, name: &str) -> Result<ContextHandle, CliError> {
    logger.registry().find(name).map_err(|source| CliError::Context {
        name: name.to_owned(),
        source,
    })
}

fn resolve(logger: &Logger, context: Option<String>) -> Result<ContextHandle, CliError> {
    let handle = logger.context(context.as_deref()).map_err(|source| CliError::Context {
        name: context.clone().unwrap_or_default(),
        source,
    })?;
    tracing::debug!(context = ?context, %handle, "resolved context");
    Ok(handle)
}
