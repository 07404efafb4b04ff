// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::ArconResult;
use serde::Deserialize;
use slog::{o, Drain, Logger};
use std::fs::OpenOptions;

/// Alias for logger in Arcon
pub type ArconLogger = Logger;

pub const ARCON_LOG_NAME: &str = "arcon.log";

/// Defines a logger type
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum LoggerType {
    /// Logs output directly to the terminal
    Terminal,
    /// Logs output to file
    File,
}

impl Default for LoggerType {
    fn default() -> Self {
        LoggerType::Terminal
    }
}

pub fn term_logger() -> ArconLogger {
    let decorator = slog_term::TermDecorator::new().build();
    async_logger(decorator)
}

pub fn file_logger(log_path: &str) -> ArconResult<ArconLogger> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    Ok(async_logger(decorator))
}

fn async_logger<D>(decorator: D) -> ArconLogger
where
    D: slog_term::Decorator + Send + 'static,
{
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).chan_size(1024).build().fuse();

    slog::Logger::root(
        drain,
        o!(
        "location" => slog::PushFnValue(|r: &slog::Record<'_>, ser: slog::PushFnValueSerializer<'_>| {
            ser.emit(format_args!("{}:{}", r.file(), r.line()))
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::error;

    #[test]
    fn file_logger_flushes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ARCON_LOG_NAME);
        let log = file_logger(&path.to_string_lossy()).unwrap();
        error!(log, "timer failed"; "key" => 2u64);
        drop(log);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("timer failed"));
        assert!(contents.contains("location"));
    }

    #[test]
    fn term_logger_builds_and_drops() {
        let log = term_logger().new(o!("op_id" => "map"));
        drop(log);
    }
}
