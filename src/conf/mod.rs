// Copyright (c) 2020, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

pub mod logger;

use crate::error::{ArconResult, Error};
use hocon::HoconLoader;
use logger::{file_logger, term_logger, ArconLogger, LoggerType};
use serde::Deserialize;
use slog::o;
use std::path::{Path, PathBuf};

/// Configuration for hosting operator nodes
#[derive(Deserialize, Clone, Debug)]
pub struct ArconConf {
    /// Name attached to every log line
    #[serde(default = "app_name_default")]
    pub app_name: String,
    /// Base directory, file logs end up here
    #[serde(default = "base_dir_default")]
    pub base_dir: PathBuf,
    /// [LoggerType] for arcon related logging
    #[serde(default)]
    pub arcon_logger_type: LoggerType,
}

impl Default for ArconConf {
    fn default() -> Self {
        ArconConf {
            app_name: app_name_default(),
            base_dir: base_dir_default(),
            arcon_logger_type: Default::default(),
        }
    }
}

impl ArconConf {
    /// Builds the logger selected by `arcon_logger_type`
    pub fn arcon_logger(&self) -> ArconResult<ArconLogger> {
        let root = match self.arcon_logger_type {
            LoggerType::File => {
                std::fs::create_dir_all(&self.base_dir)?;
                let path = self.base_dir.join(logger::ARCON_LOG_NAME);
                file_logger(&path.to_string_lossy())?
            }
            LoggerType::Terminal => term_logger(),
        };
        Ok(root.new(o!("app" => self.app_name.clone())))
    }

    /// Loads ArconConf from a file
    pub fn from_file(path: impl AsRef<Path>) -> ArconResult<ArconConf> {
        let data = std::fs::read_to_string(path)?;
        Self::from_str(&data)
    }

    /// Loads ArconConf from a HOCON string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(data: &str) -> ArconResult<ArconConf> {
        let loader: HoconLoader = HoconLoader::new().load_str(data).map_err(|e| Error::Config {
            msg: format!("Failed to load Hocon Loader with err {}", e),
        })?;

        loader.resolve().map_err(|e| Error::Config {
            msg: format!("Failed to resolve ArconConf with err {}", e),
        })
    }
}

// Default values

fn app_name_default() -> String {
    String::from("arcon_opspec")
}

fn base_dir_default() -> PathBuf {
    let mut res = std::env::temp_dir();
    res.push("arcon");
    res
}
