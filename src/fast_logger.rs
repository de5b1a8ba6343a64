// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::ops::Deref;
use std::sync::Arc;

use crate::Error;
use crate::Level;
use crate::LevelSetting;
use crate::Logger;
use crate::LoggerConfig;
use crate::Registry;
use crate::config::ResolvedConfig;

/// A configured [`Logger`] together with the configuration it was built from.
///
/// `FastLogger` dereferences to [`Logger`], so the emission methods are called on it directly.
///
/// # Examples
///
/// ```
/// use fast_logger::FastLogger;
/// use fast_logger::LoggerConfig;
/// use fast_logger::Registry;
///
/// let dir = tempfile::tempdir().unwrap();
/// let registry = Registry::new();
///
/// let logger = FastLogger::with_registry(
///     &registry,
///     &LoggerConfig::new("payments")
///         .base_path(dir.path())
///         .console_output(false),
/// )
/// .unwrap();
///
/// logger.info("charge accepted");
/// assert!(logger.config().log_file().ends_with("logs/payments.log"));
/// ```
#[derive(Debug, Clone)]
pub struct FastLogger {
    config: Arc<ResolvedConfig>,
    logger: Logger,
}

impl FastLogger {
    /// Configure `config.name()` in the [global registry](Registry::global).
    ///
    /// # Errors
    ///
    /// See [`Registry::get_or_setup`].
    pub fn new(config: &LoggerConfig) -> Result<Self, Error> {
        Registry::global().get_or_setup(config)
    }

    /// Configure `config.name()` in `registry`.
    ///
    /// # Errors
    ///
    /// See [`Registry::get_or_setup`].
    pub fn with_registry(registry: &Registry, config: &LoggerConfig) -> Result<Self, Error> {
        registry.get_or_setup(config)
    }

    pub(crate) fn from_parts(config: ResolvedConfig, logger: Logger) -> Self {
        Self {
            config: Arc::new(config),
            logger,
        }
    }

    /// The logger name.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// The minimum severity.
    pub fn level(&self) -> Level {
        self.config.level()
    }

    /// The configuration this logger was built from.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The underlying logger.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Convert into the underlying logger.
    pub fn into_logger(self) -> Logger {
        self.logger
    }
}

impl Deref for FastLogger {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.logger
    }
}

/// Return the logger for `name` at `level`, with every other option at its default.
///
/// The logger writes to `logs/<name>.log` under the current working directory and mirrors to
/// standard output. A name that is already configured returns the existing logger.
///
/// # Errors
///
/// See [`Registry::get_or_setup`].
pub fn quick_logger(
    name: impl Into<String>,
    level: impl Into<LevelSetting>,
) -> Result<Logger, Error> {
    Registry::global().quick_logger(name, level)
}

/// Return the logger configured from `config`.
///
/// A name that is already configured returns the existing logger and ignores `config`.
///
/// # Errors
///
/// See [`Registry::get_or_setup`].
pub fn setup_logger(config: &LoggerConfig) -> Result<Logger, Error> {
    Registry::global().setup_logger(config)
}

/// Return the [`FastLogger`] configured from `config`.
///
/// # Errors
///
/// See [`Registry::get_or_setup`].
pub fn get_logger(config: &LoggerConfig) -> Result<FastLogger, Error> {
    FastLogger::new(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_global_factories_share_loggers() {
        let dir = TempDir::new().unwrap();
        let config = LoggerConfig::new("fast_logger_global_factories")
            .base_path(dir.path())
            .level(Level::Debug)
            .console_output(false);

        let fast = get_logger(&config).unwrap();
        let plain = setup_logger(&config).unwrap();
        assert!(fast.logger().ptr_eq(&plain));
        assert_eq!(fast.name(), "fast_logger_global_factories");
        assert_eq!(fast.level(), Level::Debug);
        assert!(Registry::global().contains("fast_logger_global_factories"));

        fast.debug("through the wrapper");
        plain.debug("through the logger");
        fast.flush();

        let contents = fs::read_to_string(fast.config().log_file()).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("[fast_logger.rs:"), "{contents}");
    }
}
