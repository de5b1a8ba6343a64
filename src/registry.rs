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

//! The registry of configured loggers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use crate::Error;
use crate::FastLogger;
use crate::LevelSetting;
use crate::Logger;
use crate::LoggerConfig;
use crate::Trap;
use crate::append::FileBuilder;
use crate::append::Stdout;
use crate::config::ResolvedConfig;
use crate::trap::DefaultTrap;

/// A set of named loggers, each configured at most once.
///
/// The first request for a name resolves its [`LoggerConfig`], creates the log directory and
/// attaches the file appender and, if enabled, the console appender. Later requests for the same
/// name return the logger configured first and ignore the new options.
///
/// Applications may own a registry at their composition root; the free functions such as
/// [`setup_logger`](crate::setup_logger) use [`Registry::global`].
///
/// # Examples
///
/// ```
/// use fast_logger::LoggerConfig;
/// use fast_logger::Registry;
///
/// let dir = tempfile::tempdir().unwrap();
/// let registry = Registry::new();
///
/// let config = LoggerConfig::new("worker")
///     .base_path(dir.path())
///     .console_output(false);
/// let first = registry.setup_logger(&config).unwrap();
/// let again = registry.setup_logger(&config).unwrap();
///
/// assert!(first.ptr_eq(&again));
/// assert_eq!(again.sink_count(), 1);
/// ```
#[derive(Debug)]
pub struct Registry {
    loggers: Mutex<HashMap<String, FastLogger>>,
    trap: Arc<dyn Trap>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry that reports errors to standard error.
    pub fn new() -> Self {
        Self::with_trap(DefaultTrap::default())
    }

    /// Create an empty registry that reports errors of its loggers to `trap`.
    ///
    /// The trap receives configuration warnings, as well as write and rotation failures of every
    /// logger configured through this registry.
    pub fn with_trap(trap: impl Trap) -> Self {
        Self {
            loggers: Mutex::new(HashMap::new()),
            trap: Arc::new(trap),
        }
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Return the logger configured for `name`, if any.
    pub fn get(&self, name: &str) -> Option<FastLogger> {
        self.loggers().get(name).cloned()
    }

    /// Whether a logger is configured for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.loggers().contains_key(name)
    }

    /// The number of configured loggers.
    pub fn len(&self) -> usize {
        self.loggers().len()
    }

    /// Whether no logger is configured yet.
    pub fn is_empty(&self) -> bool {
        self.loggers().is_empty()
    }

    /// The names of all configured loggers, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers().keys().cloned().collect();
        names.sort();
        names
    }

    /// Return the logger for `config.name()`, configuring it first if needed.
    ///
    /// # Errors
    ///
    /// Return a configuration error if `config` is invalid, or a filesystem error if the log
    /// directory or file cannot be created. The registry is left untouched on error.
    pub fn get_or_setup(&self, config: &LoggerConfig) -> Result<FastLogger, Error> {
        // configuration runs under the lock, so concurrent first requests wire one set of sinks
        let mut loggers = self.loggers();
        if let Some(logger) = loggers.get(config.name()) {
            return Ok(logger.clone());
        }

        let resolved = config.resolve_with_trap(&self.trap)?;
        let logger = wire(&resolved, self.trap.clone())?;
        let logger = FastLogger::from_parts(resolved, logger);
        loggers.insert(config.name().to_string(), logger.clone());
        Ok(logger)
    }

    /// Return the [`Logger`] for `config.name()`, configuring it first if needed.
    ///
    /// # Errors
    ///
    /// See [`Registry::get_or_setup`].
    pub fn setup_logger(&self, config: &LoggerConfig) -> Result<Logger, Error> {
        self.get_or_setup(config).map(FastLogger::into_logger)
    }

    /// Return the [`Logger`] for `name` at `level`, with every other option at its default.
    ///
    /// # Errors
    ///
    /// See [`Registry::get_or_setup`].
    pub fn quick_logger(
        &self,
        name: impl Into<String>,
        level: impl Into<LevelSetting>,
    ) -> Result<Logger, Error> {
        self.setup_logger(&LoggerConfig::new(name).level(level))
    }

    fn loggers(&self) -> MutexGuard<'_, HashMap<String, FastLogger>> {
        self.loggers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn wire(config: &ResolvedConfig, trap: Arc<dyn Trap>) -> Result<Logger, Error> {
    let level = config.level();
    let layout = config.layout().clone();

    let file = FileBuilder::new(config.log_dir(), config.log_filename())
        .layout(layout.clone())
        .rollover_size(config.max_file_size())
        .max_backups(config.backup_count())
        .trap(trap.clone())
        .build()?;

    let mut builder = crate::builder(config.name())
        .level(level)
        .trap(trap)
        .dispatch(|d| d.filter(level).append(file));
    if config.console_output() {
        let stdout = Stdout::default().with_layout(layout);
        builder = builder.dispatch(|d| d.filter(level).append(stdout));
    }
    Ok(builder.build())
}
