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

//! Logger configuration and its resolution into concrete settings.

use std::env;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use crate::Error;
use crate::Level;
use crate::Trap;
use crate::layout::PatternLayout;
use crate::trap::DefaultTrap;

const DEFAULT_LOG_FOLDER: &str = "logs";
const DEFAULT_MAX_FILE_SIZE_MB: NonZeroUsize = NonZeroUsize::new(50).unwrap();
const DEFAULT_BACKUP_COUNT: usize = 3;
const BYTES_PER_MB: NonZeroUsize = NonZeroUsize::new(1024 * 1024).unwrap();

/// A requested severity, as given by the caller.
///
/// Text and numbers are resolved leniently: anything unrecognized becomes [`Level::Info`], and
/// the fallback is reported to the [`Trap`] as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSetting {
    /// An exact level.
    Level(Level),
    /// A level name, matched case-insensitively.
    Name(String),
    /// A numeric level such as `10` for `DEBUG`.
    Value(u32),
}

impl Default for LevelSetting {
    fn default() -> Self {
        LevelSetting::Level(Level::Info)
    }
}

impl From<Level> for LevelSetting {
    fn from(level: Level) -> Self {
        LevelSetting::Level(level)
    }
}

impl From<&str> for LevelSetting {
    fn from(name: &str) -> Self {
        LevelSetting::Name(name.to_string())
    }
}

impl From<String> for LevelSetting {
    fn from(name: String) -> Self {
        LevelSetting::Name(name)
    }
}

impl From<u32> for LevelSetting {
    fn from(value: u32) -> Self {
        LevelSetting::Value(value)
    }
}

impl LevelSetting {
    /// Resolve to a [`Level`], reporting an unrecognized setting to `trap`.
    pub fn resolve(&self, trap: &dyn Trap) -> Level {
        let (resolved, setting) = match self {
            LevelSetting::Level(level) => return *level,
            LevelSetting::Name(name) => (name.parse::<Level>().ok(), name.clone()),
            LevelSetting::Value(value) => (Level::from_value(*value), value.to_string()),
        };

        resolved.unwrap_or_else(|| {
            let err = Error::config("unrecognized log level; falling back to INFO")
                .with_context("level", setting);
            trap.trap(&err);
            Level::Info
        })
    }
}

/// The options of one named logger.
///
/// Every option has a default; only the name is required.
///
/// | option             | default |
/// |--------------------|---------|
/// | `level`            | `INFO`  |
/// | `log_folder`       | `logs`  |
/// | `max_file_size_mb` | `50`    |
/// | `backup_count`     | `3`     |
/// | `log_format`       | [`PatternLayout::DEFAULT_PATTERN`] |
/// | `console_output`   | `true`  |
/// | `base_path`        | the current working directory |
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use fast_logger::LoggerConfig;
///
/// let config = LoggerConfig::new("billing")
///     .level("debug")
///     .max_file_size_mb(NonZeroUsize::new(100).unwrap())
///     .backup_count(5)
///     .console_output(false)
///     .base_path("/var/lib/billing");
///
/// let resolved = config.resolve().unwrap();
/// assert_eq!(
///     resolved.log_file(),
///     std::path::Path::new("/var/lib/billing/logs/billing.log")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    name: String,
    level: LevelSetting,
    log_folder: PathBuf,
    max_file_size_mb: NonZeroUsize,
    backup_count: usize,
    log_format: Option<String>,
    console_output: bool,
    base_path: Option<PathBuf>,
}

impl LoggerConfig {
    /// Create a configuration with default options for the logger `name`.
    ///
    /// The name identifies the logger and is the stem of its log file.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: LevelSetting::default(),
            log_folder: PathBuf::from(DEFAULT_LOG_FOLDER),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            backup_count: DEFAULT_BACKUP_COUNT,
            log_format: None,
            console_output: true,
            base_path: None,
        }
    }

    /// The logger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the minimum severity.
    ///
    /// Accepts a [`Level`], a level name such as `"warning"`, or a numeric level such as `30`.
    #[must_use]
    pub fn level(mut self, level: impl Into<LevelSetting>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the folder, relative to the base path, that holds the log files.
    #[must_use]
    pub fn log_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.log_folder = folder.into();
        self
    }

    /// Set the size in MiB after which the log file rolls over.
    #[must_use]
    pub fn max_file_size_mb(mut self, n: NonZeroUsize) -> Self {
        self.max_file_size_mb = n;
        self
    }

    /// Set the number of rolled-over files to keep.
    #[must_use]
    pub fn backup_count(mut self, n: usize) -> Self {
        self.backup_count = n;
        self
    }

    /// Set the message template, see [`PatternLayout`] for the placeholders.
    #[must_use]
    pub fn log_format(mut self, format: impl Into<String>) -> Self {
        self.log_format = Some(format.into());
        self
    }

    /// Set whether records are mirrored to standard output.
    #[must_use]
    pub fn console_output(mut self, enabled: bool) -> Self {
        self.console_output = enabled;
        self
    }

    /// Set the directory that contains the log folder.
    #[must_use]
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Resolve the options into concrete settings, reporting warnings to standard error.
    ///
    /// # Errors
    ///
    /// See [`LoggerConfig::resolve_with_trap`].
    pub fn resolve(&self) -> Result<ResolvedConfig, Error> {
        self.resolve_with_trap(&DefaultTrap::default())
    }

    /// Resolve the options into concrete settings, reporting warnings to `trap`.
    ///
    /// # Errors
    ///
    /// Return a configuration error if the name is empty or contains a path separator, if the
    /// log format is invalid, or if the maximum file size overflows. Return a filesystem error if
    /// no base path is set and the current working directory cannot be determined.
    pub fn resolve_with_trap(&self, trap: &dyn Trap) -> Result<ResolvedConfig, Error> {
        validate_name(&self.name)?;

        let level = self.level.resolve(trap);

        let max_file_size = self
            .max_file_size_mb
            .checked_mul(BYTES_PER_MB)
            .ok_or_else(|| {
                Error::config("max file size overflows")
                    .with_context("max_file_size_mb", self.max_file_size_mb)
            })?;

        let layout = match &self.log_format {
            Some(format) => PatternLayout::new(format.as_str())?,
            None => PatternLayout::default(),
        };

        let base_path = match &self.base_path {
            Some(path) => path.clone(),
            None => env::current_dir().map_err(|err| {
                Error::filesystem("failed to determine the current working directory")
                    .with_source(err)
            })?,
        };
        let log_dir = base_path.join(&self.log_folder);
        let log_file = log_dir.join(format!("{}.log", self.name));

        Ok(ResolvedConfig {
            name: self.name.clone(),
            level,
            log_dir,
            log_file,
            max_file_size,
            backup_count: self.backup_count,
            layout,
            console_output: self.console_output,
        })
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::config("logger name must not be empty"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(
            Error::config("logger name must not be a path").with_context("name", name)
        );
    }
    Ok(())
}

/// A fully specified logger configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    name: String,
    level: Level,
    log_dir: PathBuf,
    log_file: PathBuf,
    max_file_size: NonZeroUsize,
    backup_count: usize,
    layout: PatternLayout,
    console_output: bool,
}

impl ResolvedConfig {
    /// The logger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The minimum severity.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The directory holding the log files, `base_path/log_folder`.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// The active log file, `base_path/log_folder/name.log`.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// The file name of the active log file, `name.log`.
    pub fn log_filename(&self) -> String {
        format!("{}.log", self.name)
    }

    /// The size in bytes after which the log file rolls over.
    pub fn max_file_size(&self) -> NonZeroUsize {
        self.max_file_size
    }

    /// The number of rolled-over files to keep.
    pub fn backup_count(&self) -> usize {
        self.backup_count
    }

    /// The layout formatting each record.
    pub fn layout(&self) -> &PatternLayout {
        &self.layout
    }

    /// Whether records are mirrored to standard output.
    pub fn console_output(&self) -> bool {
        self.console_output
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, Default, Clone)]
    struct CollectTrap {
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl Trap for CollectTrap {
        fn trap(&self, err: &Error) {
            self.errors.lock().unwrap().push(err.to_string());
        }
    }

    #[test]
    fn test_defaults() {
        let resolved = LoggerConfig::new("orders")
            .base_path("/srv/app")
            .resolve()
            .unwrap();

        assert_eq!(resolved.name(), "orders");
        assert_eq!(resolved.level(), Level::Info);
        assert_eq!(resolved.log_dir(), Path::new("/srv/app/logs"));
        assert_eq!(resolved.log_file(), Path::new("/srv/app/logs/orders.log"));
        assert_eq!(resolved.log_filename(), "orders.log");
        assert_eq!(resolved.max_file_size().get(), 50 * 1024 * 1024);
        assert_eq!(resolved.backup_count(), 3);
        assert_eq!(resolved.layout().pattern(), PatternLayout::DEFAULT_PATTERN);
        assert!(resolved.console_output());
    }

    #[test]
    fn test_base_path_defaults_to_current_dir() {
        let resolved = LoggerConfig::new("cwd").resolve().unwrap();
        let expected = env::current_dir().unwrap().join("logs").join("cwd.log");
        assert_eq!(resolved.log_file(), expected);
    }

    #[test]
    fn test_level_settings() {
        let trap = CollectTrap::default();
        let resolve = |setting: LevelSetting| setting.resolve(&trap);

        assert_eq!(resolve(Level::Error.into()), Level::Error);
        assert_eq!(resolve("debug".into()), Level::Debug);
        assert_eq!(resolve("WARNING".into()), Level::Warning);
        assert_eq!(resolve(String::from("Critical").into()), Level::Critical);
        assert_eq!(resolve(40.into()), Level::Error);
        assert!(trap.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_level_falls_back_with_warning() {
        let trap = CollectTrap::default();
        let resolved = LoggerConfig::new("typo")
            .base_path("/tmp")
            .level("debgu")
            .resolve_with_trap(&trap)
            .unwrap();
        assert_eq!(resolved.level(), Level::Info);

        assert_eq!(LevelSetting::from(25).resolve(&trap), Level::Info);

        let errors = trap.errors.lock().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("debgu"), "{}", errors[0]);
        assert!(errors[1].contains("25"), "{}", errors[1]);
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", ".", "..", "a/b", "a\\b"] {
            let err = LoggerConfig::new(name)
                .base_path("/tmp")
                .resolve()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{name:?}");
        }
        assert!(
            LoggerConfig::new("app.db")
                .base_path("/tmp")
                .resolve()
                .is_ok()
        );
    }

    #[test]
    fn test_invalid_format() {
        let err = LoggerConfig::new("fmt")
            .base_path("/tmp")
            .log_format("%(levelname)s: {msg}")
            .resolve()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_max_file_size_overflow() {
        let err = LoggerConfig::new("huge")
            .base_path("/tmp")
            .max_file_size_mb(NonZeroUsize::MAX)
            .resolve()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
