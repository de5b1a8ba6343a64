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

use crate::Error;
use crate::Level;
use crate::Logger;
use crate::record::Record;

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warning,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Debug,
        }
    }
}

impl Level {
    /// The most verbose [`log::LevelFilter`] whose records this level lets through.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Level::Debug => log::LevelFilter::Trace,
            Level::Info => log::LevelFilter::Info,
            Level::Warning => log::LevelFilter::Warn,
            Level::Error | Level::Critical => log::LevelFilter::Error,
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = record.level().into();
        if !Logger::enabled(self, level) {
            return;
        }

        let payload = record.args().to_string();
        let record = Record::builder()
            .level(level)
            .name(self.name())
            .module_path(record.module_path())
            .file(record.file())
            .line(record.line())
            .payload(payload)
            .build();
        Logger::log(self, &record);
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}

impl Logger {
    /// Install this logger as the global backend of the [`log`] crate.
    ///
    /// `log::Level::Trace` records are emitted as [`Level::Debug`]. The global maximum level is
    /// set from this logger's level.
    ///
    /// # Errors
    ///
    /// Return an error if a global `log` backend has already been set.
    ///
    /// # Examples
    ///
    /// ```
    /// use fast_logger::append;
    ///
    /// let logger = fast_logger::builder("app")
    ///     .dispatch(|d| d.append(append::Stdout::default()))
    ///     .build();
    /// if let Err(err) = logger.install() {
    ///     eprintln!("{err}");
    /// }
    /// log::info!("routed through fast-logger");
    /// ```
    pub fn install(&self) -> Result<(), Error> {
        log::set_boxed_logger(Box::new(self.clone())).map_err(|err| {
            Error::config("log global logger has been already setup").with_source(err)
        })?;
        log::set_max_level(self.level().to_level_filter());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use log::Log;

    use super::*;
    use crate::Append;
    use crate::layout::Layout;
    use crate::layout::PatternLayout;

    #[derive(Debug, Default, Clone)]
    struct Capture {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Append for Capture {
        fn append(&self, record: &Record) -> Result<(), Error> {
            let layout = PatternLayout::new("{level} {module} {message}").unwrap();
            let line = String::from_utf8(layout.format(record)?).unwrap();
            self.lines.lock().unwrap().push(line);
            Ok(())
        }
    }

    #[test]
    fn test_log_records_are_bridged() {
        let capture = Capture::default();
        let logger = crate::builder("bridge")
            .level(Level::Debug)
            .dispatch(|d| d.append(capture.clone()))
            .build();

        let metadata = log::Metadata::builder().level(log::Level::Warn).build();
        assert!(Log::enabled(&logger, &metadata));

        Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("retrying in {}s", 5))
                .level(log::Level::Warn)
                .module_path(Some("app::net"))
                .build(),
        );
        Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("wire bytes"))
                .level(log::Level::Trace)
                .module_path(Some("app::net"))
                .build(),
        );

        assert_eq!(
            *capture.lines.lock().unwrap(),
            vec!["WARNING app::net retrying in 5s", "DEBUG app::net wire bytes"]
        );
    }

    #[test]
    fn test_level_filter_mapping() {
        assert_eq!(Level::Debug.to_level_filter(), log::LevelFilter::Trace);
        assert_eq!(Level::Warning.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(Level::Critical.to_level_filter(), log::LevelFilter::Error);
        assert_eq!(Level::from(log::Level::Warn), Level::Warning);
    }
}
