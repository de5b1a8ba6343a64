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

use std::backtrace::Backtrace;
use std::backtrace::BacktraceStatus;
use std::error::Error as StdError;
use std::fmt;
use std::fmt::Write;
use std::panic::Location;
use std::sync::Arc;

use crate::Append;
use crate::Error;
use crate::Filter;
use crate::Level;
use crate::Trap;
use crate::filter::FilterResult;
use crate::record::Record;

/// A named logger that dispatches records to its appenders.
///
/// `Logger` is a cheap handle: clones share the same appenders. Records below the logger's
/// [`level`](Logger::level) are dropped before they are formatted. Records are never forwarded
/// to any other logger.
///
/// The emission methods capture the caller's source location for the `{file}` and `{line}`
/// placeholders.
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

#[derive(Debug)]
struct LoggerInner {
    name: String,
    level: Level,
    dispatches: Vec<Dispatch>,
    trap: Box<dyn Trap>,
}

impl Logger {
    pub(super) fn new(
        name: String,
        level: Level,
        dispatches: Vec<Dispatch>,
        trap: Box<dyn Trap>,
    ) -> Self {
        let inner = LoggerInner {
            name,
            level,
            dispatches,
            trap,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// The name of this logger.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The minimum severity this logger emits.
    pub fn level(&self) -> Level {
        self.inner.level
    }

    /// The number of appenders attached to this logger.
    pub fn sink_count(&self) -> usize {
        self.inner
            .dispatches
            .iter()
            .map(|dispatch| dispatch.appends.len())
            .sum()
    }

    /// Whether `other` is a handle to the same logger.
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether a record at `level` would reach at least one appender.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.inner.level
            && self
                .inner
                .dispatches
                .iter()
                .any(|dispatch| dispatch.enabled(level))
    }

    /// Dispatch a prepared record to the appenders.
    ///
    /// Appender failures are handed to the logger's [`Trap`] and never returned.
    pub fn log(&self, record: &Record) {
        if record.level() < self.inner.level {
            return;
        }

        for dispatch in &self.inner.dispatches {
            if let Err(err) = dispatch.log(record) {
                let err = Error::emission("failed to append log record")
                    .with_context("logger", &self.inner.name)
                    .with_source(err);
                self.inner.trap.trap(&err);
            }
        }
    }

    /// Flush all appenders.
    pub fn flush(&self) {
        for dispatch in &self.inner.dispatches {
            for err in dispatch.flush() {
                let err = Error::emission("failed to flush appender")
                    .with_context("logger", &self.inner.name)
                    .with_source(err);
                self.inner.trap.trap(&err);
            }
        }
    }

    /// Log `message` at `level`.
    #[track_caller]
    pub fn log_at(&self, level: Level, message: impl fmt::Display) {
        self.emit(level, &message, None, Location::caller());
    }

    /// Log `message` at [`Level::Debug`].
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::Debug, &message, None, Location::caller());
    }

    /// Log `message` at [`Level::Info`].
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::Info, &message, None, Location::caller());
    }

    /// Log `message` at [`Level::Warning`].
    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.emit(Level::Warning, &message, None, Location::caller());
    }

    /// Log `message` at [`Level::Error`].
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::Error, &message, None, Location::caller());
    }

    /// Log `message` at [`Level::Critical`].
    #[track_caller]
    pub fn critical(&self, message: impl fmt::Display) {
        self.emit(Level::Critical, &message, None, Location::caller());
    }

    /// Log `message` at [`Level::Error`], followed by `err`, its chain of sources and, when
    /// backtraces are enabled through `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`, a stack
    /// backtrace of this call.
    ///
    /// # Examples
    ///
    /// ```
    /// use fast_logger::Level;
    /// use fast_logger::append;
    ///
    /// let logger = fast_logger::builder("app")
    ///     .dispatch(|d| d.append(append::Stdout::default()))
    ///     .build();
    ///
    /// if let Err(err) = "ten".parse::<u32>() {
    ///     logger.exception("failed to parse the retry count", &err);
    /// }
    /// ```
    #[track_caller]
    pub fn exception(&self, message: impl fmt::Display, err: &(dyn StdError + 'static)) {
        let location = Location::caller();
        if !self.enabled(Level::Error) {
            return;
        }
        let exception = render_exception(err);
        self.emit(Level::Error, &message, Some(exception), location);
    }

    fn emit(
        &self,
        level: Level,
        message: &dyn fmt::Display,
        exception: Option<String>,
        location: &'static Location<'static>,
    ) {
        if !self.enabled(level) {
            return;
        }

        let payload = message.to_string();
        let mut builder = Record::builder()
            .level(level)
            .name(&self.inner.name)
            .location(location)
            .payload(payload);
        if let Some(exception) = exception {
            builder = builder.exception(exception);
        }
        self.log(&builder.build());
    }
}

fn render_exception(err: &(dyn StdError + 'static)) -> String {
    let mut text = format!("Error: {err}");

    let mut source = err.source();
    if source.is_some() {
        text.push_str("\n\nCaused by:");
    }
    let mut n = 0;
    while let Some(cause) = source {
        // writing to a string never fails
        let _ = write!(&mut text, "\n    {n}: {cause}");
        n += 1;
        source = cause.source();
    }

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(&mut text, "\n\nStack backtrace:\n{backtrace}");
    }

    text
}

/// A grouped set of appenders and filters.
///
/// The [`Logger`] dispatches log records to one or more [`Dispatch`] instances.
/// Each [`Dispatch`] instance contains a set of filters and appenders.
///
/// `filters` are used to determine whether a log record should be passed to the appenders.
/// `appends` are used to write log records to a destination.
#[derive(Debug)]
pub(super) struct Dispatch {
    filters: Vec<Box<dyn Filter>>,
    appends: Vec<Box<dyn Append>>,
}

impl Dispatch {
    pub(super) fn new(filters: Vec<Box<dyn Filter>>, appends: Vec<Box<dyn Append>>) -> Self {
        debug_assert!(
            !appends.is_empty(),
            "A Dispatch must have at least one appender"
        );

        Self { filters, appends }
    }

    fn enabled(&self, level: Level) -> bool {
        for filter in &self.filters {
            match filter.enabled(level) {
                FilterResult::Reject => return false,
                FilterResult::Accept => return true,
                FilterResult::Neutral => {}
            }
        }

        true
    }

    fn log(&self, record: &Record) -> Result<(), Error> {
        for filter in &self.filters {
            match filter.matches(record) {
                FilterResult::Reject => return Ok(()),
                FilterResult::Accept => break,
                FilterResult::Neutral => {}
            }
        }

        // every appender gets the record, even if an earlier one fails
        let mut first_err = None;
        for append in &self.appends {
            if let Err(err) = append.append(record) {
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    fn flush(&self) -> Vec<Error> {
        self.appends
            .iter()
            .filter_map(|append| append.flush().err())
            .collect()
    }
}
