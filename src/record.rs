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

//! Log record.

use std::borrow::Cow;
use std::panic::Location;
use std::path::Path;
use std::time::SystemTime;

use crate::Level;

/// One log message on its way to the appenders.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    // the observed time
    now: SystemTime,

    // the metadata
    level: Level,
    name: &'a str,
    module_path: Option<&'a str>,
    file: Option<&'a str>,
    line: Option<u32>,

    // the payload
    payload: Cow<'a, str>,
    exception: Option<Cow<'a, str>>,
}

impl<'a> Record<'a> {
    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.now
    }

    /// The severity of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the logger that emitted the message.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The module path of the message.
    pub fn module_path(&self) -> Option<&'a str> {
        self.module_path
    }

    /// The source file containing the message.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// The filename of the source file.
    // obtain filename only from record's full file path
    pub fn filename(&self) -> Cow<'a, str> {
        self.file()
            .map(Path::new)
            .and_then(Path::file_name)
            .map(std::ffi::OsStr::to_string_lossy)
            .unwrap_or_default()
    }

    /// The line containing the message.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The rendered error attached by [`Logger::exception`](crate::Logger::exception), if any.
    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }

    /// Returns a new builder.
    pub fn builder() -> RecordBuilder<'a> {
        RecordBuilder::default()
    }
}

/// Builder for [`Record`].
///
/// # Examples
///
/// ```
/// use fast_logger::Level;
/// use fast_logger::record::Record;
///
/// let record = Record::builder()
///     .level(Level::Warning)
///     .name("app")
///     .payload("disk almost full")
///     .build();
/// assert_eq!(record.level(), Level::Warning);
/// ```
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    record: Record<'a>,
}

impl Default for RecordBuilder<'_> {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                now: SystemTime::now(),
                level: Level::Info,
                name: "",
                module_path: None,
                file: None,
                line: None,
                payload: Cow::Borrowed(""),
                exception: None,
            },
        }
    }
}

impl<'a> RecordBuilder<'a> {
    /// Set [`time`](Record::time).
    pub fn time(mut self, now: SystemTime) -> Self {
        self.record.now = now;
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`name`](Record::name).
    pub fn name(mut self, name: &'a str) -> Self {
        self.record.name = name;
        self
    }

    /// Set [`module_path`](Record::module_path).
    pub fn module_path(mut self, path: Option<&'a str>) -> Self {
        self.record.module_path = path;
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: Option<&'a str>) -> Self {
        self.record.file = file;
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.record.line = line;
        self
    }

    /// Set [`file`](Record::file) and [`line`](Record::line) from a caller location.
    pub fn location(self, location: &'static Location<'static>) -> Self {
        self.file(Some(location.file())).line(Some(location.line()))
    }

    /// Set [`payload`](Record::payload).
    pub fn payload(mut self, payload: impl Into<Cow<'a, str>>) -> Self {
        self.record.payload = payload.into();
        self
    }

    /// Set [`exception`](Record::exception).
    pub fn exception(mut self, exception: impl Into<Cow<'a, str>>) -> Self {
        self.record.exception = Some(exception.into());
        self
    }

    /// Invoke the builder and return a `Record`.
    pub fn build(self) -> Record<'a> {
        self.record
    }
}
