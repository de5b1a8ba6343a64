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

use std::fmt::Write;
use std::process;
use std::thread;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that renders records through a template with `{field}` placeholders.
///
/// Supported placeholders:
///
/// | placeholder | value                                          |
/// |-------------|------------------------------------------------|
/// | `{time}`    | local timestamp, `2024-08-07 11:06:40,123`     |
/// | `{name}`    | logger name                                    |
/// | `{level}`   | `DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL` |
/// | `{levelno}` | `10` to `50`                                   |
/// | `{message}` | the message                                    |
/// | `{file}`    | source file name                               |
/// | `{path}`    | full source file path                          |
/// | `{line}`    | source line                                    |
/// | `{module}`  | module path, empty if unknown                  |
/// | `{thread}`  | thread name, or thread id if unnamed           |
/// | `{pid}`     | process id                                     |
///
/// Literal braces are written as `{{` and `}}`.
///
/// Output with the [default pattern](PatternLayout::DEFAULT_PATTERN):
///
/// ```text
/// 2024-08-07 11:06:40,123 - app [main.rs:12] - INFO - service started
/// 2024-08-07 11:06:40,124 - app [main.rs:13] - WARNING - cache is cold
/// ```
///
/// If a record carries an exception, it is written on the lines following the formatted message.
///
/// # Examples
///
/// ```
/// use fast_logger::layout::PatternLayout;
///
/// let layout = PatternLayout::new("{level}: {message}").unwrap();
/// assert!(PatternLayout::new("{lvl}: {message}").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PatternLayout {
    pattern: String,
    segments: Vec<Segment>,
    timezone: TimeZone,
    timestamp_format: Option<fn(Timestamp, &TimeZone) -> String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Time,
    Name,
    Level,
    LevelNo,
    Message,
    File,
    Path,
    Line,
    Module,
    Thread,
    Pid,
}

impl Field {
    fn lookup(name: &str) -> Option<Field> {
        let field = match name {
            "time" => Field::Time,
            "name" => Field::Name,
            "level" => Field::Level,
            "levelno" => Field::LevelNo,
            "message" => Field::Message,
            "file" => Field::File,
            "path" => Field::Path,
            "line" => Field::Line,
            "module" => Field::Module,
            "thread" => Field::Thread,
            "pid" => Field::Pid,
            _ => return None,
        };
        Some(field)
    }
}

impl Default for PatternLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN)
            .expect("default pattern must be valid; this is a bug in fast-logger")
    }
}

impl PatternLayout {
    /// The pattern used when none is configured.
    pub const DEFAULT_PATTERN: &'static str =
        "{time} - {name} [{file}:{line}] - {level} - {message}";

    /// Parse a pattern into a layout.
    ///
    /// # Errors
    ///
    /// Return a configuration error if the pattern has an unknown placeholder or an unbalanced
    /// brace.
    pub fn new(pattern: impl Into<String>) -> Result<Self, Error> {
        let pattern = pattern.into();
        let segments = parse_pattern(&pattern)?;
        Ok(Self {
            pattern,
            segments,
            timezone: TimeZone::system(),
            timestamp_format: None,
        })
    }

    /// Return the source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Set the timezone for timestamps.
    ///
    /// Defaults to the system timezone if not set.
    ///
    /// # Examples
    ///
    /// ```
    /// use fast_logger::layout::PatternLayout;
    /// use jiff::tz::TimeZone;
    ///
    /// let layout = PatternLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// Set a user-defined timestamp format function for `{time}`.
    ///
    /// For formatting options, refer to the [jiff::fmt::strtime] documentation.
    ///
    /// # Examples
    ///
    /// ```
    /// use fast_logger::layout::PatternLayout;
    ///
    /// let layout = PatternLayout::default()
    ///     .timestamp_format(|ts, tz| format!("{:.6}", ts.display_with_offset(tz.to_offset(ts))));
    /// ```
    pub fn timestamp_format(mut self, format: fn(Timestamp, &TimeZone) -> String) -> Self {
        self.timestamp_format = Some(format);
        self
    }

    fn format_time(&self, record: &Record) -> Result<String, Error> {
        let ts = Timestamp::try_from(record.time())
            .map_err(|err| Error::emission("record time out of range").with_source(err))?;
        Ok(match self.timestamp_format {
            Some(format) => format(ts, &self.timezone),
            None => default_timestamp_format(ts, &self.timezone),
        })
    }
}

fn default_timestamp_format(ts: Timestamp, tz: &TimeZone) -> String {
    let zoned = ts.to_zoned(tz.clone());
    format!(
        "{},{:03}",
        zoned.strftime("%Y-%m-%d %H:%M:%S"),
        zoned.millisecond()
    )
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment>, Error> {
    let mut segments = vec![];
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.next_if(|&(_, c)| c == '{').is_some() => literal.push('{'),
            '}' if chars.next_if(|&(_, c)| c == '}').is_some() => literal.push('}'),
            '{' => {
                let rest = &pattern[pos + 1..];
                let Some(end) = rest.find('}') else {
                    return Err(Error::config("unterminated placeholder in log format")
                        .with_context("format", pattern));
                };
                let name = &rest[..end];
                let Some(field) = Field::lookup(name) else {
                    return Err(Error::config("unknown placeholder in log format")
                        .with_context("placeholder", name)
                        .with_context("format", pattern));
                };
                // skip the placeholder name and its closing brace
                for _ in 0..=name.chars().count() {
                    chars.next();
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(field));
            }
            '}' => {
                return Err(Error::config("unmatched '}' in log format")
                    .with_context("format", pattern));
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

impl Layout for PatternLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let mut text = String::new();

        for segment in &self.segments {
            let field = match segment {
                Segment::Literal(s) => {
                    text.push_str(s);
                    continue;
                }
                Segment::Field(field) => *field,
            };

            match field {
                Field::Time => text.push_str(&self.format_time(record)?),
                Field::Name => text.push_str(record.name()),
                Field::Level => text.push_str(record.level().name()),
                Field::LevelNo => {
                    write!(&mut text, "{}", record.level().value()).map_err(Error::from_fmt_error)?
                }
                Field::Message => text.push_str(record.payload()),
                Field::File => text.push_str(&record.filename()),
                Field::Path => text.push_str(record.file().unwrap_or_default()),
                Field::Line => write!(&mut text, "{}", record.line().unwrap_or_default())
                    .map_err(Error::from_fmt_error)?,
                Field::Module => text.push_str(record.module_path().unwrap_or_default()),
                Field::Thread => {
                    let current = thread::current();
                    match current.name() {
                        Some(name) => text.push_str(name),
                        None => write!(&mut text, "{:?}", current.id())
                            .map_err(Error::from_fmt_error)?,
                    }
                }
                Field::Pid => {
                    write!(&mut text, "{}", process::id()).map_err(Error::from_fmt_error)?
                }
            }
        }

        if let Some(exception) = record.exception() {
            text.push('\n');
            text.push_str(exception.trim_end());
        }

        Ok(text.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::time::SystemTime;

    use super::*;
    use crate::Level;
    use crate::error::ErrorKind;

    fn format(layout: &PatternLayout, record: &Record) -> String {
        String::from_utf8(layout.format(record).unwrap()).unwrap()
    }

    fn fixed_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(1_723_000_000_123)
    }

    #[test]
    fn test_default_pattern() {
        let layout = PatternLayout::default().timezone(TimeZone::UTC);
        let record = Record::builder()
            .time(fixed_time())
            .level(Level::Warning)
            .name("billing")
            .file(Some("src/billing/invoice.rs"))
            .line(Some(88))
            .payload("invoice total is negative")
            .build();

        assert_eq!(
            format(&layout, &record),
            concat!(
                "2024-08-07 03:06:40,123 - billing [invoice.rs:88] - WARNING - ",
                "invoice total is negative"
            )
        );
    }

    #[test]
    fn test_custom_pattern() {
        let layout = PatternLayout::new("{level}: {message}").unwrap();
        let record = Record::builder().level(Level::Info).payload("hello").build();
        assert_eq!(format(&layout, &record), "INFO: hello");

        let layout = PatternLayout::new("[{levelno}] {path}:{line} {module}|").unwrap();
        let record = Record::builder()
            .level(Level::Critical)
            .file(Some("src/main.rs"))
            .line(Some(7))
            .module_path(Some("app::main"))
            .build();
        assert_eq!(format(&layout, &record), "[50] src/main.rs:7 app::main|");
    }

    #[test]
    fn test_escaped_braces() {
        let layout = PatternLayout::new("{{{level}}} {{literal}} {message}").unwrap();
        let record = Record::builder().level(Level::Error).payload("boom").build();
        assert_eq!(format(&layout, &record), "{ERROR} {literal} boom");
    }

    #[test]
    fn test_invalid_patterns() {
        for pattern in ["{lvl}", "{message", "message}", "{}", "{level} {Message}"] {
            let err = PatternLayout::new(pattern).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{pattern}");
        }
    }

    #[test]
    fn test_exception_follows_message() {
        let layout = PatternLayout::new("{level} - {message}").unwrap();
        let record = Record::builder()
            .level(Level::Error)
            .payload("request failed")
            .exception("Error: connection reset\n")
            .build();
        assert_eq!(
            format(&layout, &record),
            "ERROR - request failed\nError: connection reset"
        );
    }

    #[test]
    fn test_custom_timestamp_format() {
        let layout = PatternLayout::new("{time}")
            .unwrap()
            .timezone(TimeZone::UTC)
            .timestamp_format(|ts, tz| ts.to_zoned(tz.clone()).strftime("%H:%M").to_string());
        let record = Record::builder().time(fixed_time()).build();
        assert_eq!(format(&layout, &record), "03:06");
    }
}
