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

//! Severity levels.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The severity of a log record.
///
/// Levels are ordered from the least to the most severe:
/// `Debug < Info < Warning < Error < Critical`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Detailed information, typically of interest only when diagnosing problems.
    Debug,
    /// Confirmation that things are working as expected.
    #[default]
    Info,
    /// An indication that something unexpected happened.
    Warning,
    /// A more serious problem; some function could not be performed.
    Error,
    /// A serious error; the program itself may be unable to continue running.
    Critical,
}

const LEVELS: [Level; 5] = [
    Level::Debug,
    Level::Info,
    Level::Warning,
    Level::Error,
    Level::Critical,
];

impl Level {
    /// Return the upper-case name of the level, such as `WARNING`.
    pub const fn name(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Return the conventional numeric value of the level: 10 for `Debug` up to 50 for
    /// `Critical`.
    pub const fn value(&self) -> u32 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Look up a level by its numeric value.
    ///
    /// # Examples
    ///
    /// ```
    /// use fast_logger::Level;
    ///
    /// assert_eq!(Level::from_value(30), Some(Level::Warning));
    /// assert_eq!(Level::from_value(25), None);
    /// ```
    pub fn from_value(value: u32) -> Option<Level> {
        LEVELS.into_iter().find(|level| level.value() == value)
    }

    /// Return all levels from the least to the most severe.
    pub fn iter() -> impl Iterator<Item = Level> {
        LEVELS.into_iter()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Parse a level name case-insensitively.
    ///
    /// `WARN` and `FATAL` are accepted as aliases of `WARNING` and `CRITICAL`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s.trim();
        for candidate in LEVELS {
            if level.eq_ignore_ascii_case(candidate.name()) {
                return Ok(candidate);
            }
        }

        if level.eq_ignore_ascii_case("warn") {
            Ok(Level::Warning)
        } else if level.eq_ignore_ascii_case("fatal") {
            Ok(Level::Critical)
        } else {
            Err(Error::config("unrecognized log level").with_context("level", s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
        assert_eq!(Level::default(), Level::Info);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("DEBUG".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("Warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!(" error ".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("fatal".parse::<Level>().unwrap(), Level::Critical);
        assert!("verbose".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn test_values_round_trip_names() {
        for level in Level::iter() {
            assert_eq!(Level::from_value(level.value()), Some(level));
            assert_eq!(level.name().parse::<Level>().unwrap(), level);
        }
        assert_eq!(format!("{:>8}", Level::Info), "    INFO");
    }
}
