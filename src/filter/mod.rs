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

//! Filters for log records.

use std::fmt;

use crate::Level;
use crate::record::Record;

mod min_level;

/// The result of a filter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// The record will be processed without further filtering.
    Accept,
    /// The record should not be processed.
    Reject,
    /// No decision could be made, further filtering should occur.
    Neutral,
}

/// A filter that decides whether a log record reaches the appenders of a dispatch.
pub trait Filter: fmt::Debug + Send + Sync + 'static {
    /// Check whether records of the given level can pass this filter at all.
    fn enabled(&self, level: Level) -> FilterResult;

    /// Check whether the record passes this filter.
    ///
    /// Default to [`Filter::enabled`] on the record's level.
    fn matches(&self, record: &Record) -> FilterResult {
        self.enabled(record.level())
    }
}

impl<T: Filter> From<T> for Box<dyn Filter> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
