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

use crate::Append;
use crate::Filter;
use crate::Level;
use crate::Logger;
use crate::Trap;
use crate::logger::log_impl::Dispatch;
use crate::trap::DefaultTrap;

/// Create a new empty [`LoggerBuilder`] for the logger named `name`.
///
/// Most applications get their loggers from a [`Registry`](crate::Registry), which wires the
/// file and console appenders from a [`LoggerConfig`](crate::LoggerConfig). The builder is the
/// escape hatch for assembling a logger from arbitrary appenders.
///
/// # Examples
///
/// ```
/// use fast_logger::Level;
/// use fast_logger::append;
///
/// let logger = fast_logger::builder("app")
///     .level(Level::Debug)
///     .dispatch(|d| d.filter(Level::Warning).append(append::Stdout::default()))
///     .build();
/// logger.warning("disk almost full");
/// ```
pub fn builder(name: impl Into<String>) -> LoggerBuilder {
    LoggerBuilder {
        name: name.into(),
        level: Level::Info,
        dispatches: vec![],
        trap: Box::new(DefaultTrap::default()),
    }
}

/// A builder for configuring log dispatching of one named [`Logger`].
#[must_use = "call `build` to construct a logger instance"]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    level: Level,
    // stashed dispatches
    dispatches: Vec<Dispatch>,
    trap: Box<dyn Trap>,
}

impl LoggerBuilder {
    /// Set the minimum severity of the logger.
    ///
    /// Default to [`Level::Info`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the trap for errors raised by appenders.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Register a new dispatch with the [`LoggerBuilder`].
    pub fn dispatch<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DispatchBuilder<false>) -> DispatchBuilder<true>,
    {
        self.dispatches.push(f(DispatchBuilder::new()).build());
        self
    }

    /// Build the [`Logger`].
    pub fn build(self) -> Logger {
        Logger::new(self.name, self.level, self.dispatches, self.trap)
    }
}

/// A builder for configuring a log dispatch, including filters and appenders.
///
/// # Examples
///
/// ```
/// use fast_logger::Level;
/// use fast_logger::append;
///
/// let logger = fast_logger::builder("app")
///     .dispatch(|d| d.filter(Level::Error).append(append::Stdout::default()))
///     .build();
/// ```
#[derive(Debug)]
pub struct DispatchBuilder<const APPEND: bool> {
    filters: Vec<Box<dyn Filter>>,
    appends: Vec<Box<dyn Append>>,
}

impl DispatchBuilder<false> {
    fn new() -> Self {
        DispatchBuilder {
            filters: vec![],
            appends: vec![],
        }
    }

    /// Add a filter to this dispatch.
    pub fn filter(mut self, filter: impl Into<Box<dyn Filter>>) -> Self {
        self.filters.push(filter.into());
        self
    }
}

impl DispatchBuilder<true> {
    fn build(self) -> Dispatch {
        Dispatch::new(self.filters, self.appends)
    }
}

impl<const APPEND: bool> DispatchBuilder<APPEND> {
    /// Add an appender to this dispatch.
    pub fn append(mut self, append: impl Into<Box<dyn Append>>) -> DispatchBuilder<true> {
        self.appends.push(append.into());
        DispatchBuilder {
            filters: self.filters,
            appends: self.appends,
        }
    }
}
