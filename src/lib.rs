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

//! fast-logger configures named loggers that write to a size-rotated log file and mirror to the
//! console, with a conventional line format.
//!
//! # Overview
//!
//! A [`LoggerConfig`] names a logger and sets its options. A [`Registry`] resolves the
//! configuration, creates `<base_path>/<log_folder>/<name>.log` and attaches the file appender
//! and, optionally, a stdout appender. Each name is configured once per registry; asking again
//! returns the logger configured first.
//!
//! The file rolls over before a write would grow it past the maximum size. The active file is
//! renamed to `<name>.log.1`, older backups shift up by one, and backups beyond the retention
//! count are removed.
//!
//! # Examples
//!
//! Quick setup with defaults:
//!
//! ```no_run
//! use fast_logger::Level;
//!
//! let logger = fast_logger::quick_logger("app", Level::Info).unwrap();
//! logger.info("service started");
//! ```
//!
//! Full control over the options:
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use fast_logger::LoggerConfig;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = fast_logger::get_logger(
//!     &LoggerConfig::new("billing")
//!         .level("debug")
//!         .base_path(dir.path())
//!         .log_folder("audit")
//!         .max_file_size_mb(NonZeroUsize::new(10).unwrap())
//!         .backup_count(5)
//!         .log_format("{time} {level} {message}")
//!         .console_output(false),
//! )
//! .unwrap();
//!
//! logger.debug("invoice 42 drafted");
//! logger.warning(format_args!("invoice {} overdue", 41));
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod filter;
pub mod layout;
pub mod record;
pub mod trap;

pub use append::Append;
pub use filter::Filter;
pub use layout::Layout;
pub use trap::Trap;

mod bridge;

mod config;
pub use config::LevelSetting;
pub use config::LoggerConfig;
pub use config::ResolvedConfig;

mod error;
pub use error::Error;
pub use error::ErrorKind;

mod fast_logger;
pub use fast_logger::FastLogger;
pub use fast_logger::get_logger;
pub use fast_logger::quick_logger;
pub use fast_logger::setup_logger;

mod level;
pub use level::Level;

mod logger;
pub use logger::*;

mod registry;
pub use registry::Registry;
