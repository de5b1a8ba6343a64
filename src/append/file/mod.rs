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

//! Appender for writing log records to a size-rotated file.
//!
//! # Example
//!
//!```
//! use std::num::NonZeroUsize;
//!
//! use fast_logger::append::FileBuilder;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let file = FileBuilder::new(dir.path(), "app.log")
//!     .rollover_size(NonZeroUsize::new(10 * 1024 * 1024).unwrap())
//!     .max_backups(3)
//!     .build()
//!     .unwrap();
//! ```

pub use self::append::File;
pub use self::append::FileBuilder;
pub use self::rolling::RollingFileWriter;
pub use self::rolling::RollingFileWriterBuilder;

mod append;
mod rolling;
