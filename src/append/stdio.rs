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

use std::io;
use std::io::Write;

use crate::Error;
use crate::Layout;
use crate::append::Append;
use crate::layout::PatternLayout;
use crate::record::Record;

/// An appender that prints log records to stdout.
///
/// # Examples
///
/// ```
/// use fast_logger::append::Stdout;
/// use fast_logger::layout::PatternLayout;
///
/// let stdout = Stdout::default().with_layout(PatternLayout::new("{level}: {message}").unwrap());
/// ```
#[derive(Debug)]
pub struct Stdout {
    layout: Box<dyn Layout>,
}

impl Default for Stdout {
    fn default() -> Self {
        Self {
            layout: Box::new(PatternLayout::default()),
        }
    }
}

impl Stdout {
    /// Set the layout for the [`Stdout`] appender.
    ///
    /// Default to [`PatternLayout`] with its default pattern.
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }
}

impl Stdout {
    fn write_record(&self, writer: &mut impl Write, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');
        writer.write_all(&bytes).map_err(Error::from_io_error)?;
        writer.flush().map_err(Error::from_io_error)?;
        Ok(())
    }
}

impl Append for Stdout {
    fn append(&self, record: &Record) -> Result<(), Error> {
        // one locked write per record, so lines from other threads do not interleave
        self.write_record(&mut io::stdout().lock(), record)
    }

    fn flush(&self) -> Result<(), Error> {
        io::stdout().flush().map_err(Error::from_io_error)
    }
}
