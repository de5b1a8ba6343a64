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

//! Append messages to a named, size-rotated log file.
//!
//! Messages are taken from the arguments, or read line by line from standard input when none are
//! given.

use std::io;
use std::io::BufRead;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use fast_logger::Level;
use fast_logger::LoggerConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Append messages to a size-rotated log file", long_about = None)]
struct Args {
    /// Logger name, also the stem of the log file
    #[arg(short, long, default_value = "fast-logger")]
    name: String,

    /// Minimum severity written by the logger
    #[arg(short, long, default_value = "info")]
    level: String,

    /// Severity of the messages
    #[arg(short, long, default_value = "info")]
    severity: Level,

    /// Directory containing the log folder, defaults to the current directory
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Folder holding the log files
    #[arg(long, default_value = "logs")]
    log_folder: PathBuf,

    /// Size in MiB after which the log file rolls over
    #[arg(long, default_value = "50")]
    max_file_size_mb: NonZeroUsize,

    /// Number of rolled-over files to keep
    #[arg(long, default_value_t = 3)]
    backup_count: usize,

    /// Message template
    #[arg(long)]
    format: Option<String>,

    /// Do not mirror messages to standard output
    #[arg(long)]
    no_console: bool,

    /// Messages to log
    messages: Vec<String>,
}

impl Args {
    fn config(&self) -> LoggerConfig {
        let mut config = LoggerConfig::new(self.name.as_str())
            .level(self.level.as_str())
            .log_folder(&self.log_folder)
            .max_file_size_mb(self.max_file_size_mb)
            .backup_count(self.backup_count)
            .console_output(!self.no_console);
        if let Some(base_path) = &self.base_path {
            config = config.base_path(base_path);
        }
        if let Some(format) = &self.format {
            config = config.log_format(format.as_str());
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logger = fast_logger::setup_logger(&args.config())?;

    if args.messages.is_empty() {
        for line in io::stdin().lock().lines() {
            logger.log_at(args.severity, line?);
        }
    } else {
        for message in &args.messages {
            logger.log_at(args.severity, message);
        }
    }

    logger.flush();
    Ok(())
}
