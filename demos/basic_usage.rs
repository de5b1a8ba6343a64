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

//! Basic usage: quick, configured and wrapped loggers, and exception logging.
//!
//! Log files are written to `logs/` under the current directory.

use std::num::NonZeroUsize;

use fast_logger::Level;
use fast_logger::LoggerConfig;

fn main() {
    println!("1. Quick logger:");
    let quick = fast_logger::quick_logger("quick_demo", Level::Info).unwrap();
    quick.info("This is the quickest way to get logging!");
    quick.warning("Easy peasy!");

    println!("\n2. Configured logger with a custom level:");
    let standard =
        fast_logger::setup_logger(&LoggerConfig::new("standard_demo").level("DEBUG")).unwrap();
    standard.debug("Debug message - you can see this!");
    standard.info("Info message");
    standard.error("Error message");

    println!("\n3. FastLogger with custom rotation:");
    let advanced = fast_logger::get_logger(
        &LoggerConfig::new("advanced_demo")
            .level(Level::Info)
            .max_file_size_mb(NonZeroUsize::new(10).unwrap())
            .backup_count(2),
    )
    .unwrap();
    advanced.info("This logger has custom file size limits");
    advanced.warning(format_args!(
        "Files will rotate at {} bytes",
        advanced.config().max_file_size()
    ));

    println!("\n4. Exception logging:");
    let failures = fast_logger::quick_logger("exception_demo", Level::Info).unwrap();
    if let Err(err) = "ten".parse::<u32>() {
        failures.exception("Caught an error!", &err);
    }

    println!("\nCheck the 'logs' folder for all log files!");
}
