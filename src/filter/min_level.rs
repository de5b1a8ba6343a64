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

use crate::Level;
use crate::filter::Filter;
use crate::filter::FilterResult;

/// A [`Level`] used as a filter passes records at that level or more severe.
impl Filter for Level {
    fn enabled(&self, level: Level) -> FilterResult {
        if level >= *self {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn test_min_level() {
        let filter = Level::Warning;
        assert_eq!(filter.enabled(Level::Info), FilterResult::Reject);
        assert_eq!(filter.enabled(Level::Warning), FilterResult::Neutral);
        assert_eq!(filter.enabled(Level::Critical), FilterResult::Neutral);

        let record = Record::builder().level(Level::Debug).build();
        assert_eq!(filter.matches(&record), FilterResult::Reject);
    }
}
