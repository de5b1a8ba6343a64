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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use crate::Error;
use crate::Trap;
use crate::trap::DefaultTrap;

/// A writer that rolls its file over to numbered backups once it grows past a size limit.
///
/// The active file is `basedir/filename`. On rollover it becomes `filename.1`, an existing
/// `filename.1` becomes `filename.2` and so on; backups beyond the configured count are deleted.
#[derive(Debug)]
pub struct RollingFileWriter {
    state: State,
    writer: File,
}

impl RollingFileWriter {
    /// Return the path of the active log file.
    pub fn path(&self) -> &Path {
        &self.state.current_filepath
    }
}

impl Drop for RollingFileWriter {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            let err = Error::emission("failed to flush file writer on dropped").with_source(err);
            self.state.trap.trap(&err);
        }
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.state.should_rollover(buf.len()) {
            self.state.current_filesize = 0;
            self.state.refresh_writer(&mut self.writer);
        }

        self.writer
            .write(buf)
            .inspect(|&n| self.state.current_filesize += n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A builder for configuring [`RollingFileWriter`].
#[derive(Debug)]
pub struct RollingFileWriterBuilder {
    // required
    basedir: PathBuf,
    filename: String,

    // has default
    max_size: Option<NonZeroUsize>,
    max_backups: usize,
    trap: Box<dyn Trap>,
}

impl RollingFileWriterBuilder {
    /// Creates a new [`RollingFileWriterBuilder`].
    #[must_use]
    pub fn new(basedir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            filename: filename.into(),
            max_size: None,
            max_backups: 0,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the trap for the rolling file writer.
    #[must_use]
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the size in bytes that the active file must not grow past.
    #[must_use]
    pub fn max_file_size(mut self, n: NonZeroUsize) -> Self {
        self.max_size = Some(n);
        self
    }

    /// Set the number of backups to keep.
    ///
    /// Zero disables rollover: the active file grows without limit.
    #[must_use]
    pub fn max_backups(mut self, n: usize) -> Self {
        self.max_backups = n;
        self
    }

    /// Builds the [`RollingFileWriter`].
    ///
    /// An existing active file is appended to, and its size counts toward the limit.
    pub fn build(self) -> Result<RollingFileWriter, Error> {
        let Self {
            basedir,
            filename,
            max_size,
            max_backups,
            trap,
        } = self;

        if filename.is_empty() {
            return Err(Error::config("filename must not be empty"));
        }

        let (state, writer) = State::new(basedir, filename, max_size, max_backups, trap)?;
        Ok(RollingFileWriter { state, writer })
    }
}

#[derive(Debug)]
struct Backup {
    filepath: PathBuf,
    index: usize,
}

#[derive(Debug)]
struct State {
    log_dir: PathBuf,
    log_filename: String,
    current_filepath: PathBuf,
    current_filesize: usize,
    max_size: Option<NonZeroUsize>,
    max_backups: usize,
    trap: Box<dyn Trap>,
}

impl State {
    fn new(
        dir: impl AsRef<Path>,
        log_filename: String,
        max_size: Option<NonZeroUsize>,
        max_backups: usize,
        trap: Box<dyn Trap>,
    ) -> Result<(Self, File), Error> {
        let log_dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir).map_err(|err| {
            Error::filesystem("failed to create log directory")
                .with_context("path", log_dir.display())
                .with_source(err)
        })?;

        let current_filepath = log_dir.join(&log_filename);
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&current_filepath)
            .map_err(|err| {
                Error::filesystem("failed to open log file")
                    .with_context("path", current_filepath.display())
                    .with_source(err)
            })?;

        // continue to use the existing current log file
        let current_filesize = file
            .metadata()
            .map(|metadata| metadata.len() as usize)
            .unwrap_or_default();

        let state = State {
            log_dir,
            log_filename,
            current_filepath,
            current_filesize,
            max_size,
            max_backups,
            trap,
        };

        Ok((state, file))
    }

    fn backup_filepath(&self, index: usize) -> PathBuf {
        self.log_dir.join(format!("{}.{index}", self.log_filename))
    }

    fn list_backups(&self) -> Result<Vec<Backup>, Error> {
        let read_dir = fs::read_dir(&self.log_dir).map_err(|err| {
            Error::filesystem("failed to read log dir")
                .with_context("path", self.log_dir.display())
                .with_source(err)
        })?;

        let backups = read_dir
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let filepath = entry.path();

                // the appender only creates files, not directories or symlinks
                if !entry.metadata().ok()?.is_file() {
                    return None;
                }

                let filename = entry.file_name();
                // if the filename is not a UTF-8 string, skip it.
                let filename = filename.to_str()?;
                let index = filename
                    .strip_prefix(self.log_filename.as_str())?
                    .strip_prefix('.')?;
                let index = usize::from_str(index).ok().filter(|&n| n > 0)?;

                Some(Backup { filepath, index })
            })
            .collect::<Vec<_>>();

        Ok(backups)
    }

    fn rotate_log_writer(&self) -> Result<File, Error> {
        let mut backups = self.list_backups().unwrap_or_else(|err| {
            self.trap.trap(&err);
            vec![]
        });

        // shift existing backups up by one from the highest index down, so every move targets a
        // free slot; backups at or past the limit fall off the end
        backups.sort_unstable_by(|a, b| b.index.cmp(&a.index));
        for backup in backups {
            if backup.index >= self.max_backups {
                if let Err(err) = remove_file(&backup.filepath) {
                    self.trap.trap(&err);
                }
            } else {
                move_file(&backup.filepath, &self.backup_filepath(backup.index + 1))?;
            }
        }

        move_file(&self.current_filepath, &self.backup_filepath(1))?;

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.current_filepath)
            .map_err(|err| {
                Error::filesystem("failed to create log file")
                    .with_context("path", self.current_filepath.display())
                    .with_source(err)
            })
    }

    fn refresh_writer(&self, file: &mut File) {
        match self.rotate_log_writer() {
            Ok(new_file) => {
                if let Err(err) = file.flush() {
                    let err = Error::emission("failed to flush previous writer").with_source(err);
                    self.trap.trap(&err);
                }
                *file = new_file;
            }
            Err(err) => {
                let err = Error::emission("failed to rotate log writer").with_source(err);
                self.trap.trap(&err);
            }
        }
    }

    fn should_rollover(&self, incoming: usize) -> bool {
        // an empty file always takes the record, however large
        self.max_backups > 0
            && self.current_filesize > 0
            && self
                .max_size
                .is_some_and(|n| self.current_filesize + incoming > n.get())
    }
}

fn remove_file(path: &Path) -> Result<(), Error> {
    fs::remove_file(path).map_err(|err| {
        Error::filesystem("failed to remove old log")
            .with_context("path", path.display())
            .with_source(err)
    })
}

// `fs::rename` does not replace an existing target on every platform
fn move_file(from: &Path, to: &Path) -> Result<(), Error> {
    if fs::exists(to).is_ok_and(|ok| ok) {
        remove_file(to)?;
    }
    fs::rename(from, to).map_err(|err| {
        Error::filesystem("failed to rotate log")
            .with_context("from", from.display())
            .with_context("to", to.display())
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use std::cmp::min;
    use std::fs;
    use std::io::Write;
    use std::num::NonZeroUsize;

    use rand::Rng;
    use rand::distr::Alphanumeric;
    use tempfile::TempDir;

    use crate::append::file::rolling::RollingFileWriterBuilder;
    use crate::error::ErrorKind;

    fn count_files(dir: &TempDir) -> usize {
        fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_file_rolling_via_file_size() {
        test_file_rolling_for_specific_backups(1);
        test_file_rolling_for_specific_backups(2);
        test_file_rolling_for_specific_backups(3);
        test_file_rolling_for_specific_backups(10);
    }

    fn test_file_rolling_for_specific_backups(max_backups: usize) {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "app.log")
            .max_file_size(NonZeroUsize::new(100).unwrap())
            .max_backups(max_backups)
            .build()
            .unwrap();

        // two lines fit in a file, the third one rolls it over
        let line = [b'x'; 40];
        for k in 1..=(max_backups + 2) * 2 {
            writer.write_all(&line).unwrap();
            writer.flush().unwrap();

            let rotations = (k - 1) / 2;
            let expected_size = if k % 2 == 1 { 40 } else { 80 };
            assert_eq!(writer.state.current_filesize, expected_size);
            assert_eq!(fs::metadata(writer.path()).unwrap().len(), expected_size as u64);
            assert_eq!(count_files(&temp_dir), 1 + min(rotations, max_backups));
        }

        for i in 1..=max_backups {
            let backup = temp_dir.path().join(format!("app.log.{i}"));
            assert_eq!(fs::metadata(backup).unwrap().len(), 80);
        }
        assert!(!temp_dir
            .path()
            .join(format!("app.log.{}", max_backups + 1))
            .exists());
    }

    #[test]
    fn test_file_rolling_with_random_payloads() {
        let max_size = 1000;
        let max_backups = 3;
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "random.log")
            .max_file_size(NonZeroUsize::new(max_size).unwrap())
            .max_backups(max_backups)
            .build()
            .unwrap();

        for _ in 0..500 {
            let rand_str = generate_random_string();
            assert_eq!(writer.write(rand_str.as_bytes()).unwrap(), rand_str.len());
            assert!(writer.state.current_filesize <= max_size);
        }
        writer.flush().unwrap();

        assert_eq!(count_files(&temp_dir), max_backups + 1);
        for entry in fs::read_dir(temp_dir.path()).unwrap() {
            let entry = entry.unwrap();
            assert!(entry.metadata().unwrap().len() <= max_size as u64);
        }
    }

    #[test]
    fn test_newest_backup_has_lowest_index() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "order.log")
            .max_file_size(NonZeroUsize::new(10).unwrap())
            .max_backups(2)
            .build()
            .unwrap();

        for k in 0..4 {
            writer.write_all(format!("entry-{k:03}\n").as_bytes()).unwrap();
        }
        writer.flush().unwrap();

        let read = |name: &str| fs::read_to_string(temp_dir.path().join(name)).unwrap();
        assert_eq!(read("order.log"), "entry-003\n");
        assert_eq!(read("order.log.1"), "entry-002\n");
        assert_eq!(read("order.log.2"), "entry-001\n");
        assert_eq!(count_files(&temp_dir), 3);
    }

    #[test]
    fn test_resume_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let filepath = temp_dir.path().join("resume.log");
        fs::write(&filepath, [b'a'; 90]).unwrap();

        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "resume.log")
            .max_file_size(NonZeroUsize::new(100).unwrap())
            .max_backups(1)
            .build()
            .unwrap();
        assert_eq!(writer.state.current_filesize, 90);

        writer.write_all(&[b'b'; 5]).unwrap();
        assert_eq!(writer.state.current_filesize, 95);
        writer.write_all(&[b'c'; 20]).unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::metadata(temp_dir.path().join("resume.log.1")).unwrap().len(), 95);
        assert_eq!(fs::read(&filepath).unwrap(), vec![b'c'; 20]);
    }

    #[test]
    fn test_zero_backups_never_rolls_over() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "grow.log")
            .max_file_size(NonZeroUsize::new(10).unwrap())
            .max_backups(0)
            .build()
            .unwrap();

        for _ in 0..10 {
            writer.write_all(b"0123456789").unwrap();
        }
        writer.flush().unwrap();

        assert_eq!(count_files(&temp_dir), 1);
        assert_eq!(writer.state.current_filesize, 100);
    }

    #[test]
    fn test_oversized_record_into_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "big.log")
            .max_file_size(NonZeroUsize::new(10).unwrap())
            .max_backups(2)
            .build()
            .unwrap();

        writer.write_all(&[b'z'; 64]).unwrap();
        assert_eq!(count_files(&temp_dir), 1);

        writer.write_all(b"next").unwrap();
        writer.flush().unwrap();
        assert_eq!(count_files(&temp_dir), 2);
        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "next");
    }

    #[test]
    fn test_stale_backups_are_removed() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("stale.log"), b"0123456789").unwrap();
        fs::write(temp_dir.path().join("stale.log.5"), b"old").unwrap();
        fs::write(temp_dir.path().join("stale.log.bak"), b"unrelated").unwrap();

        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "stale.log")
            .max_file_size(NonZeroUsize::new(10).unwrap())
            .max_backups(2)
            .build()
            .unwrap();
        writer.write_all(b"fresh").unwrap();
        writer.flush().unwrap();

        assert!(!temp_dir.path().join("stale.log.5").exists());
        assert!(temp_dir.path().join("stale.log.1").exists());
        assert!(temp_dir.path().join("stale.log.bak").exists());
    }

    #[test]
    fn test_rollover_with_huge_backup_count() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "huge.log")
            .max_file_size(NonZeroUsize::new(10).unwrap())
            .max_backups(usize::MAX)
            .build()
            .unwrap();

        let start = std::time::Instant::now();
        for k in 0..5 {
            writer.write_all(format!("entry-{k:03}\n").as_bytes()).unwrap();
        }
        writer.flush().unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(5));

        assert_eq!(count_files(&temp_dir), 5);
        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "entry-004\n");
        for (index, k) in [(1, 3), (2, 2), (3, 1), (4, 0)] {
            let backup = temp_dir.path().join(format!("huge.log.{index}"));
            assert_eq!(
                fs::read_to_string(backup).unwrap(),
                format!("entry-{k:03}\n")
            );
        }
    }

    #[test]
    fn test_backups_with_gaps_shift_up() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("gaps.log"), b"current").unwrap();
        fs::write(temp_dir.path().join("gaps.log.1"), b"one").unwrap();
        fs::write(temp_dir.path().join("gaps.log.3"), b"three").unwrap();

        let mut writer = RollingFileWriterBuilder::new(temp_dir.path(), "gaps.log")
            .max_file_size(NonZeroUsize::new(10).unwrap())
            .max_backups(3)
            .build()
            .unwrap();
        writer.write_all(b"fresh").unwrap();
        writer.flush().unwrap();

        let read = |name: &str| fs::read_to_string(temp_dir.path().join(name)).unwrap();
        assert_eq!(read("gaps.log"), "fresh");
        assert_eq!(read("gaps.log.1"), "current");
        assert_eq!(read("gaps.log.2"), "one");
        assert!(!temp_dir.path().join("gaps.log.3").exists());
        assert!(!temp_dir.path().join("gaps.log.4").exists());
    }

    #[test]
    fn test_build_errors() {
        let temp_dir = TempDir::new().unwrap();

        let err = RollingFileWriterBuilder::new(temp_dir.path(), "")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        // a regular file where the log directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let err = RollingFileWriterBuilder::new(blocker.join("logs"), "app.log")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }

    fn generate_random_string() -> String {
        let mut rng = rand::rng();
        let len = rng.random_range(50..=100);
        let random_string: String = std::iter::repeat(())
            .map(|()| rng.sample(Alphanumeric))
            .map(char::from)
            .take(len)
            .collect();

        random_string
    }
}
