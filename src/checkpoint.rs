use crate::error::{EmbedError, Result};
use crate::files_handling::{self, ReadFile, SaveFile};

use std::io::Write;
use std::path::{Path, PathBuf};

pub const EPOCH_FILE: &str = "epoch_progress.txt";
pub const LINE_FILE: &str = "sentence_progress.txt";


/// Resume point of a training run.
///
/// `line` counts the lines of `epoch` already committed, so it is also the
/// index of the next line to process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub epoch: usize,
    pub line: usize,
}

/// One progress record, stored as plain integer text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Marker(usize);

impl ReadFile for Marker {
    fn read_file(file_path: &Path) -> Result<Option<Self>> {
        let content = match files_handling::read_to_string_if_exists(file_path)? {
            Some(content) => content,
            None => return Ok(None),
        };
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        content
            .parse::<usize>()
            .map(|n| Some(Marker(n)))
            .map_err(|e| EmbedError::malformed(file_path, format!("'{}' is not a line or epoch index: {}", content, e)))
    }
}

impl SaveFile for Marker {
    fn save_file(&self, file_path: &Path) -> Result<()> {
        files_handling::write_atomic(file_path, |f| {
            write!(f, "{}", self.0)?;
            Ok(())
        })
    }
}

/// The two progress records of a run, kept next to the saved vectors.
#[derive(Clone, Debug)]
pub struct ProgressStore {
    epoch_path: PathBuf,
    line_path: PathBuf,
}

impl ProgressStore {

    pub fn in_dir(dir: &Path) -> ProgressStore {
        Self {
            epoch_path: dir.join(EPOCH_FILE),
            line_path: dir.join(LINE_FILE),
        }
    }

    /// Missing records read as 0.
    pub fn load(&self) -> Result<Progress> {
        let epoch = files_handling::read_input::<Marker>(&self.epoch_path)?.map_or(0, |m| m.0);
        let line = files_handling::read_input::<Marker>(&self.line_path)?.map_or(0, |m| m.0);
        Ok(Progress { epoch, line })
    }

    /// Writes the line record, then the epoch record. Each write is atomic
    /// but the pair is not: when both values change (moving into a new
    /// epoch) a crash in between leaves the new line with the old epoch.
    pub fn save(&self, progress: Progress) -> Result<()> {
        Marker(progress.line).save_file(&self.line_path)?;
        Marker(progress.epoch).save_file(&self.epoch_path)
    }

    pub fn clear(&self) -> Result<()> {
        files_handling::remove_if_exists(&self.epoch_path)?;
        files_handling::remove_if_exists(&self.line_path)
    }

    pub fn exists(&self) -> bool {
        self.epoch_path.exists() || self.line_path.exists()
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use std::fs;

    #[test]
    fn defaults_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), Progress::default());
        assert!(!store.exists());
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());

        store.save(Progress { epoch: 3, line: 17 }).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join(EPOCH_FILE)).unwrap(), "3");
        assert_eq!(fs::read_to_string(dir.path().join(LINE_FILE)).unwrap(), "17");
        assert_eq!(store.load().unwrap(), Progress { epoch: 3, line: 17 });

        store.clear().unwrap();
        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), Progress::default());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn records_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LINE_FILE), "5\n").unwrap();
        let store = ProgressStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), Progress { epoch: 0, line: 5 });
    }

    #[test]
    fn line_record_is_written_before_epoch_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        store.save(Progress { epoch: 0, line: 3 }).unwrap();

        // a directory in place of the epoch record makes its rename fail
        fs::remove_file(dir.path().join(EPOCH_FILE)).unwrap();
        fs::create_dir(dir.path().join(EPOCH_FILE)).unwrap();
        fs::write(dir.path().join(EPOCH_FILE).join("keep"), "").unwrap();

        assert!(store.save(Progress { epoch: 1, line: 1 }).is_err());
        assert_eq!(fs::read_to_string(dir.path().join(LINE_FILE)).unwrap(), "1");
        assert!(!dir.path().join(format!("{}.tmp", EPOCH_FILE)).exists());
    }

    #[test]
    fn garbage_record_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(EPOCH_FILE), "two").unwrap();
        let store = ProgressStore::in_dir(dir.path());
        assert!(matches!(store.load(), Err(EmbedError::MalformedState { .. })));
    }
}
