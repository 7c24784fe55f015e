use crate::error::Result;

use std::fs::{self, File};
use std::io::{self, Write, BufWriter};
use std::path::{Path, PathBuf};


/// Something that can be rebuilt from a file on disk. `Ok(None)` means there
/// was nothing to read (no file, or a blank one).
pub trait ReadFile: Sized {
    fn read_file(file_path: &Path) -> Result<Option<Self>>;
}

pub trait SaveFile {
    fn save_file(&self, file_path: &Path) -> Result<()>;
}

pub fn read_input<R: ReadFile>(file_path: &Path) -> Result<Option<R>> {
    R::read_file(file_path)
}

/// Reads the whole file, `None` if it does not exist.
pub fn read_to_string_if_exists(file_path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn temp_path(file_path: &Path) -> PathBuf {
    let mut name = file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    file_path.with_file_name(name)
}

/// Replaces `file_path` with whatever `write` produces. The content goes to a
/// sibling temporary file first and is renamed over the target, so readers
/// only ever see the old or the new file.
pub fn write_atomic<F>(file_path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_path(file_path);
    let written = (|| -> Result<()> {
        let mut f = BufWriter::new(File::create(&tmp)?);
        write(&mut f)?;
        f.flush()?;
        f.get_ref().sync_all()?;
        drop(f);
        fs::rename(&tmp, file_path)?;
        Ok(())
    })();

    if written.is_err() {
        // the target is untouched, only the partial temp file needs to go
        let _ = fs::remove_file(&tmp);
    }
    written
}

pub fn remove_if_exists(file_path: &Path) -> Result<()> {
    match fs::remove_file(file_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
