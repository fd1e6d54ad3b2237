//! Sources of raw unit content

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::app::models::UnitKey;
use crate::constants::ARCHIVE_EXTENSION;
use crate::error::Result;

/// Yields the raw bytes of a unit's data file
pub trait FileProvider {
    /// `Ok(None)` when the source has no file for this unit
    fn fetch(&self, unit: &UnitKey) -> Result<Option<Box<dyn Read + '_>>>;
}

/// Extracted files laid out as `<root>/<county>_<year>_<table>/<county><year><table>.txt`
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, unit: &UnitKey) -> PathBuf {
        self.root.join(unit.stem()).join(unit.member_name())
    }
}

impl FileProvider for DirectoryProvider {
    fn fetch(&self, unit: &UnitKey) -> Result<Option<Box<dyn Read + '_>>> {
        let path = self.path_for(unit);
        match File::open(&path) {
            Ok(file) => {
                debug!("Opened {}", path.display());
                Ok(Some(Box::new(file)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Downloaded archives laid out as `<dir>/<county>_<year>_<table>.zip`
///
/// The data file is read straight out of the archive, no extraction step.
#[derive(Debug, Clone)]
pub struct ArchiveProvider {
    dir: PathBuf,
}

impl ArchiveProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn archive_path(&self, unit: &UnitKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", unit.stem(), ARCHIVE_EXTENSION))
    }
}

impl FileProvider for ArchiveProvider {
    fn fetch(&self, unit: &UnitKey) -> Result<Option<Box<dyn Read + '_>>> {
        let path = self.archive_path(unit);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut archive = ZipArchive::new(file)?;
        let mut entry = match archive.by_name(&unit.member_name()) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                debug!(
                    "{} has no member {}",
                    path.display(),
                    unit.member_name()
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        Ok(Some(Box::new(Cursor::new(content))))
    }
}
