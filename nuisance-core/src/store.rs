//! Record Store
//!
//! Append-only persistence of [`Report`]s with full-history reads.
//!
//! The CSV store rewrites the whole history on every append: it takes an
//! exclusive advisory lock on `<store>.lock`, reads the current file, adds one
//! row, writes everything to a temporary file in the same directory, syncs it
//! and renames it over the store, then syncs the directory so the rename
//! itself survives a crash. The replacement keeps the store's permissions, so
//! tooling running as other users keeps access. Readers never take the lock;
//! the rename guarantees they see either the old or the new file, never a
//! partial one.
//! Cost grows with history size, which is fine at complaint-desk volumes.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Mode of a store file created from scratch.
#[cfg(unix)]
const NEW_STORE_MODE: u32 = 0o644;

use crate::error::StoreError;
use crate::report::{now, NewReport, Report, CSV_HEADER};

pub trait RecordStore {
    /// Creates the store with its header if absent. Never touches existing data.
    fn initialize(&self) -> Result<(), StoreError>;

    /// Stamps `report` as `Pending` now and durably writes it as the last entry.
    fn append(&self, report: NewReport) -> Result<Report, StoreError>;

    /// Every persisted report, oldest first. Empty if nothing was ever written.
    fn read_all(&self) -> Result<Vec<Report>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn initialize(&self) -> Result<(), StoreError> {
        (**self).initialize()
    }

    fn append(&self, report: NewReport) -> Result<Report, StoreError> {
        (**self).append(report)
    }

    fn read_all(&self) -> Result<Vec<Report>, StoreError> {
        (**self).read_all()
    }
}

/// File-backed store in the CSV layout shared with spreadsheet tooling.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = OsString::from(path.as_os_str());
        lock_name.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn lock_exclusive(&self) -> io::Result<StoreLock> {
        fs::create_dir_all(self.directory())?;
        StoreLock::exclusive(&self.lock_path)
    }

    fn load(&self) -> io::Result<Vec<Report>> {
        match File::open(&self.path) {
            Ok(file) => read_csv(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn replace(&self, reports: &[Report]) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(self.directory())?;
        export_csv(reports, &mut tmp)?;
        tmp.flush()?;
        if let Some(permissions) = self.permissions()? {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        sync_directory(self.directory())
    }

    // Existing store keeps its mode; a new one gets the conventional default
    // instead of the temp file's owner-only mode.
    fn permissions(&self) -> io::Result<Option<Permissions>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.permissions())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(new_store_permissions()),
            Err(e) => Err(e),
        }
    }
}

impl RecordStore for CsvRecordStore {
    fn initialize(&self) -> Result<(), StoreError> {
        let init_err = |source| StoreError::Init {
            path: self.path.clone(),
            source,
        };

        let _lock = self.lock_exclusive().map_err(init_err)?;
        // A zero-length file holds no records, so writing the header alters nothing.
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > 0 => {
                debug!(path = %self.path.display(), "report store already present");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(init_err(e)),
        }
        self.replace(&[]).map_err(init_err)?;
        info!(path = %self.path.display(), "initialised report store");
        Ok(())
    }

    fn append(&self, report: NewReport) -> Result<Report, StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let _lock = self.lock_exclusive().map_err(write_err)?;
        let mut history = self.load().map_err(write_err)?;
        let report = Report::stamp(report, now());
        history.push(report.clone());
        self.replace(&history).map_err(write_err)?;

        debug!(
            path = %self.path.display(),
            records = history.len(),
            issue_type = %report.issue_type,
            "appended report"
        );
        Ok(report)
    }

    fn read_all(&self) -> Result<Vec<Report>, StoreError> {
        self.load().map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Volatile store for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    reports: Mutex<Vec<Report>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn append(&self, report: NewReport) -> Result<Report, StoreError> {
        let report = Report::stamp(report, now());
        self.reports.lock().push(report.clone());
        Ok(report)
    }

    fn read_all(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.reports.lock().clone())
    }
}

/// Writes `reports` with the header row in the persisted layout.
pub fn export_csv<W: Write>(reports: &[Report], writer: W) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for report in reports {
        wtr.serialize(report)?;
    }
    wtr.flush()
}

/// Parses reports from the persisted layout. An empty input yields no reports.
pub fn read_csv<R: io::Read>(reader: R) -> io::Result<Vec<Report>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader)
        .deserialize::<Report>()
        .map(|record| record.map_err(io::Error::from))
        .collect()
}

#[cfg(unix)]
fn new_store_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(NEW_STORE_MODE))
}

#[cfg(not(unix))]
fn new_store_permissions() -> Option<Permissions> {
    None
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Advisory lock held for the lifetime of the guard.
struct StoreLock {
    file: File,
}

impl StoreLock {
    fn exclusive(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
