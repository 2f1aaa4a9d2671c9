//! Rotating file destination.
//!
//! Records are appended to a single active file. When the next line would
//! push it past the size limit, the file is renamed to
//! `<stem>-<timestamp>.<ext>`, optionally gzipped, and a fresh file takes
//! its place. Backups past the age or count limits are deleted after each
//! rollover.

use crate::config::RotationConfig;
use crate::sink::LogSink;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use flate2::write::GzEncoder;
use flate2::Compression;
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// UTC timestamp embedded in backup names
const BACKUP_STAMP: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Limits applied by a [`RotatingFile`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub max_age: Option<Duration>,
    pub max_backups: Option<usize>,
    pub compress: bool,
}

impl From<&RotationConfig> for RotationPolicy {
    fn from(config: &RotationConfig) -> Self {
        let max_size_mb = match config.max_size_mb {
            0 => DEFAULT_MAX_SIZE_MB,
            mb => mb,
        };

        Self {
            max_bytes: max_size_mb.saturating_mul(MEGABYTE),
            max_age: (config.max_age_days > 0)
                .then(|| Duration::from_secs(DAY.as_secs().saturating_mul(config.max_age_days))),
            max_backups: (config.max_backups > 0).then_some(config.max_backups),
            compress: config.compress,
        }
    }
}

/// Open the rotating sink described by `config`
pub fn open_sink(config: &RotationConfig) -> Result<RotatingFile> {
    RotatingFile::open(&config.file_path, RotationPolicy::from(config))
}

/// Size-rotated log file, safe to share between threads
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<FileState>,
}

struct FileState {
    file: Option<File>,
    size: u64,
}

impl RotatingFile {
    /// Open (or create) the active file, creating parent directories
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(Error::destination(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "empty file path"),
            ));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::destination(&path, e))?;
        }

        let file = open_append(&path).map_err(|e| Error::destination(&path, e))?;
        let size = file
            .metadata()
            .map_err(|e| Error::destination(&path, e))?
            .len();

        tracing::debug!("Opened log file {:?} ({} bytes)", path, size);
        Ok(Self {
            path,
            policy,
            state: Mutex::new(FileState {
                file: Some(file),
                size,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Rotated files currently on disk, oldest first
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .backup_files()?
            .into_iter()
            .map(|(path, _)| path)
            .collect())
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// File stem and extension (with its dot) of the active file
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    /// Only names this file produced on rollover: `<stem>-<stamp>[.<n>]<ext>[.gz]`
    fn is_backup_name(&self, name: &str) -> bool {
        let (stem, ext) = self.name_parts();
        let Some(rest) = name.strip_prefix(&format!("{}-", stem)) else {
            return false;
        };
        let rest = rest.strip_suffix(".gz").unwrap_or(rest);
        match rest.strip_suffix(ext.as_str()) {
            Some(stamp) => is_backup_stamp(stamp),
            None => false,
        }
    }

    fn backup_files(&self) -> io::Result<Vec<(PathBuf, SystemTime)>> {
        let mut backups = Vec::new();

        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            let path = entry.path();
            let is_backup = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| self.is_backup_name(n));
            if !is_backup || path == self.path {
                continue;
            }

            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                backups.push((path, modified));
            }
        }

        backups.sort_by(|(a_path, a_time), (b_path, b_time)| {
            a_time.cmp(b_time).then_with(|| a_path.cmp(b_path))
        });
        Ok(backups)
    }

    /// Name for the next backup; never reuses a name already on disk
    fn next_backup_path(&self) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let stamp = chrono::Utc::now().format(BACKUP_STAMP);

        let mut attempt = 0usize;
        loop {
            let name = match attempt {
                0 => format!("{}-{}{}", stem, stamp, ext),
                n => format!("{}-{}.{}{}", stem, stamp, n, ext),
            };
            let candidate = self.dir().join(name);
            if !candidate.exists() && !gz_path(&candidate).exists() {
                return candidate;
            }
            attempt += 1;
        }
    }

    fn rotate(&self, state: &mut FileState) -> io::Result<()> {
        // Close before renaming; some platforms refuse to move open files
        if let Some(mut file) = state.file.take() {
            file.flush()?;
        }

        let backup = self.next_backup_path();
        fs::rename(&self.path, &backup)?;
        state.file = Some(open_append(&self.path)?);
        state.size = 0;
        tracing::info!("Rotated log file {:?} to {:?}", self.path, backup);

        if self.policy.compress {
            if let Err(e) = compress_file(&backup) {
                tracing::warn!("Failed to compress log file {:?}: {}", backup, e);
            }
        }

        if let Err(e) = self.prune() {
            tracing::warn!("Failed to prune old log files next to {:?}: {}", self.path, e);
        }

        Ok(())
    }

    /// Delete backups older than the age limit, then the oldest beyond the count limit
    fn prune(&self) -> io::Result<usize> {
        let mut backups = self.backup_files()?;
        let mut removed = 0;

        if let Some(max_age) = self.policy.max_age {
            let cutoff = SystemTime::now()
                .checked_sub(max_age)
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let (expired, kept): (Vec<_>, Vec<_>) =
                backups.into_iter().partition(|(_, modified)| *modified < cutoff);
            for (path, _) in expired {
                removed += remove_backup(&path);
            }
            backups = kept;
        }

        if let Some(max_backups) = self.policy.max_backups {
            if backups.len() > max_backups {
                let excess = backups.len() - max_backups;
                for (path, _) in backups.iter().take(excess) {
                    removed += remove_backup(path);
                }
            }
        }

        Ok(removed)
    }
}

impl LogSink for RotatingFile {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let len = line.len() as u64 + 1;

        if state.size > 0 && state.size + len > self.policy.max_bytes {
            self.rotate(&mut state)?;
        }

        if state.file.is_none() {
            // a previous rollover failed to reopen; try again
            state.file = Some(open_append(&self.path)?);
            state.size = 0;
        }
        let Some(file) = state.file.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "log file not open"));
        };

        // Exclusive lock keeps records whole when other processes share the file
        FileExt::lock_exclusive(&*file)?;
        let written = write_record(file, line);
        FileExt::unlock(&*file)?;
        written?;

        state.size += len;
        Ok(())
    }
}

fn write_record(file: &mut File, line: &str) -> io::Result<()> {
    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');
    file.write_all(&buf)?;
    file.flush()
}

/// A backup timestamp, optionally followed by a `.<n>` collision counter
fn is_backup_stamp(stamp: &str) -> bool {
    if NaiveDateTime::parse_from_str(stamp, BACKUP_STAMP).is_ok() {
        return true;
    }
    match stamp.rsplit_once('.') {
        Some((head, counter)) if !counter.is_empty() && counter.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveDateTime::parse_from_str(head, BACKUP_STAMP).is_ok()
        }
        _ => false,
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip `path` next to itself and remove the original
fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let gz = gz_path(path);

    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(File::create(&gz)?, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    tracing::debug!("Compressed log file: {:?} -> {:?}", path, gz);
    Ok(gz)
}

fn remove_backup(path: &Path) -> usize {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed old log file: {:?}", path);
            1
        }
        Err(e) => {
            tracing::warn!("Failed to remove old log file {:?}: {}", path, e);
            0
        }
    }
}
