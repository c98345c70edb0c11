//! Unordered heap file of fixed-size record slots.
//!
//! The file is a raw sequence of slots with no header:
//!
//! ```text
//! offset 0                                               end_position
//! | slot 0 | slot 1 | ... | slot n-1 | (stale bytes until close)
//!   key | rest
//! ```
//!
//! - Every slot is `record_size` bytes and starts with its `key_size` key bytes
//! - Lookups scan slots from offset 0 and compare keys
//! - Deletion moves the last slot into the freed one and shrinks the
//!   logical end (delete-by-swap), so insertion order is not preserved
//! - Bytes past the logical end are cut off when the file is closed

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::DbError;

use super::io_utils::classify_io_error;

/// Number of slots read per I/O call while scanning.
const SCAN_BATCH_SLOTS: usize = 64;

/// Single-file heap storage for fixed-size records.
#[derive(Debug)]
pub struct HeapFile {
    /// Path of the backing file
    path: PathBuf,
    /// Open handle, `None` once closed
    file: Option<File>,
    /// Leading bytes of each slot that form its key
    key_size: usize,
    /// Size of each slot in bytes
    record_size: usize,
    /// Logical end of the slot area
    end_position: u64,
}

impl HeapFile {
    /// Opens or creates the heap file at `path`.
    ///
    /// The logical end is recovered from the current file size. A trailing
    /// partial slot is ignored and cut off at close.
    ///
    /// # Arguments
    /// * `path` - Location of the backing file
    /// * `key_size` - Key bytes at the start of each slot
    /// * `record_size` - Slot size in bytes
    pub fn open(
        path: impl Into<PathBuf>,
        key_size: usize,
        record_size: usize,
    ) -> Result<Self, DbError> {
        let path = path.into();
        if record_size == 0 || key_size == 0 || key_size > record_size {
            return Err(DbError::ValidationError(format!(
                "invalid slot layout: key size {}, record size {}",
                key_size, record_size
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                classify_io_error(e, &format!("Failed to open heap file {}", path.display()))
            })?;
        let file_len = file
            .metadata()
            .map_err(|e| classify_io_error(e, "Failed to read heap file metadata"))?
            .len();

        let slot = record_size as u64;
        let end_position = file_len - file_len % slot;
        if end_position != file_len {
            tracing::warn!(
                "Heap file {} has {} trailing bytes that do not form a slot",
                path.display(),
                file_len - end_position
            );
        }

        tracing::debug!(
            "Opened heap file {} ({} slots of {} bytes)",
            path.display(),
            end_position / slot,
            record_size
        );

        Ok(Self {
            path,
            file: Some(file),
            key_size,
            record_size,
            end_position,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Returns the logical end of the slot area in bytes.
    pub fn end_position(&self) -> u64 {
        self.end_position
    }

    /// Returns the number of live slots.
    pub fn len(&self) -> usize {
        (self.end_position / self.record_size as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end_position == 0
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Appends one or more whole slots at the logical end.
    ///
    /// No key uniqueness check happens at this layer.
    ///
    /// # Errors
    /// `DbError::SizeMismatch` unless `data.len()` is a positive multiple of
    /// the record size.
    pub fn push(&mut self, data: &[u8]) -> Result<(), DbError> {
        if data.is_empty() || data.len() % self.record_size != 0 {
            return Err(DbError::SizeMismatch {
                len: data.len(),
                record_size: self.record_size,
            });
        }
        let pos = self.end_position;
        self.write_at(pos, data)?;
        self.end_position += data.len() as u64;
        tracing::debug!(
            "Pushed {} slot(s) to {} at offset {}",
            data.len() / self.record_size,
            self.path.display(),
            pos
        );
        Ok(())
    }

    /// Returns the bytes of the first slot whose key equals `key`.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        Ok(self.find(key)?.map(|(_, slot)| slot))
    }

    /// Returns true when a slot with `key` exists.
    pub fn contains(&mut self, key: &[u8]) -> Result<bool, DbError> {
        Ok(self.find(key)?.is_some())
    }

    /// Removes the slot with `key`, moving the last slot into its place.
    ///
    /// Returns the removed slot's bytes, or `None` when the key is absent.
    pub fn delete(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        let Some((pos, target)) = self.find(key)? else {
            return Ok(None);
        };

        let last_pos = self.end_position - self.record_size as u64;
        if pos != last_pos {
            let mut last = vec![0u8; self.record_size];
            self.read_at(last_pos, &mut last)?;
            self.write_at(pos, &last)?;
        }
        self.end_position = last_pos;

        tracing::debug!(
            "Deleted slot at offset {} from {} ({} slots left)",
            pos,
            self.path.display(),
            self.len()
        );
        Ok(Some(target))
    }

    /// Returns an iterator over every live slot in storage order.
    pub fn scan(&mut self) -> HeapScan<'_> {
        HeapScan {
            heap: self,
            pos: 0,
            batch: Vec::new(),
            batch_pos: 0,
        }
    }

    /// Flushes buffered writes to the operating system.
    pub fn flush(&mut self) -> Result<(), DbError> {
        self.file_mut()?
            .flush()
            .map_err(|e| classify_io_error(e, "Failed to flush heap file"))
    }

    /// Flushes file data to disk.
    pub fn sync(&mut self) -> Result<(), DbError> {
        self.file_mut()?
            .sync_data()
            .map_err(|e| classify_io_error(e, "Failed to sync heap file"))
    }

    /// Flushes and truncates the file to its logical end, then releases it.
    ///
    /// The truncate runs even when the flush fails. Calling `close` again is
    /// a no-op. Failures are returned to the caller and not retried; a flush
    /// failure takes precedence.
    pub fn close(&mut self) -> Result<(), DbError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        let flushed = file
            .flush()
            .map_err(|e| classify_io_error(e, "Failed to flush heap file"));
        let truncated = file.set_len(self.end_position).map_err(|e| {
            classify_io_error(
                e,
                &format!("Failed to truncate heap file {}", self.path.display()),
            )
        });
        self.file = None;
        flushed?;
        truncated?;
        tracing::debug!(
            "Closed heap file {} at {} bytes",
            self.path.display(),
            self.end_position
        );
        Ok(())
    }

    /// Finds the first slot with `key`, returning its offset and bytes.
    fn find(&mut self, key: &[u8]) -> Result<Option<(u64, Vec<u8>)>, DbError> {
        if key.len() != self.key_size {
            return Err(DbError::KeySizeMismatch {
                expected: self.key_size,
                got: key.len(),
            });
        }

        let record_size = self.record_size;
        let mut buf = vec![0u8; record_size * SCAN_BATCH_SLOTS];
        let mut pos = 0u64;
        while pos < self.end_position {
            let chunk = (buf.len() as u64).min(self.end_position - pos) as usize;
            self.read_at(pos, &mut buf[..chunk])?;
            if let Some(i) = buf[..chunk]
                .chunks_exact(record_size)
                .position(|slot| &slot[..self.key_size] == key)
            {
                let start = i * record_size;
                let slot = buf[start..start + record_size].to_vec();
                return Ok(Some((pos + start as u64, slot)));
            }
            pos += chunk as u64;
        }
        Ok(None)
    }

    fn file_mut(&mut self) -> Result<&mut File, DbError> {
        let path = &self.path;
        self.file
            .as_mut()
            .ok_or_else(|| DbError::IoError(format!("heap file {} is closed", path.display())))
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<(), DbError> {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(pos))
            .map_err(|e| classify_io_error(e, "Failed to seek heap file"))?;
        file.read_exact(buf)
            .map_err(|e| classify_io_error(e, "Failed to read heap file"))
    }

    fn write_at(&mut self, pos: u64, data: &[u8]) -> Result<(), DbError> {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(pos))
            .map_err(|e| classify_io_error(e, "Failed to seek heap file"))?;
        file.write_all(data)
            .map_err(|e| classify_io_error(e, "Failed to write heap file"))
    }
}

impl Drop for HeapFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::error!("Failed to close heap file {}: {}", self.path.display(), e);
        }
    }
}

/// Iterator over the live slots of a [`HeapFile`].
///
/// Borrows the heap file mutably, so the slot area cannot change while
/// the scan is in progress.
pub struct HeapScan<'a> {
    heap: &'a mut HeapFile,
    /// Offset of the next unread batch
    pos: u64,
    /// Slots read by the last I/O call
    batch: Vec<u8>,
    /// Offset of the next slot inside `batch`
    batch_pos: usize,
}

impl Iterator for HeapScan<'_> {
    type Item = Result<Vec<u8>, DbError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record_size = self.heap.record_size;
        if self.batch_pos >= self.batch.len() {
            if self.pos >= self.heap.end_position {
                return None;
            }
            let chunk = ((record_size * SCAN_BATCH_SLOTS) as u64)
                .min(self.heap.end_position - self.pos) as usize;
            self.batch.resize(chunk, 0);
            if let Err(e) = self.heap.read_at(self.pos, &mut self.batch) {
                self.pos = self.heap.end_position;
                self.batch.clear();
                return Some(Err(e));
            }
            self.pos += chunk as u64;
            self.batch_pos = 0;
        }
        let start = self.batch_pos;
        self.batch_pos += record_size;
        Some(Ok(self.batch[start..start + record_size].to_vec()))
    }
}
