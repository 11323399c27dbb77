// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Fixed-record binary store
//!
//! One file, no header, `count = file_size / width` records. Appends are
//! buffered in memory up to `buffer_records` records and flushed before any
//! read, so readers always observe every appended value.
//!
//! Single writer per file: concurrent access to the same path from several
//! stores is not coordinated.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::record::{Numeric, Record, RecordKind};

/// Records buffered before an append is written through
pub const DEFAULT_BUFFER_RECORDS: usize = 128;

/// Records processed per chunk by elementwise operations
pub const DEFAULT_CHUNK_RECORDS: usize = 131_072;

/// How the backing file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenMode {
    /// File must exist; every mutation fails with [`StoreError::ReadOnly`]
    ReadOnly,
    /// Create or truncate to empty
    Overwrite,
    /// Create if absent, otherwise keep existing records
    Append,
}

/// Buffering parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    pub buffer_records: usize,
    pub chunk_records: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            buffer_records: DEFAULT_BUFFER_RECORDS,
            chunk_records: DEFAULT_CHUNK_RECORDS,
        }
    }
}

/// Elementwise operation applied in place against an external slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ElementOp {
    #[inline]
    fn apply<T: Numeric>(self, lhs: T, rhs: T) -> Option<T> {
        match self {
            ElementOp::Add => lhs.checked_add(rhs),
            ElementOp::Sub => lhs.checked_sub(rhs),
            ElementOp::Mul => lhs.checked_mul(rhs),
            ElementOp::Div => lhs.checked_div(rhs),
        }
    }
}

/// Append-only, randomly readable sequence of `T` records on disk
#[derive(Debug)]
pub struct RecordStore<T: Record> {
    path: PathBuf,
    mode: OpenMode,
    options: StoreOptions,
    file: File,
    /// Records already on disk
    stored: usize,
    /// Encoded appends not yet written
    pending: Vec<u8>,
    _record: PhantomData<T>,
}

impl<T: Record> RecordStore<T> {
    const WIDTH: usize = T::KIND.width();

    /// Open (or create) a store at `path`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be opened, including a
    /// read-only open of a missing file.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match mode {
            OpenMode::ReadOnly => OpenOptions::new().read(true).open(&path)?,
            OpenMode::Overwrite => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?,
            OpenMode::Append => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?,
        };

        let size = file.metadata()?.len() as usize;
        if size % Self::WIDTH != 0 {
            warn!(
                "[STORE] {} has {} trailing bytes that do not form a whole {} record",
                path.display(),
                size % Self::WIDTH,
                T::KIND
            );
        }
        let stored = size / Self::WIDTH;
        debug!(
            "[STORE] Opened {} ({:?}, {} x {} records)",
            path.display(),
            mode,
            stored,
            T::KIND
        );

        Ok(Self {
            path,
            mode,
            options: StoreOptions {
                buffer_records: options.buffer_records.max(1),
                chunk_records: options.chunk_records.max(1),
            },
            file,
            stored,
            pending: Vec::new(),
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn kind(&self) -> RecordKind {
        T::KIND
    }

    /// Number of records, including buffered appends
    pub fn len(&self) -> usize {
        self.stored + self.pending.len() / Self::WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of all records in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * Self::WIDTH
    }

    /// True if appends are waiting to be written
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(StoreError::ReadOnly(self.path.clone()));
        }
        Ok(())
    }

    /// Append one record at end-of-file
    pub fn append(&mut self, value: T) -> Result<()> {
        self.ensure_writable()?;
        let start = self.pending.len();
        self.pending.resize(start + Self::WIDTH, 0);
        value.encode(&mut self.pending[start..]);
        self.flush_if_full()
    }

    /// Append a slice of records at end-of-file
    pub fn extend(&mut self, values: &[T]) -> Result<()> {
        self.ensure_writable()?;
        let start = self.pending.len();
        self.pending.resize(start + values.len() * Self::WIDTH, 0);
        for (value, slot) in values
            .iter()
            .zip(self.pending[start..].chunks_exact_mut(Self::WIDTH))
        {
            value.encode(slot);
        }
        self.flush_if_full()
    }

    fn flush_if_full(&mut self) -> Result<()> {
        if self.pending.len() >= self.options.buffer_records * Self::WIDTH {
            self.flush()?;
        }
        Ok(())
    }

    /// Write buffered appends to disk
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&self.pending)?;
        self.file.flush()?;
        self.stored += self.pending.len() / Self::WIDTH;
        self.pending.clear();
        Ok(())
    }

    /// Decode the record at `index`
    ///
    /// # Errors
    ///
    /// [`StoreError::Bounds`] if `index >= len()`.
    pub fn read(&mut self, index: usize) -> Result<T> {
        let count = self.len();
        if index >= count {
            return Err(StoreError::Bounds { index, count });
        }
        self.flush()?;
        let mut buf = [0u8; 8];
        let slot = &mut buf[..Self::WIDTH];
        self.file.seek(SeekFrom::Start((index * Self::WIDTH) as u64))?;
        self.file.read_exact(slot)?;
        Ok(T::decode(slot))
    }

    /// Decode the entire sequence into memory
    pub fn materialize(&mut self) -> Result<Vec<T>> {
        self.flush()?;
        let mut bytes = vec![0u8; self.stored * Self::WIDTH];
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_exact(&mut bytes)?;
        Ok(bytes.chunks_exact(Self::WIDTH).map(T::decode).collect())
    }

    fn check_operand_len(&self, actual: usize) -> Result<()> {
        let expected = self.len();
        if expected != actual {
            return Err(StoreError::SizeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Compare against an equal-length slice, stopping at the first differing chunk
    pub fn equals(&mut self, other: &[T]) -> Result<bool> {
        self.check_operand_len(other.len())?;
        self.flush()?;

        let mut buf = vec![0u8; self.options.chunk_records.min(other.len()) * Self::WIDTH];
        self.file.seek(SeekFrom::Start(0))?;
        for operand in other.chunks(self.options.chunk_records) {
            let bytes = &mut buf[..operand.len() * Self::WIDTH];
            self.file.read_exact(bytes)?;
            let same = bytes
                .chunks_exact(Self::WIDTH)
                .zip(operand)
                .all(|(raw, rhs)| T::decode(raw) == *rhs);
            if !same {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<T: Numeric> RecordStore<T> {
    /// Combine every record with the matching element of `other`, in place.
    ///
    /// Reads, combines and writes back one chunk at a time, so memory use is
    /// bounded by `chunk_records` regardless of the record count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Arithmetic`] when a result overflows the record
    /// kind or divides an integer by zero. The failing chunk is not written;
    /// chunks before it keep their combined values.
    pub fn apply(&mut self, op: ElementOp, other: &[T]) -> Result<()> {
        self.ensure_writable()?;
        self.check_operand_len(other.len())?;
        self.flush()?;

        let chunk = self.options.chunk_records;
        let mut buf = vec![0u8; chunk.min(other.len()) * Self::WIDTH];
        for (index, operand) in other.chunks(chunk).enumerate() {
            let offset = (index * chunk * Self::WIDTH) as u64;
            let bytes = &mut buf[..operand.len() * Self::WIDTH];

            self.file.seek(SeekFrom::Start(offset))?;
            self.file.read_exact(bytes)?;
            for (position, (slot, rhs)) in
                bytes.chunks_exact_mut(Self::WIDTH).zip(operand).enumerate()
            {
                let value = op.apply(T::decode(slot), *rhs).ok_or(StoreError::Arithmetic {
                    index: index * chunk + position,
                })?;
                value.encode(slot);
            }
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.write_all(bytes)?;
        }
        self.file.flush()?;
        debug!(
            "[STORE] {:?} applied to {} records of {}",
            op,
            other.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn add(&mut self, other: &[T]) -> Result<()> {
        self.apply(ElementOp::Add, other)
    }

    pub fn sub(&mut self, other: &[T]) -> Result<()> {
        self.apply(ElementOp::Sub, other)
    }

    pub fn mul(&mut self, other: &[T]) -> Result<()> {
        self.apply(ElementOp::Mul, other)
    }

    pub fn div(&mut self, other: &[T]) -> Result<()> {
        self.apply(ElementOp::Div, other)
    }
}

impl<T: Record> Drop for RecordStore<T> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("[STORE] Failed to flush {} on close: {}", self.path.display(), e);
        }
    }
}

/// What a store looks like inside a snapshot: enough to reopen it.
#[derive(Serialize, Deserialize)]
struct StoreDescriptor {
    path: PathBuf,
    kind: RecordKind,
    read_only: bool,
    options: StoreOptions,
}

/// A store serializes as its descriptor. Buffered appends must be flushed first.
impl<T: Record> Serialize for RecordStore<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_dirty() {
            return Err(S::Error::custom(format!(
                "store {} has unflushed records",
                self.path.display()
            )));
        }
        StoreDescriptor {
            path: self.path.clone(),
            kind: T::KIND,
            read_only: self.mode == OpenMode::ReadOnly,
            options: self.options,
        }
        .serialize(serializer)
    }
}

/// Deserializing reopens the file, in append mode unless it was read-only.
impl<'de, T: Record> Deserialize<'de> for RecordStore<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let descriptor = StoreDescriptor::deserialize(deserializer)?;
        if descriptor.kind != T::KIND {
            return Err(D::Error::custom(StoreError::KindMismatch {
                expected: T::KIND.to_string(),
                found: descriptor.kind.to_string(),
            }));
        }
        let mode = if descriptor.read_only {
            OpenMode::ReadOnly
        } else {
            OpenMode::Append
        };
        RecordStore::open(&descriptor.path, mode, descriptor.options).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_chunks() -> StoreOptions {
        StoreOptions {
            buffer_records: 4,
            chunk_records: 2,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempdir().unwrap();
        let mut store =
            RecordStore::<f32>::open(dir.path().join("a"), OpenMode::Overwrite, small_chunks())
                .unwrap();

        store.append(1.5).unwrap();
        store.extend(&[2.5, 3.5]).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.read(1).unwrap(), 2.5);
        assert_eq!(store.materialize().unwrap(), vec![1.5, 2.5, 3.5]);
        assert!(matches!(
            store.read(3),
            Err(StoreError::Bounds { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_buffer_flushes_at_capacity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("buffered");
        let mut store = RecordStore::<u16>::open(&path, OpenMode::Overwrite, small_chunks()).unwrap();

        store.extend(&[1, 2, 3]).unwrap();
        assert!(store.is_dirty());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

        store.append(4).unwrap();
        assert!(!store.is_dirty());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8);
    }

    #[test]
    fn test_append_mode_preserves_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b");
        {
            let mut store = RecordStore::<i64>::open(&path, OpenMode::Overwrite, small_chunks()).unwrap();
            store.extend(&[-1, -2]).unwrap();
        }
        let mut store = RecordStore::<i64>::open(&path, OpenMode::Append, small_chunks()).unwrap();
        assert_eq!(store.len(), 2);
        store.append(-3).unwrap();
        assert_eq!(store.materialize().unwrap(), vec![-1, -2, -3]);

        let mut store = RecordStore::<i64>::open(&path, OpenMode::Overwrite, small_chunks()).unwrap();
        assert!(store.is_empty());
        assert!(store.materialize().unwrap().is_empty());
    }

    #[test]
    fn test_read_only_rejects_writes_and_missing_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            RecordStore::<f64>::open(&missing, OpenMode::ReadOnly, StoreOptions::default()),
            Err(StoreError::Io(_))
        ));

        let path = dir.path().join("c");
        RecordStore::<f64>::open(&path, OpenMode::Overwrite, StoreOptions::default())
            .unwrap()
            .extend(&[1.0, 2.0])
            .unwrap();

        let mut store = RecordStore::<f64>::open(&path, OpenMode::ReadOnly, StoreOptions::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(matches!(store.append(3.0), Err(StoreError::ReadOnly(_))));
        assert!(matches!(store.add(&[1.0, 1.0]), Err(StoreError::ReadOnly(_))));
        assert_eq!(store.materialize().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_elementwise_ops_cross_chunk_boundaries() {
        let dir = tempdir().unwrap();
        let mut store =
            RecordStore::<f64>::open(dir.path().join("d"), OpenMode::Overwrite, small_chunks())
                .unwrap();
        store.extend(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        store.add(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert_eq!(store.materialize().unwrap(), vec![11.0, 22.0, 33.0, 44.0, 55.0]);

        store.sub(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        store.mul(&[2.0; 5]).unwrap();
        store.div(&[4.0; 5]).unwrap();
        assert_eq!(store.materialize().unwrap(), vec![5.0, 10.0, 15.0, 20.0, 25.0]);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_integer_overflow_and_zero_division_are_errors() {
        let dir = tempdir().unwrap();
        let mut bytes =
            RecordStore::<u8>::open(dir.path().join("u8"), OpenMode::Overwrite, small_chunks())
                .unwrap();
        bytes.extend(&[200, 1]).unwrap();
        assert!(matches!(
            bytes.add(&[100, 1]),
            Err(StoreError::Arithmetic { index: 0 })
        ));
        assert_eq!(bytes.materialize().unwrap(), vec![200, 1]);

        let mut ints =
            RecordStore::<i32>::open(dir.path().join("i32"), OpenMode::Overwrite, small_chunks())
                .unwrap();
        ints.extend(&[4, 8, 12]).unwrap();
        assert!(matches!(
            ints.div(&[2, 0, 3]),
            Err(StoreError::Arithmetic { index: 1 })
        ));
        // the failing chunk is left untouched
        assert_eq!(ints.materialize().unwrap(), vec![4, 8, 12]);

        // a later chunk fails after the first one was written
        assert!(matches!(
            ints.sub(&[1, 1, i32::MIN]),
            Err(StoreError::Arithmetic { index: 2 })
        ));
        assert_eq!(ints.materialize().unwrap(), vec![3, 7, 12]);
    }

    #[test]
    fn test_size_mismatch() {
        let dir = tempdir().unwrap();
        let mut store =
            RecordStore::<i32>::open(dir.path().join("e"), OpenMode::Overwrite, small_chunks())
                .unwrap();
        store.extend(&[1, 2, 3]).unwrap();

        assert!(matches!(
            store.add(&[1, 2]),
            Err(StoreError::SizeMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            store.equals(&[1, 2, 3, 4]),
            Err(StoreError::SizeMismatch { expected: 3, actual: 4 })
        ));
    }

    #[test]
    fn test_equals() {
        let dir = tempdir().unwrap();
        let mut store =
            RecordStore::<u8>::open(dir.path().join("f"), OpenMode::Overwrite, small_chunks())
                .unwrap();
        store.extend(&[1, 2, 3, 4, 5]).unwrap();

        assert!(store.equals(&[1, 2, 3, 4, 5]).unwrap());
        assert!(!store.equals(&[1, 2, 3, 4, 6]).unwrap());
        assert!(!store.equals(&[0, 2, 3, 4, 5]).unwrap());
        // comparison must not modify the records
        assert_eq!(store.materialize().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_snapshot_reopens_in_append_mode() {
        let dir = tempdir().unwrap();
        let mut store =
            RecordStore::<f64>::open(dir.path().join("g"), OpenMode::Overwrite, small_chunks())
                .unwrap();
        store.extend(&[1.0, 2.0]).unwrap();
        assert!(bincode::serialize(&store).is_err());
        store.flush().unwrap();

        let bytes = bincode::serialize(&store).unwrap();
        let mut restored: RecordStore<f64> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.mode(), OpenMode::Append);
        restored.append(3.0).unwrap();
        assert_eq!(restored.materialize().unwrap(), vec![1.0, 2.0, 3.0]);

        let wrong_kind: std::result::Result<RecordStore<u8>, _> = bincode::deserialize(&bytes);
        assert!(wrong_kind.is_err());
    }
}
