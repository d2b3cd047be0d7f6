//! Common utilities for tests
#![allow(unused)]

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pion::*;

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($($arg)*), crate::common::RESET)
    };
}

/// A memory-backed block device. Cloning shares the backing store, so one
/// "disk" can be formatted through one handle and mounted through another.
#[derive(Debug, Clone)]
pub struct RamDisk {
    inner: Arc<Mutex<Vec<u8>>>,
    num_blocks: usize,
}

impl RamDisk {
    /// Creates a new RamDisk with the specified number of blocks.
    /// Each block is BLOCK_SIZE bytes.
    pub fn new(num_blocks: usize) -> Self {
        let size = num_blocks * BLOCK_SIZE;
        let inner = Arc::new(Mutex::new(vec![0u8; size]));
        RamDisk { inner, num_blocks }
    }

    /// Raw copy of one block, for white-box assertions.
    pub fn raw_block(&self, block_id: usize) -> Vec<u8> {
        let data = self.inner.lock().unwrap();
        data[block_id * BLOCK_SIZE..(block_id + 1) * BLOCK_SIZE].to_vec()
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_blocks(&self, start_block: usize, count: usize, buf: &mut [u8]) -> Result<()> {
        if start_block + count > self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        let start = start_block * BLOCK_SIZE;
        let end = start + count * BLOCK_SIZE;
        let data = self.inner.lock().unwrap();
        buf[..count * BLOCK_SIZE].copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_blocks(&self, start_block: usize, count: usize, buf: &[u8]) -> Result<()> {
        if start_block + count > self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        let start = start_block * BLOCK_SIZE;
        let end = start + count * BLOCK_SIZE;
        let mut data = self.inner.lock().unwrap();
        data[start..end].copy_from_slice(&buf[..count * BLOCK_SIZE]);
        Ok(())
    }
}

/// A file-backed block device, the moral equivalent of a disk emulator:
/// `create` makes a fresh zero-filled backing image, `open` attaches to an
/// existing one.
pub struct FileDisk {
    inner: Mutex<std::fs::File>,
    num_blocks: usize,
}

impl FileDisk {
    pub fn create(path: &Path, num_blocks: usize) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len((num_blocks * BLOCK_SIZE) as u64)?;
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks,
        })
    }

    pub fn open(path: &Path, num_blocks: usize) -> std::io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks,
        })
    }
}

impl BlockDevice for FileDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_blocks(&self, start_block: usize, count: usize, buf: &mut [u8]) -> Result<()> {
        if start_block + count > self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        let mut inner = self.inner.lock().unwrap();
        inner
            .seek(SeekFrom::Start((start_block * BLOCK_SIZE) as u64))
            .map_err(|_| Error::Io)?;
        inner
            .read_exact(&mut buf[..count * BLOCK_SIZE])
            .map_err(|_| Error::Io)?;
        Ok(())
    }

    fn write_blocks(&self, start_block: usize, count: usize, buf: &[u8]) -> Result<()> {
        if start_block + count > self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        let mut inner = self.inner.lock().unwrap();
        inner
            .seek(SeekFrom::Start((start_block * BLOCK_SIZE) as u64))
            .map_err(|_| Error::Io)?;
        inner
            .write_all(&buf[..count * BLOCK_SIZE])
            .map_err(|_| Error::Io)?;
        Ok(())
    }
}

/// A per-test backing image path that stays unique when suites run in
/// parallel.
pub fn temp_image(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pion-{}-{}.img", name, std::process::id()))
}

/// A patterned payload whose bytes depend on their offset, so misplaced
/// blocks show up as content mismatches.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
