//! On-disk record types and their canonical binary encoding.
//!
//! Records are encoded field by field, little-endian, into zeroed buffers;
//! nothing depends on compiler struct layout. The byte images are what a
//! legacy disk contains, so field order and widths here are the format.

use crate::config::*;
use crate::error::FsError;
use crate::error::Result;

fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

fn get_u32(buf: &[u8], off: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[off..off + 4]);
    u32::from_le_bytes(bytes)
}

fn put_u64(buf: &mut [u8], off: usize, v: u64) {
    buf[off..off + 8].copy_from_slice(&v.to_le_bytes());
}

fn get_u64(buf: &[u8], off: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[off..off + 8]);
    u64::from_le_bytes(bytes)
}

/// The superblock at block 0. Written once on format, read once on mount,
/// invariant for the lifetime of the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub magic: u64,
    pub block_size: u64,
    pub fs_size: u64,         // Total bytes covered by the layout
    pub inode_table_len: u64, // Length of the inode table in blocks
    pub root_dir_inode: u64,
    pub free_list_len: u64,     // Number of data blocks tracked by the free map
    pub num_bitmap_blocks: u64, // Length of the persisted free map in blocks
}

impl SuperBlock {
    pub const DISK_SIZE: usize = SUPERBLOCK_DISK_SIZE;

    pub fn encode_into(&self, buf: &mut [u8]) {
        put_u64(buf, 0, self.magic);
        put_u64(buf, 8, self.block_size);
        put_u64(buf, 16, self.fs_size);
        put_u64(buf, 24, self.inode_table_len);
        put_u64(buf, 32, self.root_dir_inode);
        put_u64(buf, 40, self.free_list_len);
        put_u64(buf, 48, self.num_bitmap_blocks);
    }

    pub fn decode_from(buf: &[u8]) -> Self {
        Self {
            magic: get_u64(buf, 0),
            block_size: get_u64(buf, 8),
            fs_size: get_u64(buf, 16),
            inode_table_len: get_u64(buf, 24),
            root_dir_inode: get_u64(buf, 32),
            free_list_len: get_u64(buf, 40),
            num_bitmap_blocks: get_u64(buf, 48),
        }
    }
}

/// One slot of the fixed inode table.
///
/// `link_cnt` doubles as the allocation flag: 1 exactly when a directory
/// entry references this inode. Pointers hold absolute block IDs; 0 means
/// unallocated (block 0 is the superblock, never a data block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub mode: u32,
    pub link_cnt: u32,
    pub size: u32,
    pub direct: [u32; NUM_DIRECT_PTRS],
    pub indirect: u32,
}

impl Inode {
    pub const DISK_SIZE: usize = INODE_DISK_SIZE;

    pub const ZERO: Self = Self {
        mode: 0,
        link_cnt: 0,
        size: 0,
        direct: [0; NUM_DIRECT_PTRS],
        indirect: 0,
    };

    pub fn is_allocated(&self) -> bool {
        self.link_cnt == 1
    }

    /// Number of data blocks the file body occupies (excluding the
    /// indirect index block).
    pub fn data_blocks(&self) -> usize {
        (self.size as usize + BLOCK_SIZE - 1) / BLOCK_SIZE
    }

    pub fn encode_into(&self, buf: &mut [u8]) {
        put_u32(buf, 0, self.mode);
        put_u32(buf, 4, self.link_cnt);
        put_u32(buf, 8, self.size);
        for (i, ptr) in self.direct.iter().enumerate() {
            put_u32(buf, 12 + i * PTR_SIZE, *ptr);
        }
        put_u32(buf, 60, self.indirect);
    }

    pub fn decode_from(buf: &[u8]) -> Self {
        let mut direct = [0u32; NUM_DIRECT_PTRS];
        for (i, ptr) in direct.iter_mut().enumerate() {
            *ptr = get_u32(buf, 12 + i * PTR_SIZE);
        }
        Self {
            mode: get_u32(buf, 0),
            link_cnt: get_u32(buf, 4),
            size: get_u32(buf, 8),
            direct,
            indirect: get_u32(buf, 60),
        }
    }
}

/// One slot of the root directory table. Entry i is bound to inode i + 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    /// Name bytes, padded with zeros to MAX_FILENAME.
    pub name: [u8; MAX_FILENAME],
    /// Mirrors the owning inode's in-use flag.
    pub mode: u32,
}

impl DirEntry {
    pub const DISK_SIZE: usize = DIRENT_DISK_SIZE;

    pub const NULL: Self = Self {
        name: [0; MAX_FILENAME],
        mode: 0,
    };

    /// Builds an active entry for `name`. The name must be non-empty and
    /// leave room for the on-disk null terminator.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(FsError::InvalidName);
        }
        if name.len() >= MAX_FILENAME {
            return Err(FsError::NameTooLong);
        }
        let mut bytes = [0u8; MAX_FILENAME];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            name: bytes,
            mode: 1,
        })
    }

    pub fn is_active(&self) -> bool {
        self.mode == 1
    }

    /// The stored name up to its null terminator.
    pub fn name_bytes(&self) -> &[u8] {
        let len = self.name.iter().position(|b| *b == 0).unwrap_or(MAX_FILENAME);
        &self.name[..len]
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name_bytes() == name.as_bytes()
    }

    /// Deactivates the slot and zeroes the name bytes.
    pub fn clear(&mut self) {
        *self = Self::NULL;
    }

    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[..MAX_FILENAME].copy_from_slice(&self.name);
        put_u32(buf, MAX_FILENAME, self.mode);
    }

    pub fn decode_from(buf: &[u8]) -> Self {
        let mut name = [0u8; MAX_FILENAME];
        name.copy_from_slice(&buf[..MAX_FILENAME]);
        Self {
            name,
            mode: get_u32(buf, MAX_FILENAME),
        }
    }
}
