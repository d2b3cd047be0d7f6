//! Pion is a tiny flat file system: one root directory, a fixed number of
//! named files, persistent across remounts of the same backing disk.
//! For simplicity, no support for subdirectories, permissions, timestamps,
//! or other advanced features.
//!
//! Pion File System's linear layout:
//! - Superblock
//! - Inode Table
//! - Root Directory
//! - Data Blocks
//! - Free-Space Map
//!
//! Pion's layers (from bottom to top):
//! 1. Block Device: Abstraction for low level devices.          | User implemented (hardware-specific)
//! 2. Tables: Superblock, inodes, directory, free map.          | Fs implemented, wholly mirrored in memory
//! 3. Engine: Block walk, allocation, read-modify-write.        | Fs implemented
//! 4. FileSystem: The main file system interface for users.     | Open/close/seek/read/write/remove
//!
//! Each mutating call rewrites the metadata tables it touched before
//! returning, so the on-disk image is consistent after every completed
//! call. A single `FileSystem` value owns all state; callers wanting
//! shared access wrap it in their own lock.

extern crate alloc;

mod bitmap;
mod block_dev;
mod config;
mod directory;
mod error;
mod fd;
mod file;
mod fs;
mod inode;
mod structs;
mod superblock;

pub use block_dev::BlockDevice;
pub use config::*;
pub use error::FsError as Error;
pub use error::Result;
pub use fd::FileDesc;
pub use fs::FileSystem;
pub use structs::*;
pub use superblock::{read_superblock, write_superblock};
