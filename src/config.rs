pub const MAGIC: u64 = 0xACBD0005; // Magic number identifying a Pion disk

pub const BLOCK_SIZE: usize = 1024;
pub const SUPERBLOCK_ID: usize = 0; // Block ID for the superblock
pub const ROOT_DIR_INODE: u32 = 0; // Inode ID reserved for the root directory
pub const NUM_INODES: usize = 128;
pub const NUM_FILE_INODES: usize = NUM_INODES - 1; // Inode 0 never holds a user file

pub const MAX_FILENAME: usize = 60; // Null-terminated on disk
pub const NUM_DIRECT_PTRS: usize = 12; // Direct pointers per inode
pub const PTR_SIZE: usize = core::mem::size_of::<u32>();
pub const PTRS_PER_INDIRECT: usize = BLOCK_SIZE / PTR_SIZE; // 256

pub const MAX_BLOCKS_PER_FILE: usize = NUM_DIRECT_PTRS + PTRS_PER_INDIRECT; // 268
pub const MAX_FILE_BYTES: usize = MAX_BLOCKS_PER_FILE * BLOCK_SIZE;

// On-disk record widths of the canonical encoding (see structs.rs).
pub const SUPERBLOCK_DISK_SIZE: usize = 56;
pub const INODE_DISK_SIZE: usize = 64;
pub const DIRENT_DISK_SIZE: usize = 64;

// Fixed linear layout, all section lengths rounded up to whole blocks:
// superblock | inode table | root directory | data blocks | free-space map
pub const INODE_TABLE_OFFSET: usize = 1;
pub const NUM_INODE_BLOCKS: usize =
    (NUM_INODES * INODE_DISK_SIZE + BLOCK_SIZE - 1) / BLOCK_SIZE; // 8
pub const DIR_TABLE_OFFSET: usize = INODE_TABLE_OFFSET + NUM_INODE_BLOCKS;
pub const NUM_DIR_BLOCKS: usize =
    (NUM_FILE_INODES * DIRENT_DISK_SIZE + BLOCK_SIZE - 1) / BLOCK_SIZE; // 8

// The data region is scaled down from the theoretical maximum: no real
// workload fills every inode to MAX_FILE_BYTES.
pub const NUM_DATA_BLOCKS: usize = MAX_BLOCKS_PER_FILE * NUM_FILE_INODES / 16; // 2127
pub const DATA_BLOCKS_OFFSET: usize = DIR_TABLE_OFFSET + NUM_DIR_BLOCKS; // 17

pub const BITMAP_BLOCK_OFFSET: usize = DATA_BLOCKS_OFFSET + NUM_DATA_BLOCKS; // 2144
pub const NUM_BITMAP_BLOCKS: usize = (NUM_DATA_BLOCKS + BLOCK_SIZE - 1) / BLOCK_SIZE; // 3

pub const NUM_TOTAL_BLOCKS: usize = BITMAP_BLOCK_OFFSET + NUM_BITMAP_BLOCKS; // 2147
