//! Persistence of the fixed inode table.
//!
//! All NUM_INODES slots are loaded into memory at mount and rewritten as one
//! contiguous image on every metadata mutation, so the table on disk is
//! never partially updated relative to the in-memory copy.

use alloc::vec;

use crate::config::*;
use crate::error::Result;
use crate::BlockDevice;
use crate::Inode;

pub fn load_inode_table<D: BlockDevice>(device: &D) -> Result<[Inode; NUM_INODES]> {
    let mut buf = vec![0u8; NUM_INODE_BLOCKS * BLOCK_SIZE];
    device.read_blocks(INODE_TABLE_OFFSET, NUM_INODE_BLOCKS, &mut buf)?;

    let mut table = [Inode::ZERO; NUM_INODES];
    for (i, inode) in table.iter_mut().enumerate() {
        *inode = Inode::decode_from(&buf[i * INODE_DISK_SIZE..(i + 1) * INODE_DISK_SIZE]);
    }
    Ok(table)
}

pub fn flush_inode_table<D: BlockDevice>(device: &D, table: &[Inode; NUM_INODES]) -> Result<()> {
    let mut buf = vec![0u8; NUM_INODE_BLOCKS * BLOCK_SIZE];
    for (i, inode) in table.iter().enumerate() {
        inode.encode_into(&mut buf[i * INODE_DISK_SIZE..(i + 1) * INODE_DISK_SIZE]);
    }
    device.write_blocks(INODE_TABLE_OFFSET, NUM_INODE_BLOCKS, &buf)?;
    Ok(())
}
