use alloc::boxed::Box;

use crate::config::*;
use crate::error::FsError;
use crate::error::Result;
use crate::BlockDevice;
use crate::SuperBlock;

pub fn read_superblock<D: BlockDevice>(device: &D) -> Result<SuperBlock> {
    let mut buf = Box::new([0u8; BLOCK_SIZE]);
    device.read_block(SUPERBLOCK_ID, buf.as_mut_slice())?;
    let superblock = SuperBlock::decode_from(&buf[..SuperBlock::DISK_SIZE]);

    if superblock.magic != MAGIC {
        return Err(FsError::InvalidSuperBlock);
    }
    if superblock.block_size != BLOCK_SIZE as u64 {
        return Err(FsError::InvalidSuperBlock);
    }

    Ok(superblock)
}

pub fn write_superblock<D: BlockDevice>(device: &D, superblock: &SuperBlock) -> Result<()> {
    let mut buf = Box::new([0u8; BLOCK_SIZE]);
    superblock.encode_into(&mut buf[..SuperBlock::DISK_SIZE]);
    device.write_block(SUPERBLOCK_ID, buf.as_slice())?;
    Ok(())
}

impl SuperBlock {
    /// Superblock for the fixed layout. Every field is derived from the
    /// compile-time constants; there is nothing to configure.
    pub fn new() -> Self {
        SuperBlock {
            magic: MAGIC,
            block_size: BLOCK_SIZE as u64,
            fs_size: (NUM_TOTAL_BLOCKS * BLOCK_SIZE) as u64,
            inode_table_len: NUM_INODE_BLOCKS as u64,
            root_dir_inode: ROOT_DIR_INODE as u64,
            free_list_len: NUM_DATA_BLOCKS as u64,
            num_bitmap_blocks: NUM_BITMAP_BLOCKS as u64,
        }
    }
}

impl Default for SuperBlock {
    fn default() -> Self {
        Self::new()
    }
}
