use crate::config::BLOCK_SIZE;
use crate::error::FsError;

pub trait BlockDevice: Send + Sync {
    /// Returns the number of blocks in the block device.
    fn num_blocks(&self) -> usize;

    /// Reads `count` consecutive blocks starting at `start_block`.
    /// buf.len() must be at least count * block_size().
    fn read_blocks(&self, start_block: usize, count: usize, buf: &mut [u8])
        -> Result<(), FsError>;

    /// Writes `count` consecutive blocks starting at `start_block`.
    /// buf.len() must be at least count * block_size().
    fn write_blocks(&self, start_block: usize, count: usize, buf: &[u8]) -> Result<(), FsError>;

    /// Reads a single block.
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), FsError> {
        self.read_blocks(block_id, 1, buf)
    }

    /// Writes a single block.
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), FsError> {
        self.write_blocks(block_id, 1, buf)
    }

    /// Returns the size of each block in bytes.
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}
