//! The read/write engine.
//!
//! Both paths walk the file one block at a time, translating the
//! file-relative block index through the inode's direct pointers or through
//! the single indirect index block. Writes allocate missing blocks from the
//! free map on demand (including the index block itself, lazily) and merge
//! partial chunks with on-disk contents via read-modify-write. Because a
//! write may start no further than the current end of file, the file body
//! is always a contiguous prefix of [0, size).

use alloc::boxed::Box;

use crate::bitmap;
use crate::bitmap::FreeMap;
use crate::config::*;
use crate::error::Result;
use crate::BlockDevice;
use crate::Inode;

pub(crate) fn read_indirect<D: BlockDevice>(
    device: &D,
    block_id: u32,
    ptrs: &mut [u32; PTRS_PER_INDIRECT],
) -> Result<()> {
    let mut raw = Box::new([0u8; BLOCK_SIZE]);
    device.read_block(block_id as usize, raw.as_mut_slice())?;
    for (ptr, chunk) in ptrs.iter_mut().zip(raw.chunks_exact(PTR_SIZE)) {
        *ptr = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(())
}

pub(crate) fn write_indirect<D: BlockDevice>(
    device: &D,
    block_id: u32,
    ptrs: &[u32; PTRS_PER_INDIRECT],
) -> Result<()> {
    let mut raw = Box::new([0u8; BLOCK_SIZE]);
    for (ptr, chunk) in ptrs.iter().zip(raw.chunks_exact_mut(PTR_SIZE)) {
        chunk.copy_from_slice(&ptr.to_le_bytes());
    }
    device.write_block(block_id as usize, raw.as_slice())?;
    Ok(())
}

fn alloc_block(free_map: &mut FreeMap) -> Option<u32> {
    let slot = free_map.first_free()?;
    free_map.set(slot);
    Some(bitmap::block_of(slot))
}

/// Reads from the file at `*rwptr` into `buf`, advancing the pointer.
///
/// Returns the number of bytes read: short at end of file, and short at a
/// sparse hole (an unmapped block inside [0, size), which only a corrupted
/// disk can exhibit). Zero-length requests and reads at or past end of
/// file return 0.
pub fn read_at<D: BlockDevice>(
    device: &D,
    inode: &Inode,
    rwptr: &mut u32,
    buf: &mut [u8],
) -> Result<usize> {
    if buf.is_empty() || *rwptr >= inode.size {
        return Ok(0);
    }

    let mut remaining = buf.len().min((inode.size - *rwptr) as usize);
    let mut bytes_read = 0;
    let mut current_block = *rwptr as usize / BLOCK_SIZE;

    let mut ptr_buf = Box::new([0u32; PTRS_PER_INDIRECT]);
    let mut ptr_loaded = false;
    let mut block_buf = Box::new([0u8; BLOCK_SIZE]);

    while remaining > 0 && current_block < MAX_BLOCKS_PER_FILE {
        let block_id = if current_block < NUM_DIRECT_PTRS {
            inode.direct[current_block]
        } else {
            if inode.indirect == 0 {
                break;
            }
            if !ptr_loaded {
                read_indirect(device, inode.indirect, &mut ptr_buf)?;
                ptr_loaded = true;
            }
            ptr_buf[current_block - NUM_DIRECT_PTRS]
        };
        if block_id == 0 {
            break;
        }

        device.read_block(block_id as usize, block_buf.as_mut_slice())?;
        let block_offset = *rwptr as usize % BLOCK_SIZE;
        let chunk = remaining.min(BLOCK_SIZE - block_offset);
        buf[bytes_read..bytes_read + chunk]
            .copy_from_slice(&block_buf[block_offset..block_offset + chunk]);

        bytes_read += chunk;
        remaining -= chunk;
        *rwptr += chunk as u32;
        current_block = *rwptr as usize / BLOCK_SIZE;
    }

    Ok(bytes_read)
}

/// Writes `buf` to the file at `*rwptr`, advancing the pointer and growing
/// `inode.size` when the write extends past the old end of file.
///
/// Returns the number of bytes written. The count is short when the free
/// map runs dry or the file reaches MAX_FILE_BYTES; a short write is a
/// capacity signal, not an error, and everything written up to that point
/// stays written. Data blocks go to disk inside the walk; the caller is
/// responsible for persisting the inode table and the free map afterwards
/// whenever the returned count is nonzero.
pub fn write_at<D: BlockDevice>(
    device: &D,
    free_map: &mut FreeMap,
    inode: &mut Inode,
    rwptr: &mut u32,
    buf: &[u8],
) -> Result<usize> {
    // Writes may append exactly at end of file but never skip past it.
    if buf.is_empty() || *rwptr > inode.size || *rwptr as usize >= MAX_FILE_BYTES {
        return Ok(0);
    }

    let mut remaining = buf.len();
    let mut bytes_written = 0;
    let mut current_block = *rwptr as usize / BLOCK_SIZE;

    let mut ptr_buf = Box::new([0u32; PTRS_PER_INDIRECT]);
    let mut ptr_dirty = false;
    if inode.indirect > 0 {
        read_indirect(device, inode.indirect, &mut ptr_buf)?;
    }

    let mut block_buf = Box::new([0u8; BLOCK_SIZE]);

    while remaining > 0 && current_block < MAX_BLOCKS_PER_FILE {
        // Locate the data block backing `current_block`, allocating it
        // first-fit when the mapping is still empty.
        let block_id;
        let mut fresh = false;

        if current_block < NUM_DIRECT_PTRS {
            if inode.direct[current_block] > 0 {
                block_id = inode.direct[current_block];
            } else {
                match alloc_block(free_map) {
                    Some(id) => {
                        inode.direct[current_block] = id;
                        block_id = id;
                        fresh = true;
                    }
                    None => {
                        log::error!("could not allocate a data block; returning a short write");
                        break;
                    }
                }
            }
        } else {
            if inode.indirect == 0 {
                match alloc_block(free_map) {
                    Some(id) => {
                        inode.indirect = id;
                        ptr_buf.fill(0);
                        ptr_dirty = true;
                    }
                    None => {
                        log::error!("could not allocate the indirect index block; returning a short write");
                        break;
                    }
                }
            }
            let slot = current_block - NUM_DIRECT_PTRS;
            if ptr_buf[slot] > 0 {
                block_id = ptr_buf[slot];
            } else {
                match alloc_block(free_map) {
                    Some(id) => {
                        ptr_buf[slot] = id;
                        ptr_dirty = true;
                        block_id = id;
                        fresh = true;
                    }
                    None => {
                        log::error!("could not allocate a data block; returning a short write");
                        break;
                    }
                }
            }
        }

        // Read-modify-write: a freshly allocated block has undefined
        // contents on disk, so it starts from zeroes instead.
        if fresh {
            block_buf.fill(0);
        } else {
            device.read_block(block_id as usize, block_buf.as_mut_slice())?;
        }

        let block_offset = *rwptr as usize % BLOCK_SIZE;
        let chunk = remaining.min(BLOCK_SIZE - block_offset);
        block_buf[block_offset..block_offset + chunk]
            .copy_from_slice(&buf[bytes_written..bytes_written + chunk]);
        device.write_block(block_id as usize, block_buf.as_slice())?;

        bytes_written += chunk;
        remaining -= chunk;
        *rwptr += chunk as u32;
        current_block = *rwptr as usize / BLOCK_SIZE;
    }

    if bytes_written > 0 {
        if *rwptr > inode.size {
            inode.size = *rwptr;
        }
        if ptr_dirty {
            write_indirect(device, inode.indirect, &ptr_buf)?;
        }
    }

    Ok(bytes_written)
}
