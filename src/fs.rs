//! The main file system interface.
//!
//! `FileSystem` bundles every table the engine needs: the superblock, the
//! inode table, the root directory, the free-space map, the descriptor
//! table and the directory enumeration cursor. All of it except the
//! descriptor table and the cursor mirrors on-disk state; mutating calls
//! rewrite the affected tables before returning, so a remount always sees
//! the result of every completed call.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;

use crate::bitmap;
use crate::bitmap::FreeMap;
use crate::config::*;
use crate::directory;
use crate::fd;
use crate::fd::FileDesc;
use crate::file;
use crate::inode;
use crate::read_superblock;
use crate::write_superblock;
use crate::BlockDevice;
use crate::DirEntry;
use crate::Error;
use crate::Inode;
use crate::Result;
use crate::SuperBlock;

pub struct FileSystem<D: BlockDevice> {
    device: Arc<D>,
    superblock: SuperBlock,
    inodes: [Inode; NUM_INODES],
    root: [DirEntry; NUM_FILE_INODES],
    free_map: FreeMap,
    fdt: [FileDesc; NUM_INODES],
    num_files: u32,
    next_file: u32,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Initializes a fresh filesystem on `device`, writing the superblock
    /// and empty tables to their fixed offsets.
    pub fn format(device: Arc<D>) -> Result<Self> {
        if device.num_blocks() < NUM_TOTAL_BLOCKS {
            return Err(Error::DeviceTooSmall);
        }

        let mut fs = Self {
            device,
            superblock: SuperBlock::new(),
            inodes: [Inode::ZERO; NUM_INODES],
            root: [DirEntry::NULL; NUM_FILE_INODES],
            free_map: FreeMap::new(),
            fdt: fd::new_table(),
            num_files: 0,
            next_file: 0,
        };
        // Inode 0 is the root directory, allocated for the life of the disk.
        fs.inodes[0].link_cnt = 1;

        write_superblock(&*fs.device, &fs.superblock)?;
        inode::flush_inode_table(&*fs.device, &fs.inodes)?;
        directory::flush_dir_table(&*fs.device, &fs.root)?;
        fs.free_map.flush(&*fs.device)?;

        log::debug!(
            "formatted: {} blocks total, data region {}..{}",
            NUM_TOTAL_BLOCKS,
            DATA_BLOCKS_OFFSET,
            BITMAP_BLOCK_OFFSET
        );
        Ok(fs)
    }

    /// Attaches to an already-formatted filesystem, loading all persistent
    /// tables into memory. Descriptors and the enumeration cursor start
    /// from scratch.
    pub fn mount(device: Arc<D>) -> Result<Self> {
        let superblock = read_superblock(&*device)?;
        let inodes = inode::load_inode_table(&*device)?;
        let root = directory::load_dir_table(&*device)?;
        let free_map = FreeMap::load(&*device)?;
        let num_files = inodes[1..].iter().filter(|n| n.is_allocated()).count() as u32;

        log::debug!("mounted: {} files", num_files);

        Ok(Self {
            device,
            superblock,
            inodes,
            root,
            free_map,
            fdt: fd::new_table(),
            num_files,
            next_file: 0,
        })
    }

    /// Opens `name`, creating the file if it does not exist yet.
    ///
    /// Reopening an existing file positions the r/w pointer at the end of
    /// file, so plain writes append. A file may have at most one open
    /// descriptor at a time.
    pub fn open(&mut self, name: &str) -> Result<usize> {
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        if name.len() >= MAX_FILENAME {
            return Err(Error::NameTooLong);
        }

        if let Some(entry_idx) = directory::find(&self.root, name) {
            let inode_id = (entry_idx + 1) as u32;
            if self.fdt[1..].iter().any(|f| f.inode == Some(inode_id)) {
                return Err(Error::AlreadyOpen);
            }
            let fd = self.free_fd()?;
            self.fdt[fd] = FileDesc {
                inode: Some(inode_id),
                rwptr: self.inodes[inode_id as usize].size,
            };
            // Re-assert the in-use flags; no metadata changed on disk.
            self.root[entry_idx].mode = 1;
            self.inodes[inode_id as usize].link_cnt = 1;
            return Ok(fd);
        }

        let inode_id = self.inodes[1..]
            .iter()
            .position(|n| n.link_cnt == 0)
            .map(|i| (i + 1) as u32)
            .ok_or(Error::OutOfInodes)?;
        let fd = self.free_fd()?;

        self.root[inode_id as usize - 1] = DirEntry::new(name)?;
        self.inodes[inode_id as usize] = Inode {
            mode: 1,
            link_cnt: 1,
            size: 0,
            direct: [0; NUM_DIRECT_PTRS],
            indirect: 0,
        };
        self.fdt[fd] = FileDesc {
            inode: Some(inode_id),
            rwptr: 0,
        };
        self.num_files += 1;

        inode::flush_inode_table(&*self.device, &self.inodes)?;
        directory::flush_dir_table(&*self.device, &self.root)?;

        Ok(fd)
    }

    /// Releases a descriptor. No disk I/O; descriptors are in-memory only.
    pub fn close(&mut self, fd: usize) -> Result<()> {
        self.checked_fd(fd)?;
        self.fdt[fd] = FileDesc::FREE;
        Ok(())
    }

    /// Repositions the r/w pointer. `loc` may be anywhere in [0, size];
    /// seeking past the end of file is rejected, so writes can never leave
    /// a hole in the file body.
    pub fn seek(&mut self, fd: usize, loc: usize) -> Result<()> {
        let inode_id = self.checked_fd(fd)?;
        if loc > self.inodes[inode_id as usize].size as usize || loc >= MAX_FILE_BYTES {
            return Err(Error::OutOfBounds);
        }
        self.fdt[fd].rwptr = loc as u32;
        Ok(())
    }

    /// Reads up to `buf.len()` bytes at the descriptor's r/w pointer.
    /// Returns the number of bytes read; 0 at end of file.
    pub fn read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize> {
        let inode_id = self.checked_fd(fd)?;
        let mut rwptr = self.fdt[fd].rwptr;
        let bytes_read = file::read_at(
            &*self.device,
            &self.inodes[inode_id as usize],
            &mut rwptr,
            buf,
        )?;
        self.fdt[fd].rwptr = rwptr;
        Ok(bytes_read)
    }

    /// Writes `buf` at the descriptor's r/w pointer, extending the file as
    /// needed. Returns the number of bytes written, which is short when
    /// the disk runs out of free blocks or the file hits MAX_FILE_BYTES.
    pub fn write(&mut self, fd: usize, buf: &[u8]) -> Result<usize> {
        let inode_id = self.checked_fd(fd)? as usize;
        let mut rwptr = self.fdt[fd].rwptr;
        let bytes_written = file::write_at(
            &*self.device,
            &mut self.free_map,
            &mut self.inodes[inode_id],
            &mut rwptr,
            buf,
        )?;
        self.fdt[fd].rwptr = rwptr;

        // A short write still persists what it wrote.
        if bytes_written > 0 {
            inode::flush_inode_table(&*self.device, &self.inodes)?;
            self.free_map.flush(&*self.device)?;
        }
        Ok(bytes_written)
    }

    /// Removes `name`, releasing its directory slot, inode and every data
    /// block it owned (the indirect index block included). An open
    /// descriptor on the file is closed implicitly. Returns the freed
    /// inode ID.
    pub fn remove(&mut self, name: &str) -> Result<u32> {
        let entry_idx = directory::find(&self.root, name).ok_or(Error::NotFound)?;
        let inode_id = (entry_idx + 1) as u32;

        self.root[entry_idx].clear();
        for f in self.fdt[1..].iter_mut() {
            if f.inode == Some(inode_id) {
                *f = FileDesc::FREE;
            }
        }

        if self.inodes[inode_id as usize].is_allocated() {
            let zero_buf = [0u8; BLOCK_SIZE];
            let node = &mut self.inodes[inode_id as usize];

            for ptr in node.direct.iter_mut() {
                if *ptr > 0 {
                    self.free_map.clear(bitmap::slot_of(*ptr));
                    self.device.write_block(*ptr as usize, &zero_buf)?;
                    *ptr = 0;
                }
            }

            if node.indirect > 0 {
                let mut ptr_buf = Box::new([0u32; PTRS_PER_INDIRECT]);
                file::read_indirect(&*self.device, node.indirect, &mut ptr_buf)?;
                for ptr in ptr_buf.iter() {
                    if *ptr > 0 {
                        self.free_map.clear(bitmap::slot_of(*ptr));
                        self.device.write_block(*ptr as usize, &zero_buf)?;
                    }
                }
                self.device.write_block(node.indirect as usize, &zero_buf)?;
                self.free_map.clear(bitmap::slot_of(node.indirect));
                node.indirect = 0;
            }

            node.mode = 0;
            node.size = 0;
            node.link_cnt = 0;
            self.num_files -= 1;

            inode::flush_inode_table(&*self.device, &self.inodes)?;
            directory::flush_dir_table(&*self.device, &self.root)?;
            self.free_map.flush(&*self.device)?;
        }

        Ok(inode_id)
    }

    /// Size in bytes of the file named `name`.
    pub fn file_size(&self, name: &str) -> Result<u32> {
        let entry_idx = directory::find(&self.root, name).ok_or(Error::NotFound)?;
        Ok(self.inodes[entry_idx + 1].size)
    }

    /// Produces the next active file name in directory order, or None once
    /// every name has been produced. Returning None resets the cursor, so
    /// the next call starts a fresh walk. The cursor also resets on mount.
    pub fn next_filename(&mut self) -> Option<String> {
        if self.num_files > 0 {
            if let Some(entry) = directory::nth_active(&self.root, self.next_file as usize) {
                let name = String::from_utf8_lossy(entry.name_bytes()).into_owned();
                self.next_file += 1;
                return Some(name);
            }
        }
        self.next_file = 0;
        None
    }

    /// Inode ID bound to `name`.
    pub fn lookup(&self, name: &str) -> Result<u32> {
        directory::find(&self.root, name)
            .map(|entry_idx| (entry_idx + 1) as u32)
            .ok_or(Error::NotFound)
    }

    /// Copy of the inode record with the given ID.
    pub fn get_inode(&self, inode_id: u32) -> Result<Inode> {
        if inode_id as usize >= NUM_INODES {
            return Err(Error::OutOfBounds);
        }
        Ok(self.inodes[inode_id as usize])
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    pub fn num_files(&self) -> u32 {
        self.num_files
    }

    /// Number of allocated data blocks (index blocks included).
    pub fn allocated_blocks(&self) -> usize {
        self.free_map.allocated()
    }

    pub fn device(&self) -> Arc<D> {
        Arc::clone(&self.device)
    }

    /// One-line summary of the filesystem state, for diagnostics.
    pub fn dump(&self) -> String {
        format!(
            "pion: {} files, {}/{} data blocks allocated, {} descriptors open",
            self.num_files,
            self.free_map.allocated(),
            NUM_DATA_BLOCKS,
            self.fdt[1..].iter().filter(|f| !f.is_free()).count(),
        )
    }

    fn checked_fd(&self, fd: usize) -> Result<u32> {
        if fd == 0 || fd >= NUM_INODES {
            return Err(Error::BadDescriptor);
        }
        match self.fdt[fd].inode {
            Some(inode_id) if inode_id > 0 => Ok(inode_id),
            _ => Err(Error::BadDescriptor),
        }
    }

    fn free_fd(&self) -> Result<usize> {
        self.fdt[1..]
            .iter()
            .position(|f| f.is_free())
            .map(|i| i + 1)
            .ok_or(Error::OutOfDescriptors)
    }
}
