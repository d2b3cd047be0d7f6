use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    #[error("block device I/O failed")]
    Io,
    #[error("block ID out of range for the device")]
    InvalidBlockId,
    #[error("device too small for the filesystem layout")]
    DeviceTooSmall,
    #[error("not a valid filesystem image")]
    InvalidSuperBlock,
    #[error("file name too long")]
    NameTooLong,
    #[error("invalid file name")]
    InvalidName,
    #[error("no such file")]
    NotFound,
    #[error("file is already open")]
    AlreadyOpen,
    #[error("bad file descriptor")]
    BadDescriptor,
    #[error("offset out of bounds")]
    OutOfBounds,
    #[error("no free inode left")]
    OutOfInodes,
    #[error("no free file descriptor left")]
    OutOfDescriptors,
}

pub type Result<T> = core::result::Result<T, FsError>;
