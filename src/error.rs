//! # Error Taxonomy
//!
//! All fallible operations in this crate return [`ImgFsError`] rather than an
//! open-ended `Box<dyn Error>`. The dispatcher (`server::dispatch`) and the CLI
//! binary are the only places that translate a variant into something
//! presentation-specific (a wire status code, a process exit code).

use thiserror::Error;

/// Error kinds recognized throughout the store, its dispatcher, and the CLI.
#[derive(Error, Debug)]
pub enum ImgFsError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("not enough arguments")]
    NotEnoughArguments,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("out of memory")]
    OutOfMemory,
    #[error("image not found")]
    ImageNotFound,
    #[error("existing image id, cannot add a duplicate")]
    DuplicateId,
    #[error("imgFS is full")]
    StoreFull,
    #[error("invalid resolution")]
    Resolutions,
    #[error("invalid image id")]
    InvalidImgId,
    #[error("image library error")]
    Imglib,
    #[error("invalid command")]
    InvalidCommand,
    #[error("runtime error")]
    Runtime,
}

impl ImgFsError {
    /// Stable non-zero exit code for this error kind, one per variant, in the
    /// order spec.md lists the taxonomy. `ERR_NONE` (success, code 0) is not a
    /// variant of this enum; callers map `Ok` to `0` themselves.
    pub fn exit_code(&self) -> i32 {
        match self {
            ImgFsError::InvalidArgument => 1,
            ImgFsError::NotEnoughArguments => 2,
            ImgFsError::Io(_) => 3,
            ImgFsError::OutOfMemory => 4,
            ImgFsError::ImageNotFound => 5,
            ImgFsError::DuplicateId => 6,
            ImgFsError::StoreFull => 7,
            ImgFsError::Resolutions => 8,
            ImgFsError::InvalidImgId => 9,
            ImgFsError::Imglib => 10,
            ImgFsError::InvalidCommand => 11,
            ImgFsError::Runtime => 12,
        }
    }
}

pub type ImgfsResult<T> = Result<T, ImgFsError>;
