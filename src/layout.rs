//! # Binary Layout Codec
//!
//! Fixed-width encode/decode of the two record types that make up the front
//! of every store file: [`StoreHeader`] (one, at offset 0) and [`ImageMeta`]
//! (`max_files` of them, packed immediately after the header). Layout is
//! little-endian throughout, matched byte-for-byte by `binrw`'s derive macros
//! the way `bios::as::AppleSingleFile` uses them for a different fixed
//! record format.
//!
//! This module does no I/O and performs no allocation beyond what `binrw`
//! needs to materialize the struct; [`store`](crate::store) owns the file
//! handle and decides when to read or write these records.

use binrw::{BinRead, BinWrite};

/// Number of resolution tiers a single image can be stored at.
pub const NB_RES: usize = 3;
pub const THUMB_RES: usize = 0;
pub const SMALL_RES: usize = 1;
pub const ORIG_RES: usize = 2;

/// Maximum length, in bytes including the terminating NUL, of an `img_id`.
pub const MAX_IMG_ID: usize = 128;

/// Fixed width of the store's display name field.
const NAME_SIZE: usize = 32;

pub const EMPTY: u8 = 0;
pub const NON_EMPTY: u8 = 1;

/// Byte size of a packed [`StoreHeader`] record.
pub const HEADER_SIZE: u64 = (NAME_SIZE + 4 + 4 + 4 + NB_RES * 2 * 2) as u64;

/// Byte size of a packed [`ImageMeta`] record.
pub const IMAGE_META_SIZE: u64 =
    (MAX_IMG_ID + 32 + 2 * 4 + NB_RES * 4 + NB_RES * 8 + 1) as u64;

/// Single header record at the front of a store file.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct StoreHeader {
    pub name: [u8; NAME_SIZE],
    pub version: u32,
    pub nb_files: u32,
    pub max_files: u32,
    /// `resized_res[r]` is `[width, height]` for resolution `r`. The
    /// `ORIG_RES` entry is never consulted; it exists to keep the record
    /// fixed-width and the resolution index uniform across the table.
    pub resized_res: [[u16; 2]; NB_RES],
}

impl StoreHeader {
    pub fn new(max_files: u32, resized_res: [[u16; 2]; NB_RES]) -> Self {
        let mut name = [0u8; NAME_SIZE];
        let tag = b"EPFL ImgFS 2024";
        name[..tag.len()].copy_from_slice(tag);
        StoreHeader {
            name,
            version: 0,
            nb_files: 0,
            max_files,
            resized_res,
        }
    }

    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

/// One slot of the metadata table. `is_valid == EMPTY` marks a free slot;
/// every other field of a free slot is zeroed.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ImageMeta {
    pub img_id: [u8; MAX_IMG_ID],
    pub sha: [u8; 32],
    pub orig_res: [u32; 2],
    pub size: [u32; NB_RES],
    pub offset: [u64; NB_RES],
    pub is_valid: u8,
}

impl ImageMeta {
    pub fn zeroed() -> Self {
        ImageMeta {
            img_id: [0u8; MAX_IMG_ID],
            sha: [0u8; 32],
            orig_res: [0; 2],
            size: [0; NB_RES],
            offset: [0; NB_RES],
            is_valid: EMPTY,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid == NON_EMPTY
    }

    pub fn img_id_str(&self) -> String {
        let end = self.img_id.iter().position(|&b| b == 0).unwrap_or(self.img_id.len());
        String::from_utf8_lossy(&self.img_id[..end]).into_owned()
    }

    /// Writes `id` NUL-padded into the fixed-width `img_id` field.
    /// Caller must have validated `id` against [`crate::store::validate_img_id`] first.
    pub fn set_img_id(&mut self, id: &str) {
        self.img_id = [0u8; MAX_IMG_ID];
        self.img_id[..id.len()].copy_from_slice(id.as_bytes());
    }
}
