//! # Store Operations
//!
//! The mutation and query surface both the CLI and the server dispatch onto:
//! `create`, `list`, `insert`, `read`, `delete`. Each mirrors the matching
//! `do_*` function in `original_source/src/imgfs_*.c` function-for-function,
//! adapted to operate on [`StoreHandle`]'s in-memory table instead of
//! re-reading records off disk for every access.

use log::{debug, info, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::dedup;
use crate::error::{ImgFsError, ImgfsResult};
use crate::image_codec;
use crate::layout::{ImageMeta, NB_RES, ORIG_RES};
use crate::store::{validate_img_id, StoreConfig, StoreHandle};

/// Creates a new, empty store at `path`. Thin pass-through kept as its own
/// function so the CLI's `create` command and any future caller share one
/// entry point, the way `do_create_cmd` wraps `imgfs_create`.
pub fn create(path: &std::path::Path, cfg: StoreConfig) -> ImgfsResult<StoreHandle> {
    StoreHandle::create(path, cfg)
}

/// One entry of a [`list`] result.
#[derive(Serialize, Debug, Clone)]
pub struct ImageInfo {
    pub img_id: String,
    pub sha: String,
    pub orig_res: [u32; 2],
    pub size: [u32; NB_RES],
    pub offset: [u64; NB_RES],
}

impl From<&ImageMeta> for ImageInfo {
    fn from(meta: &ImageMeta) -> Self {
        ImageInfo {
            img_id: meta.img_id_str(),
            sha: hex::encode(meta.sha),
            orig_res: meta.orig_res,
            size: meta.size,
            offset: meta.offset,
        }
    }
}

/// Lists every valid slot, in table order (not insertion order — a freed and
/// later reused slot keeps its position), mirroring `do_list_cmd`'s linear
/// scan over the whole metadata table.
pub fn list(store: &StoreHandle) -> Vec<ImageInfo> {
    store
        .metadata
        .iter()
        .filter(|m| m.is_valid())
        .map(ImageInfo::from)
        .collect()
}

/// Renders a [`list`] result the way the store's header names itself, for
/// the CLI's plain-text `list` output.
pub fn list_header_name(store: &StoreHandle) -> String {
    store.header.name_str()
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Inserts `bytes` (must decode as a JPEG) under `img_id`. Deduplicates
/// against existing content by SHA-256 before appending anything new, the
/// way `do_insert` calls `do_name_and_content_dedup` prior to writing.
pub fn insert(store: &mut StoreHandle, img_id: &str, bytes: &[u8]) -> ImgfsResult<()> {
    validate_img_id(img_id)?;
    if store.find_by_img_id(img_id).is_some() {
        return Err(ImgFsError::DuplicateId);
    }
    let index = store.first_empty_slot()?;

    let (w, h) = image_codec::validate_jpeg(bytes)?;
    let sha = sha256(bytes);

    let mut meta = ImageMeta::zeroed();
    meta.set_img_id(img_id);
    meta.sha = sha;
    meta.orig_res = [w, h];
    meta.is_valid = crate::layout::NON_EMPTY;

    match dedup::find_duplicate(&store.metadata, &sha, index) {
        Some(dup_index) => {
            let src = store.metadata[dup_index].clone();
            dedup::alias_extents(&mut meta, &src);
            debug!("insert {img_id}: deduplicated against slot {dup_index}");
        }
        None => {
            let offset = store.append_payload(bytes)?;
            meta.offset[ORIG_RES] = offset;
            meta.size[ORIG_RES] = bytes.len() as u32;
        }
    }

    store.metadata[index] = meta;
    store.header.nb_files += 1;
    store.persist_header()?;
    store.persist_slot(index)?;
    info!("insert {img_id}: stored at slot {index} ({w}x{h})");
    Ok(())
}

/// Reads `img_id` at `res`, resizing on demand and caching the result in the
/// metadata table (and on disk) if this resolution has never been produced
/// before — `original_source/src/imgfs_read.c`'s "lazy tier" behavior.
pub fn read(store: &mut StoreHandle, img_id: &str, res: usize) -> ImgfsResult<Vec<u8>> {
    if res >= NB_RES {
        return Err(ImgFsError::Resolutions);
    }
    let index = store.find_by_img_id(img_id).ok_or(ImgFsError::ImageNotFound)?;

    if res != ORIG_RES && store.metadata[index].size[res] == 0 {
        resize_on_demand(store, index, res)?;
    }

    let meta = &store.metadata[index];
    let (offset, size) = (meta.offset[res], meta.size[res]);
    store.read_payload(offset, size)
}

fn resize_on_demand(store: &mut StoreHandle, index: usize, res: usize) -> ImgfsResult<()> {
    let orig_meta = store.metadata[index].clone();
    let orig_bytes = store.read_payload(orig_meta.offset[ORIG_RES], orig_meta.size[ORIG_RES])?;
    let [target_w, target_h] = store.header.resized_res[res];
    let resized = image_codec::resize(&orig_bytes, target_w as u32, target_h as u32)?;

    let offset = store.append_payload(&resized)?;
    store.metadata[index].offset[res] = offset;
    store.metadata[index].size[res] = resized.len() as u32;
    store.persist_slot(index)?;
    debug!("resized slot {index} to tier {res} ({target_w}x{target_h})");
    Ok(())
}

/// Deletes `img_id`: zeroes its slot and decrements `nb_files`. The payload
/// bytes stay on disk untouched — no compaction, per the store's Non-goals.
pub fn delete(store: &mut StoreHandle, img_id: &str) -> ImgfsResult<()> {
    let index = store.find_by_img_id(img_id).ok_or(ImgFsError::ImageNotFound)?;
    store.metadata[index] = ImageMeta::zeroed();
    store.header.nb_files = store.header.nb_files.saturating_sub(1);
    store.persist_header()?;
    store.persist_slot(index)?;
    warn!("deleted {img_id} (slot {index} left as a free hole, payload bytes retained)");
    Ok(())
}
