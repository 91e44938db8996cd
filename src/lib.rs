//! # imgfs
//!
//! A content-addressed, multi-resolution JPEG image filestore: a single
//! flat file holds a header, a fixed-size metadata table, and the raw JPEG
//! payloads those records point into. Identical content is stored once and
//! aliased from every `img_id` that inserts it; resized tiers are produced
//! lazily, the first time they're asked for, and cached back into the same
//! file.
//!
//! The crate is organized bottom-up:
//!
//! - [`layout`] — the fixed-width on-disk record shapes.
//! - [`store`] — opening/creating a store file and the in-memory mirror of
//!   its header and metadata table.
//! - [`image_codec`] — JPEG probing/resizing.
//! - [`dedup`] — the content-addressing scan.
//! - [`ops`] — `create`/`list`/`insert`/`read`/`delete`, built on the above.
//! - [`server`] — the request codec, dispatcher, and accept loop that expose
//!   [`ops`] over a plain TCP socket.
//! - [`cli`] / [`commands`] — the `imgfs` command-line surface.
//!
//! Every fallible function in this crate returns [`error::ImgfsResult`]
//! rather than panicking; only the two binaries (`imgfs`, `imgfs-server`)
//! translate an [`error::ImgFsError`] into a process exit code or an HTTP
//! status line.

pub mod cli;
pub mod commands;
pub mod dedup;
pub mod error;
pub mod image_codec;
pub mod layout;
pub mod ops;
pub mod server;
pub mod store;
