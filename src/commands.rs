//! # CLI Command Implementations
//!
//! One function per subcommand, each taking the `clap::ArgMatches` for that
//! subcommand and returning [`ImgfsResult<()>`]. `main.rs` only dispatches;
//! all the actual work, argument validation, and stdout formatting lives
//! here, mirroring the teacher's `commands::*` module split.

use std::path::Path;

use clap::ArgMatches;
use log::info;

use crate::error::{ImgFsError, ImgfsResult};
use crate::layout::{NB_RES, ORIG_RES, SMALL_RES, THUMB_RES};
use crate::ops;
use crate::store::{StoreConfig, StoreHandle};

const DEFAULT_MAX_FILES: u32 = 128;
const DEFAULT_THUMB_RES: u16 = 64;
const MAX_THUMB_RES: u16 = 128;
const DEFAULT_SMALL_RES: u16 = 256;
const MAX_SMALL_RES: u16 = 512;

pub const HELP_TEXT: &str = "imgfs [COMMAND] [ARGUMENTS]\n\
  help: displays this help.\n\
  list <imgFS_filename>: list imgFS content.\n\
  create <imgFS_filename> [options]: create a new imgFS.\n\
      options are:\n\
          --max_files <MAX_FILES>: maximum number of files.\n\
                                  default value is 128\n\
                                  maximum value is 4294967295\n\
          --thumb_res <X_RES> <Y_RES>: resolution for thumbnail images.\n\
                                  default value is 64x64\n\
                                  maximum value is 128x128\n\
          --small_res <X_RES> <Y_RES>: resolution for small images.\n\
                                  default value is 256x256\n\
                                  maximum value is 512x512\n\
  read <imgFS_filename> <imgID> [original|orig|thumbnail|thumb|small]:\n\
      read an image from the imgFS and save it to a file.\n\
      default resolution is \"original\".\n\
  insert <imgFS_filename> <imgID> <filename>: insert a new image in the imgFS.\n\
  delete <imgFS_filename> <imgID>: delete image imgID from imgFS.\n";

pub fn help() -> ImgfsResult<()> {
    print!("{HELP_TEXT}");
    Ok(())
}

pub fn list(matches: &ArgMatches) -> ImgfsResult<()> {
    let store_path = matches.get_one::<String>("store").ok_or(ImgFsError::NotEnoughArguments)?;
    let store = StoreHandle::open(store_path, false)?;
    let infos = ops::list(&store);
    println!("imgFS \"{}\"", ops::list_header_name(&store));
    if infos.is_empty() {
        println!("<< empty imgFS >>");
    }
    for info in infos {
        println!(
            "{} (orig {}x{}, sha {})",
            info.img_id, info.orig_res[0], info.orig_res[1], info.sha
        );
    }
    Ok(())
}

pub fn create(matches: &ArgMatches) -> ImgfsResult<()> {
    let store_path = matches.get_one::<String>("store").ok_or(ImgFsError::NotEnoughArguments)?;

    let max_files = match matches.get_one::<u32>("max_files") {
        Some(&0) => return Err(ImgFsError::InvalidArgument),
        Some(&n) => n,
        None => DEFAULT_MAX_FILES,
    };

    let thumb_res = match matches.get_many::<u16>("thumb_res") {
        Some(values) => {
            let pair: Vec<u16> = values.copied().collect();
            validate_resolution(pair[0], pair[1], MAX_THUMB_RES)?;
            [pair[0], pair[1]]
        }
        None => [DEFAULT_THUMB_RES, DEFAULT_THUMB_RES],
    };

    let small_res = match matches.get_many::<u16>("small_res") {
        Some(values) => {
            let pair: Vec<u16> = values.copied().collect();
            validate_resolution(pair[0], pair[1], MAX_SMALL_RES)?;
            [pair[0], pair[1]]
        }
        None => [DEFAULT_SMALL_RES, DEFAULT_SMALL_RES],
    };

    let mut resized_res = [[0u16; 2]; NB_RES];
    resized_res[THUMB_RES] = thumb_res;
    resized_res[SMALL_RES] = small_res;

    let cfg = StoreConfig { max_files, resized_res };
    let store = ops::create(Path::new(store_path), cfg)?;
    info!("created {} ({} max files)", store_path, store.header.max_files);
    println!("{} file created", store_path);
    Ok(())
}

fn validate_resolution(x: u16, y: u16, max: u16) -> ImgfsResult<()> {
    if x == 0 || y == 0 || x > max || y > max {
        return Err(ImgFsError::Resolutions);
    }
    Ok(())
}

/// Maps the resolution names used by both the CLI's positional argument and
/// the server's `res` query variable onto a resolution index, mirroring
/// `resolution_atoi` in `original_source/src/util.c`.
pub fn resolution_from_name(name: &str) -> ImgfsResult<usize> {
    match name {
        "original" | "orig" => Ok(ORIG_RES),
        "small" => Ok(SMALL_RES),
        "thumbnail" | "thumb" => Ok(THUMB_RES),
        _ => Err(ImgFsError::Resolutions),
    }
}

fn resolution_suffix(res: usize) -> &'static str {
    match res {
        r if r == ORIG_RES => "_orig",
        r if r == SMALL_RES => "_small",
        r if r == THUMB_RES => "_thumb",
        _ => "_unknown",
    }
}

/// `<img_id><suffix>.jpg`, matching `create_name`'s on-disk naming convention.
fn output_filename(img_id: &str, res: usize) -> String {
    format!("{img_id}{}.jpg", resolution_suffix(res))
}

pub fn read(matches: &ArgMatches) -> ImgfsResult<()> {
    let store_path = matches.get_one::<String>("store").ok_or(ImgFsError::NotEnoughArguments)?;
    let img_id = matches.get_one::<String>("img_id").ok_or(ImgFsError::NotEnoughArguments)?;
    let resolution_name = matches.get_one::<String>("resolution").map(String::as_str).unwrap_or("original");
    let res = resolution_from_name(resolution_name)?;

    let mut store = StoreHandle::open(store_path, true)?;
    let bytes = ops::read(&mut store, img_id, res)?;
    drop(store);

    let out_name = output_filename(img_id, res);
    std::fs::write(&out_name, &bytes)?;
    println!("{out_name} written");
    Ok(())
}

pub fn insert(matches: &ArgMatches) -> ImgfsResult<()> {
    let store_path = matches.get_one::<String>("store").ok_or(ImgFsError::NotEnoughArguments)?;
    let img_id = matches.get_one::<String>("img_id").ok_or(ImgFsError::NotEnoughArguments)?;
    let filename = matches.get_one::<String>("filename").ok_or(ImgFsError::NotEnoughArguments)?;

    let bytes = std::fs::read(filename)?;
    let mut store = StoreHandle::open(store_path, true)?;
    ops::insert(&mut store, img_id, &bytes)?;
    println!("{img_id} inserted into {store_path}");
    Ok(())
}

pub fn delete(matches: &ArgMatches) -> ImgfsResult<()> {
    let store_path = matches.get_one::<String>("store").ok_or(ImgFsError::NotEnoughArguments)?;
    let img_id = matches.get_one::<String>("img_id").ok_or(ImgFsError::NotEnoughArguments)?;

    if img_id.is_empty() || img_id.len() >= crate::layout::MAX_IMG_ID {
        return Err(ImgFsError::InvalidImgId);
    }

    let mut store = StoreHandle::open(store_path, true)?;
    ops::delete(&mut store, img_id)?;
    println!("{img_id} deleted from {store_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_name_mapping() {
        assert_eq!(resolution_from_name("orig").unwrap(), ORIG_RES);
        assert_eq!(resolution_from_name("thumb").unwrap(), THUMB_RES);
        assert_eq!(resolution_from_name("small").unwrap(), SMALL_RES);
        assert!(resolution_from_name("bogus").is_err());
    }

    #[test]
    fn output_filename_matches_convention() {
        assert_eq!(output_filename("pic1", ORIG_RES), "pic1_orig.jpg");
        assert_eq!(output_filename("pic1", THUMB_RES), "pic1_thumb.jpg");
        assert_eq!(output_filename("pic1", SMALL_RES), "pic1_small.jpg");
    }

    #[test]
    fn resolution_bounds_enforced() {
        assert!(validate_resolution(0, 10, MAX_THUMB_RES).is_err());
        assert!(validate_resolution(200, 10, MAX_THUMB_RES).is_err());
        assert!(validate_resolution(64, 64, MAX_THUMB_RES).is_ok());
    }
}
