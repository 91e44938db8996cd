//! End-to-end CLI scenarios, driven through the real `imgfs` binary the way
//! the teacher's `tests/cli_test.rs` drives `a2kit`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn imgfs() -> Command {
    Command::cargo_bin("imgfs").unwrap()
}

fn write_jpeg(dir: &TempDir, name: &str, w: u32, h: u32) -> std::path::PathBuf {
    use image::{ImageBuffer, Rgb};
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 50]));
    let path = dir.path().join(name);
    img.save_with_format(&path, image::ImageFormat::Jpeg).unwrap();
    path
}

#[test]
fn create_reports_success() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path().to_str().unwrap();
    std::fs::remove_file(path).ok();

    imgfs()
        .args(["create", path, "--max_files", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("file created"));
}

#[test]
fn create_rejects_zero_max_files() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path().to_str().unwrap();
    std::fs::remove_file(path).ok();

    imgfs()
        .args(["create", path, "--max_files", "0"])
        .assert()
        .failure();
}

#[test]
fn full_insert_list_read_delete_cycle() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store.imgfs");
    let store_path = store.to_str().unwrap();

    imgfs().args(["create", store_path]).assert().success();

    let image_path = write_jpeg(&dir, "photo.jpg", 120, 80);

    imgfs()
        .args(["insert", store_path, "pic1", image_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("inserted"));

    imgfs()
        .args(["list", store_path])
        .assert()
        .success()
        .stdout(predicate::str::contains("pic1"));

    let current_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let read_result = imgfs().args(["read", store_path, "pic1", "thumb"]).assert().success();
    std::env::set_current_dir(current_dir).unwrap();
    read_result.stdout(predicate::str::contains("pic1_thumb.jpg"));
    assert!(dir.path().join("pic1_thumb.jpg").exists());

    imgfs()
        .args(["delete", store_path, "pic1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));

    imgfs()
        .args(["list", store_path])
        .assert()
        .success()
        .stdout(predicate::str::contains("empty imgFS"));
}

#[test]
fn insert_duplicate_id_fails() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store.imgfs");
    let store_path = store.to_str().unwrap();
    imgfs().args(["create", store_path]).assert().success();

    let image_path = write_jpeg(&dir, "photo.jpg", 40, 40);
    imgfs()
        .args(["insert", store_path, "pic1", image_path.to_str().unwrap()])
        .assert()
        .success();
    imgfs()
        .args(["insert", store_path, "pic1", image_path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn read_missing_image_fails() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store.imgfs");
    let store_path = store.to_str().unwrap();
    imgfs().args(["create", store_path]).assert().success();

    imgfs().args(["read", store_path, "ghost"]).assert().failure();
}

#[test]
fn help_prints_usage() {
    imgfs()
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create <imgFS_filename>"));
}

#[test]
fn missing_subcommand_shows_help_and_fails() {
    imgfs().assert().failure();
}

#[test]
fn insert_with_non_jpeg_file_fails() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store.imgfs");
    let store_path = store.to_str().unwrap();
    imgfs().args(["create", store_path]).assert().success();

    let mut not_jpeg = NamedTempFile::new().unwrap();
    not_jpeg.write_all(b"not an image").unwrap();

    imgfs()
        .args(["insert", store_path, "pic1", not_jpeg.path().to_str().unwrap()])
        .assert()
        .failure();
}
