//! `imgfs-server` entry point: opens a store read-write, binds a TCP
//! listener, and serves requests until SIGINT/SIGTERM arrives.
//!
//! Usage: `imgfs-server <imgFS_filename> [port]`, matching
//! `original_source/src/imgfs_server.c`'s `server_startup`.

use std::net::TcpListener;

use imgfs::error::ImgFsError;
use imgfs::server::net::{self, DEFAULT_PORT};
use imgfs::store::StoreHandle;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run() -> Result<(), ImgFsError> {
    let mut args = std::env::args().skip(1);
    let store_path = args.next().ok_or(ImgFsError::NotEnoughArguments)?;
    let port: u16 = args
        .next()
        .map(|s| s.parse().map_err(|_| ImgFsError::InvalidArgument))
        .transpose()?
        .unwrap_or(DEFAULT_PORT);

    let mut store = StoreHandle::open(&store_path, true)?;
    log::info!(
        "opened {} ({}/{} files)",
        store_path, store.header.nb_files, store.header.max_files
    );

    let listener = TcpListener::bind(("127.0.0.1", port))?;
    log::info!("imgFS server started on http://localhost:{port}");

    let shutdown = net::install_shutdown_flag();
    net::serve(listener, &mut store, shutdown)?;

    log::info!("shutting down");
    Ok(())
}
