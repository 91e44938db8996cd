//! # Listener Glue
//!
//! A single-threaded accept loop over `std::net::TcpListener`, plus SIGINT/
//! SIGTERM handling that flips a shared flag rather than calling `exit()`
//! from the signal handler itself — `original_source/src/imgfs_server.c`'s
//! `signal_handler` runs `server_shutdown()` straight from the handler, which
//! is fine in C's single-threaded accept loop but is not a pattern Rust's
//! signal-safety rules want you imitating directly; `ctrlc` runs the handler
//! on its own thread, so we hand it nothing but an `AtomicBool` to flip.
//!
//! There is exactly one store handle and exactly one thread touching it, for
//! the whole lifetime of the server — no locks, per the store's single-writer
//! invariant.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::ImgfsResult;
use crate::store::StoreHandle;

pub const DEFAULT_PORT: u16 = 8000;
const READ_CHUNK: usize = 8192;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Installs a SIGINT/SIGTERM handler that flips the returned flag. Call once,
/// before entering [`serve`].
pub fn install_shutdown_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let for_handler = flag.clone();
    ctrlc::set_handler(move || {
        info!("shutdown signal received");
        for_handler.store(true, Ordering::SeqCst);
    })
    .expect("failed to install SIGINT/SIGTERM handler");
    flag
}

/// Runs the accept loop until `shutdown` is set, serving each connection to
/// completion (one request, one response) before accepting the next — there
/// is only one store handle and no concurrency to hand connections off to.
pub fn serve(listener: TcpListener, store: &mut StoreHandle, shutdown: Arc<AtomicBool>) -> ImgfsResult<()> {
    listener.set_nonblocking(true)?;

    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("connection from {addr}");
                if let Err(err) = handle_connection(stream, store) {
                    warn!("connection from {addr} failed: {err}");
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => return Err(err.into()),
        }
    }
    info!("accept loop stopped");
    Ok(())
}

fn handle_connection(mut stream: TcpStream, store: &mut StoreHandle) -> ImgfsResult<()> {
    stream.set_nonblocking(false)?;
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        if let Some((response, consumed)) = super::handle(store, &buf)? {
            stream.write_all(&response)?;
            buf.drain(..consumed);
            return Ok(());
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            // peer closed before sending a complete request
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
