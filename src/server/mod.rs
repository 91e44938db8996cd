//! # Request Dispatcher
//!
//! Routes a decoded [`protocol::Request`] onto the store operations in
//! [`crate::ops`], the way `imgfs_server_service.c::handle_http_message`
//! routes on `URI_ROOT "/list"`, `"/read"`, `"/insert"`, `"/delete"`, falling
//! back to serving the bundled static page for `/` and `/index.html`.

pub mod net;
pub mod protocol;

use log::warn;

use crate::error::{ImgFsError, ImgfsResult};
use crate::ops;
use crate::store::StoreHandle;
use protocol::{Method, ParseOutcome, Request};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Looks up a bundled static asset by path. Only `/` and `/index.html` are
/// ever bound; anything else falls through to a 404, mirroring
/// `http_serve_file`'s behavior when `fopen` fails rather than surfacing it
/// as an `Io` error.
fn serve_static(path: &str) -> Option<&'static str> {
    match path {
        "/" | "/index.html" => Some(INDEX_HTML),
        _ => None,
    }
}

/// Decodes one request out of `buf` and, if complete, dispatches it and
/// returns `(response_bytes, bytes_consumed)`. `NeedMore` bubbles straight
/// back up so [`net::serve`] keeps reading off the socket.
pub fn handle(store: &mut StoreHandle, buf: &[u8]) -> ImgfsResult<Option<(Vec<u8>, usize)>> {
    match protocol::try_parse(buf)? {
        ParseOutcome::NeedMore => Ok(None),
        ParseOutcome::Complete(req, consumed) => {
            let response = dispatch(store, &req);
            Ok(Some((response, consumed)))
        }
    }
}

fn dispatch(store: &mut StoreHandle, req: &Request) -> Vec<u8> {
    if let Some(page) = serve_static(&req.path) {
        return protocol::build_response("200 OK", "text/html; charset=utf-8", page.as_bytes());
    }

    let result = route(store, req);
    match result {
        Ok(response) => response,
        Err(err) => {
            warn!("request to {} failed: {err}", req.path);
            let status = protocol::status_for_error(&err);
            protocol::build_response(status, "text/plain", format!("Error: {err}\n").as_bytes())
        }
    }
}

fn route(store: &mut StoreHandle, req: &Request) -> ImgfsResult<Vec<u8>> {
    match (req.method, req.path.as_str()) {
        (Method::Get, "/imgfs/list") => handle_list(store),
        (Method::Get, "/imgfs/read") => handle_read(store, req),
        (Method::Post, "/imgfs/insert") => handle_insert(store, req),
        (Method::Get, "/imgfs/delete") => handle_delete(store, req),
        _ => Err(ImgFsError::InvalidCommand),
    }
}

fn handle_list(store: &mut StoreHandle) -> ImgfsResult<Vec<u8>> {
    let infos = ops::list(store);
    let body = serde_json::json!({ "Images": infos }).to_string();
    Ok(protocol::build_response("200 OK", "application/json", body.as_bytes()))
}

fn handle_read(store: &mut StoreHandle, req: &Request) -> ImgfsResult<Vec<u8>> {
    let img_id = req.query_param("img_id").ok_or(ImgFsError::NotEnoughArguments)?;
    let res_name = req.query_param("res").ok_or(ImgFsError::NotEnoughArguments)?;
    let res = crate::commands::resolution_from_name(res_name)?;
    let bytes = ops::read(store, img_id, res)?;
    Ok(protocol::build_response("200 OK", "image/jpeg", &bytes))
}

fn handle_insert(store: &mut StoreHandle, req: &Request) -> ImgfsResult<Vec<u8>> {
    let img_id = req.query_param("img_id").ok_or(ImgFsError::NotEnoughArguments)?;
    ops::insert(store, img_id, &req.body)?;
    Ok(protocol::build_redirect("/index.html"))
}

fn handle_delete(store: &mut StoreHandle, req: &Request) -> ImgfsResult<Vec<u8>> {
    let img_id = req.query_param("img_id").ok_or(ImgFsError::NotEnoughArguments)?;
    ops::delete(store, img_id)?;
    Ok(protocol::build_redirect("/index.html"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use image::{ImageBuffer, Rgb};
    use tempfile::NamedTempFile;

    fn cfg() -> StoreConfig {
        StoreConfig { max_files: 4, resized_res: [[32, 32], [96, 96], [0, 0]] }
    }

    fn sample_jpeg(w: u32, h: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 10]));
        let mut buf = Vec::new();
        let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
        enc.encode(&img, w, h, image::ColorType::Rgb8.into()).unwrap();
        buf
    }

    #[test]
    fn index_is_served() {
        let tmp = NamedTempFile::new().unwrap();
        let mut store = StoreHandle::create(tmp.path(), cfg()).unwrap();
        let (resp, consumed) = handle(&mut store, b"GET / HTTP/1.1\r\n\r\n").unwrap().unwrap();
        assert_eq!(consumed, b"GET / HTTP/1.1\r\n\r\n".len());
        let text = String::from_utf8(resp).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("imgfs"));
    }

    #[test]
    fn unknown_route_is_500() {
        let tmp = NamedTempFile::new().unwrap();
        let mut store = StoreHandle::create(tmp.path(), cfg()).unwrap();
        let (resp, _) = handle(&mut store, b"GET /nope HTTP/1.1\r\n\r\n").unwrap().unwrap();
        let text = String::from_utf8(resp).unwrap();
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn insert_then_list_then_read_over_the_wire() {
        let tmp = NamedTempFile::new().unwrap();
        let mut store = StoreHandle::create(tmp.path(), cfg()).unwrap();
        let jpeg = sample_jpeg(40, 20);

        let insert_req = format!(
            "POST /imgfs/insert?img_id=pic1 HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            jpeg.len()
        );
        let mut buf = insert_req.into_bytes();
        buf.extend_from_slice(&jpeg);
        let (resp, consumed) = handle(&mut store, &buf).unwrap().unwrap();
        assert_eq!(consumed, buf.len());
        let insert_text = String::from_utf8(resp).unwrap();
        assert!(insert_text.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(insert_text.contains("Location: /index.html\r\n"));

        let (list_resp, _) = handle(&mut store, b"GET /imgfs/list HTTP/1.1\r\n\r\n").unwrap().unwrap();
        let list_text = String::from_utf8(list_resp).unwrap();
        assert!(list_text.contains("pic1"));

        let (read_resp, _) = handle(
            &mut store,
            b"GET /imgfs/read?img_id=pic1&res=orig HTTP/1.1\r\n\r\n",
        )
        .unwrap()
        .unwrap();
        let read_text = String::from_utf8_lossy(&read_resp);
        assert!(read_text.starts_with("HTTP/1.1 200 OK\r\nContent-Type: image/jpeg"));
    }

    #[test]
    fn read_missing_image_is_404() {
        let tmp = NamedTempFile::new().unwrap();
        let mut store = StoreHandle::create(tmp.path(), cfg()).unwrap();
        let (resp, _) = handle(
            &mut store,
            b"GET /imgfs/read?img_id=ghost&res=thumb HTTP/1.1\r\n\r\n",
        )
        .unwrap()
        .unwrap();
        assert!(String::from_utf8(resp).unwrap().starts_with("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn partial_request_needs_more() {
        let tmp = NamedTempFile::new().unwrap();
        let mut store = StoreHandle::create(tmp.path(), cfg()).unwrap();
        assert!(handle(&mut store, b"GET /imgfs/list HTTP/1.1\r\n").unwrap().is_none());
    }
}
