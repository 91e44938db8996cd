//! # Request/Response Codec
//!
//! A deliberately small HTTP/1.1 subset: a request line, `Key: Value`
//! headers terminated by a blank line, and an optional body whose length
//! comes from `Content-Length`. Ported from `original_source/src/http_prot.c`
//! and `http_net.c`, with one fix: the original reads the body with a single
//! extra `recv()` call sized exactly to `Content-Length`, which on a real TCP
//! stream is not guaranteed to return that many bytes in one call. This
//! codec instead reports [`ParseOutcome::NeedMore`] until the accumulated
//! buffer actually holds the full body, so the caller's read loop (see
//! [`super::net`]) keeps reading until the request is complete.

use std::collections::BTreeMap;

use crate::error::{ImgFsError, ImgfsResult};

const HEADER_END: &str = "\r\n\r\n";
const LINE_END: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

pub enum ParseOutcome {
    /// A full request was decoded; `usize` is how many bytes of `buf` it consumed.
    Complete(Request, usize),
    /// The buffer does not yet hold a complete request.
    NeedMore,
}

/// Attempts to decode one request from the front of `buf`. Never blocks and
/// never consumes partial input — the caller owns buffering and retrying.
pub fn try_parse(buf: &[u8]) -> ImgfsResult<ParseOutcome> {
    let header_end = match find_subslice(buf, HEADER_END.as_bytes()) {
        Some(pos) => pos,
        None => return Ok(ParseOutcome::NeedMore),
    };

    let head = std::str::from_utf8(&buf[..header_end]).map_err(|_| ImgFsError::Io(
        std::io::Error::new(std::io::ErrorKind::InvalidData, "request head is not valid UTF-8"),
    ))?;
    let mut lines = head.split(LINE_END);

    let request_line = lines.next().ok_or(ImgFsError::InvalidCommand)?;
    let mut parts = request_line.split(' ');
    let method = match parts.next() {
        Some("GET") => Method::Get,
        Some("POST") => Method::Post,
        _ => return Err(ImgFsError::InvalidCommand),
    };
    let uri = parts.next().ok_or(ImgFsError::InvalidCommand)?;

    let mut content_length: usize = 0;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("Content-Length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let body_start = header_end + HEADER_END.len();
    let total_needed = body_start + content_length;
    if buf.len() < total_needed {
        return Ok(ParseOutcome::NeedMore);
    }

    let (path, query) = split_uri(uri);
    let body = buf[body_start..total_needed].to_vec();

    Ok(ParseOutcome::Complete(
        Request { method, path, query, body },
        total_needed,
    ))
}

fn split_uri(uri: &str) -> (String, BTreeMap<String, String>) {
    match uri.split_once('?') {
        Some((path, qs)) => (path.to_string(), parse_query(qs)),
        None => (uri.to_string(), BTreeMap::new()),
    }
}

fn parse_query(qs: &str) -> BTreeMap<String, String> {
    qs.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Builds a complete HTTP/1.1 response: status line, `Content-Type` and
/// `Content-Length` headers, blank line, body.
pub fn build_response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    let mut out = head.into_bytes();
    out.extend_from_slice(body);
    out
}

/// Builds a bodyless `302 Found` redirect to `location`, matching
/// `reply_302_msg`'s `Location:` header.
pub fn build_redirect(location: &str) -> Vec<u8> {
    format!("HTTP/1.1 302 Found\r\nLocation: {location}\r\nContent-Length: 0\r\n\r\n").into_bytes()
}

/// Maps a store error onto one of the status lines `reply_error_msg`/
/// `http_serve_file` use: every error becomes `500 Internal Server Error`
/// except a missing image, which is `404 Not Found`.
pub fn status_for_error(err: &ImgFsError) -> &'static str {
    match err {
        ImgFsError::ImageNotFound => "404 Not Found",
        _ => "500 Internal Server Error",
    }
}
