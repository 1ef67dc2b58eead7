use crate::config::FsConfig;
use crate::error::{FsdataError, Result};
use crate::walk::enumerate::file_ext;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Header lines always terminate with CRLF; this is a protocol requirement,
/// not a host text convention.
const CRLF: &str = "\r\n";

/// Extensions whose responses are computed at serve time, so no
/// Content-Length can be embedded ahead of time.
const SSI_EXTENSIONS: [&str; 3] = [".shtml", ".shtm", ".ssi"];

const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

pub fn is_ssi_file(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    SSI_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "html" | "htm" | "shtml" | "shtm" | "ssi" => "text/html",
        "gif" => "image/gif",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "class" | "cls" => "application/octet-stream",
        "js" => "application/x-javascript",
        "css" => "text/css",
        "swf" => "application/x-shockwave-flash",
        "xml" => "text/xml",
        _ => "text/plain",
    }
}

pub struct HeaderParams<'a> {
    /// File basename; status line selection keys off its prefix.
    pub file_name: &'a str,
    /// Byte count of the payload as stored (after any compression).
    pub content_len: usize,
    pub mtime: Option<SystemTime>,
    pub is_ssi: bool,
    pub is_compressed: bool,
}

fn status_text(file_name: &str) -> &'static str {
    if file_name.starts_with("404") {
        "404 File not found"
    } else if file_name.starts_with("400") {
        "400 Bad Request"
    } else if file_name.starts_with("501") {
        "501 Not Implemented"
    } else {
        "200 OK"
    }
}

/// Build the exact byte sequence of the synthetic HTTP response preamble
/// stored ahead of a file's payload.
pub fn build_http_header(p: &HeaderParams<'_>, cfg: &FsConfig) -> Result<Vec<u8>> {
    let proto = if cfg.use_http11 { "HTTP/1.1" } else { "HTTP/1.0" };

    let mut h = String::new();
    h.push_str(proto);
    h.push(' ');
    h.push_str(status_text(p.file_name));
    h.push_str(CRLF);

    h.push_str("Server: ");
    h.push_str(&cfg.server_id);
    h.push_str(CRLF);

    if !p.is_ssi {
        h.push_str("Content-Length: ");
        h.push_str(&p.content_len.to_string());
        h.push_str(CRLF);
    }

    if cfg.include_last_modified {
        if let Some(mtime) = p.mtime {
            let stamp = OffsetDateTime::from(mtime)
                .format(&HTTP_DATE)
                .map_err(|e| FsdataError::Format(format!("http date: {e}")))?;
            h.push_str("Last-Modified: ");
            h.push_str(&stamp);
            h.push_str(CRLF);
        }
    }

    if cfg.use_http11 {
        h.push_str(if p.is_ssi {
            "Connection: close"
        } else {
            "Connection: keep-alive"
        });
        h.push_str(CRLF);
    }

    if p.is_compressed {
        h.push_str("Content-Encoding: deflate");
        h.push_str(CRLF);
    }

    // lwIP spells it "Content-type"; the blank line closes the header block.
    h.push_str("Content-type: ");
    h.push_str(content_type_for(&file_ext(p.file_name)));
    h.push_str(CRLF);
    h.push_str(CRLF);

    Ok(h.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(file_name: &'a str) -> HeaderParams<'a> {
        HeaderParams {
            file_name,
            content_len: 13,
            mtime: None,
            is_ssi: false,
            is_compressed: false,
        }
    }

    fn header_string(p: &HeaderParams<'_>, cfg: &FsConfig) -> String {
        String::from_utf8(build_http_header(p, cfg).unwrap()).unwrap()
    }

    #[test]
    fn plain_http10_header() {
        let cfg = FsConfig::default();
        let h = header_string(&params("index.html"), &cfg);
        assert!(h.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(h.contains("Server: lwIP/1.3.1"));
        assert!(h.contains("Content-Length: 13\r\n"));
        assert!(!h.contains("Connection:"));
        assert!(h.ends_with("Content-type: text/html\r\n\r\n"));
    }

    #[test]
    fn status_by_filename_prefix() {
        let cfg = FsConfig::default();
        assert!(header_string(&params("404.html"), &cfg).starts_with("HTTP/1.0 404 File not found\r\n"));
        assert!(header_string(&params("400.html"), &cfg).starts_with("HTTP/1.0 400 Bad Request\r\n"));
        assert!(header_string(&params("501.html"), &cfg).starts_with("HTTP/1.0 501 Not Implemented\r\n"));
    }

    #[test]
    fn ssi_under_http11_closes_and_omits_length() {
        let cfg = FsConfig {
            use_http11: true,
            ..Default::default()
        };
        let mut p = params("page.shtml");
        p.is_ssi = true;
        let h = header_string(&p, &cfg);
        assert!(h.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(!h.contains("Content-Length"));
        assert!(h.contains("Connection: close\r\n"));
    }

    #[test]
    fn non_ssi_under_http11_keeps_alive() {
        let cfg = FsConfig {
            use_http11: true,
            ..Default::default()
        };
        let h = header_string(&params("index.html"), &cfg);
        assert!(h.contains("Connection: keep-alive\r\n"));
    }

    #[test]
    fn compressed_payload_advertises_deflate() {
        let cfg = FsConfig::default();
        let mut p = params("app.js");
        p.is_compressed = true;
        let h = header_string(&p, &cfg);
        assert!(h.contains("Content-Encoding: deflate\r\n"));
        assert!(h.ends_with("Content-type: application/x-javascript\r\n\r\n"));
    }

    #[test]
    fn last_modified_uses_rfc1123_gmt() {
        let cfg = FsConfig {
            include_last_modified: true,
            ..Default::default()
        };
        let mut p = params("index.html");
        p.mtime = Some(SystemTime::UNIX_EPOCH);
        let h = header_string(&p, &cfg);
        assert!(h.contains("Last-Modified: Thu, 01 Jan 1970 00:00:00 GMT\r\n"));
    }

    #[test]
    fn last_modified_omitted_when_mtime_unavailable() {
        let cfg = FsConfig {
            include_last_modified: true,
            ..Default::default()
        };
        // mtime is None; the rest of the header is still emitted.
        let h = header_string(&params("index.html"), &cfg);
        assert!(!h.contains("Last-Modified"));
        assert!(h.ends_with("Content-type: text/html\r\n\r\n"));
    }

    #[test]
    fn every_line_ends_with_crlf() {
        let cfg = FsConfig {
            use_http11: true,
            include_last_modified: true,
            ..Default::default()
        };
        let mut p = params("index.html");
        p.mtime = Some(SystemTime::UNIX_EPOCH);
        let h = header_string(&p, &cfg);
        for line in h.split_inclusive("\r\n") {
            assert!(line.ends_with("\r\n"), "line without CRLF: {line:?}");
            assert!(!line.trim_end_matches("\r\n").contains('\n'));
        }
    }

    #[test]
    fn ssi_detection_by_extension() {
        assert!(is_ssi_file("page.shtml"));
        assert!(is_ssi_file("PAGE.SHTM"));
        assert!(is_ssi_file("inc.ssi"));
        assert!(!is_ssi_file("page.html"));
    }

    #[test]
    fn unknown_extension_falls_back_to_text_plain() {
        assert_eq!(content_type_for("weird"), "text/plain");
        assert_eq!(content_type_for(""), "text/plain");
    }
}
