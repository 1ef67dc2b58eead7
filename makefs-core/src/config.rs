use crate::error::{FsdataError, Result};
use std::path::PathBuf;

pub const DEFAULT_SERVER_AGENT: &str = "lwIP/1.3.1 (http://savannah.nongnu.org/projects/lwip)";
pub const DEFAULT_TARGET_FILENAME: &str = "fsdata.c";
pub const DEFAULT_TARGET_DIR: &str = "fs";

/// Highest level accepted on the tool surface; anything above the zlib
/// maximum (9) maps to the strongest supported setting.
pub const MAX_DEFLATE_LEVEL: u8 = 10;

#[derive(Clone, Debug)]
pub struct FsConfig {
    /// Directory whose files become the filesystem image.
    pub target_dir: PathBuf,
    pub process_subdirs: bool,
    /// Embed a synthetic HTTP response header ahead of each payload.
    pub include_http_header: bool,
    /// Emit HTTP/1.1 headers instead of HTTP/1.0.
    pub use_http11: bool,
    pub target_filename: PathBuf,
    pub include_last_modified: bool,
    /// Value of the `Server:` response line.
    pub server_id: String,
    /// Lowercase extensions (no leading dot) excluded from the image.
    pub exclude_exts: Vec<String>,
    /// Lowercase extensions never compressed even when deflate is on.
    pub ncompress_exts: Vec<String>,
    pub deflate_files: bool,
    pub deflate_level: u8,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
            process_subdirs: true,
            include_http_header: true,
            use_http11: false,
            target_filename: PathBuf::from(DEFAULT_TARGET_FILENAME),
            include_last_modified: false,
            server_id: DEFAULT_SERVER_AGENT.to_string(),
            exclude_exts: Vec::new(),
            ncompress_exts: Vec::new(),
            deflate_files: false,
            deflate_level: MAX_DEFLATE_LEVEL,
        }
    }
}

impl FsConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.target_dir.is_dir() {
            return Err(FsdataError::Config(format!(
                "invalid path: '{}'. Directory not found.",
                self.target_dir.display()
            )));
        }
        if self.deflate_level > MAX_DEFLATE_LEVEL {
            return Err(FsdataError::Config(format!(
                "deflate level must be in 0..={MAX_DEFLATE_LEVEL}"
            )));
        }
        Ok(())
    }
}

/// Normalize a comma separated extension list: trimmed, lowercased, no
/// leading dot, empty items dropped.
pub fn parse_ext_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}
