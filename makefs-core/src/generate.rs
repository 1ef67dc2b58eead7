use crate::codec::deflate::{self, DeflateStats};
use crate::config::FsConfig;
use crate::emit::artifact::ArtifactWriter;
use crate::emit::record::{self, FileFlags, FileRecord};
use crate::error::Result;
use crate::http::header::{self, HeaderParams};
use crate::naming::SymbolTable;
use crate::walk::enumerate::{enumerate, file_ext};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result of one generator run.
#[derive(Debug)]
pub struct GenOutcome {
    pub files_written: usize,
    /// True when the cancellation token stopped the run early. The artifact
    /// written is still valid, just smaller.
    pub interrupted: bool,
    pub stats: DeflateStats,
}

/// Compile `cfg.target_dir` into a single fsdata artifact.
///
/// Files are processed strictly in enumeration order; each record references
/// the symbol of the one before it, so there is nothing to parallelize. The
/// cancellation token is checked between files only.
pub fn generate(cfg: &FsConfig, cancel: Option<&AtomicBool>) -> Result<GenOutcome> {
    cfg.validate()?;

    let entries = enumerate(&cfg.target_dir, cfg.process_subdirs, &cfg.exclude_exts)?;

    let mut artifact = ArtifactWriter::new(&cfg.target_filename)?;
    let mut symbols = SymbolTable::new();
    let mut stats = DeflateStats::default();
    let mut interrupted = false;

    for entry in &entries {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            interrupted = true;
            break;
        }
        println!("processing {}...", entry.qualified_name);

        let file_name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_ssi = header::is_ssi_file(&file_name);

        let raw = fs::read(&entry.path)?;
        let raw_size = raw.len();

        let mut content = raw;
        let mut compressed = false;
        if cfg.deflate_files {
            let eligible = cfg.include_http_header
                && !is_ssi
                && !cfg.ncompress_exts.iter().any(|x| *x == file_ext(&file_name));
            if let Some(smaller) =
                deflate::transform(&content, eligible, cfg.deflate_level, &mut stats)
            {
                content = smaller;
                compressed = true;
            }
        }

        let header_bytes = if cfg.include_http_header {
            let mtime = if cfg.include_last_modified {
                match fs::metadata(&entry.path)?.modified() {
                    Ok(t) => Some(t),
                    Err(e) => {
                        eprintln!(
                            "warning: no modification time for {}: {e}",
                            entry.path.display()
                        );
                        None
                    }
                }
            } else {
                None
            };
            Some(header::build_http_header(
                &HeaderParams {
                    file_name: &file_name,
                    content_len: content.len(),
                    mtime,
                    is_ssi,
                    is_compressed: compressed,
                },
                cfg,
            )?)
        } else {
            None
        };

        let symbol = symbols.issue(&entry.qualified_name)?;
        let layout = record::write_data_block(
            artifact.data_out(),
            &symbol,
            &entry.qualified_name,
            header_bytes.as_deref(),
            &content,
        )?;

        artifact.push(FileRecord {
            qualified_name: entry.qualified_name.clone(),
            symbol,
            payload_offset: layout.payload_offset,
            block_len: layout.block_len,
            raw_size,
            final_size: content.len(),
            compressed,
            flags: FileFlags::for_file(cfg.include_http_header, is_ssi, cfg.use_http11),
        });
    }

    let files_written = artifact.len();
    println!("\nCreating target file...\n");
    artifact.finish()?;

    println!("Processed {files_written} files.");
    if cfg.deflate_files && stats.bytes_considered > 0 {
        println!(
            "(deflate saved {} of {} bytes, {:.2}% reduction)",
            stats.bytes_saved,
            stats.bytes_considered,
            stats.reduction_percent()
        );
    }

    Ok(GenOutcome {
        files_written,
        interrupted,
        stats,
    })
}
