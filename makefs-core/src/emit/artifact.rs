use crate::emit::record::{FileRecord, write_struct_decl};
use crate::error::Result;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Scratch stream holding the byte-array declarations.
pub const SCRATCH_DATA: &str = "fsdata.tmp";
/// Scratch stream holding the metadata-record declarations.
pub const SCRATCH_STRUCT: &str = "fshdr.tmp";

/// Removes the scratch files when dropped, so every exit path cleans up.
/// Removal failure is a warning, never fatal.
struct ScratchGuard {
    paths: [PathBuf; 2],
    armed: bool,
}

impl ScratchGuard {
    fn cleanup(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        for path in &self.paths {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    eprintln!("warning: failed to remove {}: {e}", path.display());
                }
            }
        }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Aggregates per-file output into the final artifact.
///
/// Byte blocks stream into the data scratch file as files are processed;
/// metadata records are collected in order and linked only at `finish`,
/// where the struct scratch file is written and the two streams are
/// concatenated byte-exact into the target. The two-stream layout exists so
/// every byte-array declaration precedes every record declaration in the
/// final artifact.
pub struct ArtifactWriter {
    target: PathBuf,
    data_path: PathBuf,
    struct_path: PathBuf,
    data: BufWriter<File>,
    records: Vec<FileRecord>,
    guard: ScratchGuard,
}

fn write_preamble(w: &mut dyn Write) -> io::Result<()> {
    w.write_all(b"#include \"lwip/apps/fs.h\"\n")?;
    w.write_all(b"#include \"lwip/def.h\"\n\n\n")?;
    w.write_all(b"#define file_NULL (struct fsdata_file *) NULL\n\n\n")?;
    w.write_all(b"#ifndef FS_FILE_FLAGS_HEADER_INCLUDED\n")?;
    w.write_all(b"#define FS_FILE_FLAGS_HEADER_INCLUDED 1\n")?;
    w.write_all(b"#endif\n")?;
    w.write_all(b"#ifndef FS_FILE_FLAGS_HEADER_PERSISTENT\n")?;
    w.write_all(b"#define FS_FILE_FLAGS_HEADER_PERSISTENT 0\n")?;
    w.write_all(b"#endif\n")?;
    w.write_all(b"#ifndef FS_FILE_FLAGS_HEADER_HTTPVER_1_1\n")?;
    w.write_all(b"#define FS_FILE_FLAGS_HEADER_HTTPVER_1_1 0x04\n")?;
    w.write_all(b"#endif\n")?;
    w.write_all(b"#ifndef FSDATA_ALIGN_PRE\n#define FSDATA_ALIGN_PRE\n#endif\n")?;
    w.write_all(b"#ifndef FSDATA_ALIGN_POST\n#define FSDATA_ALIGN_POST\n#endif\n\n")?;
    Ok(())
}

impl ArtifactWriter {
    /// Open the scratch streams next to `target` and write the preamble.
    pub fn new(target: &Path) -> Result<Self> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let data_path = dir.join(SCRATCH_DATA);
        let struct_path = dir.join(SCRATCH_STRUCT);

        let guard = ScratchGuard {
            paths: [data_path.clone(), struct_path.clone()],
            armed: true,
        };

        let mut data = BufWriter::new(File::create(&data_path)?);
        write_preamble(&mut data)?;

        Ok(Self {
            target: target.to_path_buf(),
            data_path,
            struct_path,
            data,
            records: Vec::new(),
            guard,
        })
    }

    /// Stream destination for the current file's byte block.
    pub fn data_out(&mut self) -> &mut BufWriter<File> {
        &mut self.data
    }

    pub fn push(&mut self, record: FileRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Link the record chain, write the struct stream and closing constants,
    /// and merge both scratch streams into the target artifact.
    pub fn finish(mut self) -> Result<()> {
        self.data.flush()?;

        let mut structs = BufWriter::new(File::create(&self.struct_path)?);
        let mut prev: Option<&str> = None;
        for rec in &self.records {
            write_struct_decl(&mut structs, rec, prev)?;
            prev = Some(&rec.symbol);
        }
        writeln!(structs, "#define FS_ROOT file_{}", prev.unwrap_or("NULL"))?;
        writeln!(structs, "#define FS_NUMFILES {}\n", self.records.len())?;
        structs.flush()?;
        drop(structs);

        let mut out = File::create(&self.target)?;
        for path in [&self.data_path, &self.struct_path] {
            let mut src = File::open(path)?;
            io::copy(&mut src, &mut out)?;
        }

        self.guard.cleanup();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::record::{FileFlags, write_data_block};

    fn record(symbol: &str, payload_offset: usize, block_len: usize) -> FileRecord {
        FileRecord {
            qualified_name: format!("/{symbol}"),
            symbol: symbol.to_string(),
            payload_offset,
            block_len,
            raw_size: block_len - payload_offset,
            final_size: block_len - payload_offset,
            compressed: false,
            flags: FileFlags::NONE,
        }
    }

    #[test]
    fn empty_run_still_emits_closing_constants() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("fsdata.c");
        let w = ArtifactWriter::new(&target).unwrap();
        w.finish().unwrap();

        let text = fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("#include \"lwip/apps/fs.h\"\n"));
        assert!(text.contains("#define FS_ROOT file_NULL\n"));
        assert!(text.contains("#define FS_NUMFILES 0\n"));
        assert!(!tmp.path().join(SCRATCH_DATA).exists());
        assert!(!tmp.path().join(SCRATCH_STRUCT).exists());
    }

    #[test]
    fn records_link_in_reverse_and_arrays_precede_structs() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("fsdata.c");
        let mut w = ArtifactWriter::new(&target).unwrap();

        for sym in ["_a_html", "_b_html"] {
            let layout =
                write_data_block(w.data_out(), sym, &format!("/{sym}"), None, b"hi").unwrap();
            w.push(record(sym, layout.payload_offset, layout.block_len));
        }
        w.finish().unwrap();

        let text = fs::read_to_string(&target).unwrap();
        assert!(text.contains("file_NULL,\n"));
        assert!(text.contains("const struct fsdata_file file__b_html[] = { {\nfile__a_html,"));
        assert!(text.contains("#define FS_ROOT file__b_html"));
        assert!(text.contains("#define FS_NUMFILES 2"));

        // Declaration-order requirement: the last array still comes before
        // the first record.
        let last_array = text.rfind("static const unsigned char").unwrap();
        let first_struct = text.find("const struct fsdata_file").unwrap();
        assert!(last_array < first_struct);
    }

    #[test]
    fn dropped_writer_removes_scratch_files() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("fsdata.c");
        {
            let mut w = ArtifactWriter::new(&target).unwrap();
            let layout = write_data_block(w.data_out(), "_x", "/x", None, b"x").unwrap();
            w.push(record("_x", layout.payload_offset, layout.block_len));
            // dropped without finish, as after an error
        }
        assert!(!tmp.path().join(SCRATCH_DATA).exists());
        assert!(!tmp.path().join(SCRATCH_STRUCT).exists());
        assert!(!target.exists());
    }
}
