use std::io::{self, Write};

/// Payload must start on a 4-byte boundary within the block so the consumer
/// can overlay structs on it.
pub const PAYLOAD_ALIGN: usize = 4;

pub const HEX_BYTES_PER_LINE: usize = 16;

/// Per-file flag set, rendered to the artifact's textual OR-expression only
/// at output time. Values match the consumer's fallback macros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileFlags(u8);

impl FileFlags {
    pub const NONE: FileFlags = FileFlags(0);
    pub const HEADER_INCLUDED: FileFlags = FileFlags(0x01);
    pub const HEADER_PERSISTENT: FileFlags = FileFlags(0x02);
    pub const HTTPVER_1_1: FileFlags = FileFlags(0x04);

    pub fn contains(self, other: FileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flag set for one file. A header only stays valid for the lifetime of
    /// the served response when the file is not SSI, and the 1.1 marker is
    /// only meaningful on persistent headers.
    pub fn for_file(include_header: bool, is_ssi: bool, use_http11: bool) -> FileFlags {
        let mut flags = FileFlags::NONE;
        if include_header {
            flags = flags | FileFlags::HEADER_INCLUDED;
            if !is_ssi {
                flags = flags | FileFlags::HEADER_PERSISTENT;
                if use_http11 {
                    flags = flags | FileFlags::HTTPVER_1_1;
                }
            }
        }
        flags
    }

    pub fn as_c_expr(self) -> String {
        let mut parts = Vec::new();
        if self.contains(Self::HEADER_INCLUDED) {
            parts.push("FS_FILE_FLAGS_HEADER_INCLUDED");
        }
        if self.contains(Self::HEADER_PERSISTENT) {
            parts.push("FS_FILE_FLAGS_HEADER_PERSISTENT");
        }
        if self.contains(Self::HTTPVER_1_1) {
            parts.push("FS_FILE_FLAGS_HEADER_HTTPVER_1_1");
        }
        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

impl std::ops::BitOr for FileFlags {
    type Output = FileFlags;
    fn bitor(self, rhs: FileFlags) -> FileFlags {
        FileFlags(self.0 | rhs.0)
    }
}

/// Metadata record for one emitted file, immutable after creation. The
/// predecessor reference is derived from sequence position at output time.
#[derive(Clone, Debug)]
pub struct FileRecord {
    pub qualified_name: String,
    pub symbol: String,
    /// Offset of the payload within the block: name + padding + header.
    pub payload_offset: usize,
    pub block_len: usize,
    pub raw_size: usize,
    pub final_size: usize,
    pub compressed: bool,
    pub flags: FileFlags,
}

/// Byte offsets of a serialized block, as reported by `write_data_block`.
#[derive(Clone, Copy, Debug)]
pub struct BlockLayout {
    pub payload_offset: usize,
    pub block_len: usize,
}

/// Emits bytes as `0xNN,` hex literals, breaking the line every 16 values,
/// while tracking the cumulative block offset.
struct HexWriter {
    idx: usize,
}

impl HexWriter {
    fn new() -> Self {
        Self { idx: 0 }
    }

    fn write_bytes(&mut self, w: &mut dyn Write, data: &[u8]) -> io::Result<()> {
        for b in data {
            write!(w, "0x{b:02x},")?;
            self.idx += 1;
            if self.idx % HEX_BYTES_PER_LINE == 0 {
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Serialize one file's contiguous byte block: NUL-terminated name, zero
/// padding up to the payload alignment, optional header bytes, payload.
pub fn write_data_block(
    w: &mut dyn Write,
    symbol: &str,
    qualified_name: &str,
    header: Option<&[u8]>,
    content: &[u8],
) -> io::Result<BlockLayout> {
    let mut name_bytes = qualified_name.as_bytes().to_vec();
    name_bytes.push(0);

    writeln!(w, "static const unsigned char data_{symbol}[] = {{")?;
    writeln!(w, "/* {} ({} chars) */", qualified_name, name_bytes.len())?;

    let mut hex = HexWriter::new();
    hex.write_bytes(w, &name_bytes)?;
    while hex.idx % PAYLOAD_ALIGN != 0 {
        hex.write_bytes(w, &[0u8])?;
    }

    let mut payload_offset = hex.idx;
    if let Some(header) = header {
        hex.write_bytes(w, header)?;
        payload_offset += header.len();
    }

    write!(w, "\n/* raw file data */\n")?;
    hex.write_bytes(w, content)?;
    if hex.idx % HEX_BYTES_PER_LINE != 0 {
        writeln!(w)?;
    }
    write!(w, "}};\n\n")?;

    Ok(BlockLayout {
        payload_offset,
        block_len: hex.idx,
    })
}

/// Emit the metadata record referencing `prev_symbol` (or the null sentinel
/// for the chain's first record).
pub fn write_struct_decl(
    w: &mut dyn Write,
    rec: &FileRecord,
    prev_symbol: Option<&str>,
) -> io::Result<()> {
    writeln!(w, "const struct fsdata_file file_{}[] = {{ {{", rec.symbol)?;
    writeln!(w, "file_{},", prev_symbol.unwrap_or("NULL"))?;
    writeln!(w, "data_{},", rec.symbol)?;
    writeln!(w, "data_{} + {},", rec.symbol, rec.payload_offset)?;
    writeln!(w, "sizeof(data_{}) - {},", rec.symbol, rec.payload_offset)?;
    writeln!(w, "{},", rec.flags.as_c_expr())?;
    write!(w, "}}}};\n\n")?;
    Ok(())
}
