use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

/// Run-scoped compression statistics. A fresh value is created for every
/// invocation so repeated runs in one process stay independent.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeflateStats {
    /// Original bytes of every file considered while deflate was enabled,
    /// including files whose compressed form was rejected.
    pub bytes_considered: u64,
    /// Bytes actually removed by adopted compressions.
    pub bytes_saved: u64,
}

impl DeflateStats {
    pub fn reduction_percent(&self) -> f64 {
        if self.bytes_considered == 0 {
            return 0.0;
        }
        (self.bytes_saved as f64 * 100.0) / self.bytes_considered as f64
    }
}

/// The tool surface accepts 0..=10; zlib stops at 9.
fn zlib_level(level: u8) -> u32 {
    level.min(9) as u32
}

/// Trial-compress `raw`, returning the compressed form only if it is
/// strictly smaller than the original. A compression failure never fails
/// the run; the file just stays uncompressed.
pub fn transform(
    raw: &[u8],
    eligible: bool,
    level: u8,
    stats: &mut DeflateStats,
) -> Option<Vec<u8>> {
    stats.bytes_considered += raw.len() as u64;

    if !eligible || raw.is_empty() {
        println!(" - cannot be compressed");
        return None;
    }

    let mut enc = ZlibEncoder::new(
        Vec::with_capacity(raw.len()),
        Compression::new(zlib_level(level)),
    );
    let compressed = match enc.write_all(raw).and_then(|_| enc.finish()) {
        Ok(buf) => buf,
        Err(e) => {
            eprintln!(" - deflate failed ({e}), keeping file uncompressed");
            return None;
        }
    };

    if compressed.len() < raw.len() {
        stats.bytes_saved += (raw.len() - compressed.len()) as u64;
        let pct = (compressed.len() as f64 * 100.0) / raw.len() as f64;
        println!(
            " - deflate: {} bytes -> {} bytes ({:.2}%)",
            raw.len(),
            compressed.len(),
            pct
        );
        Some(compressed)
    } else {
        let diff = compressed.len() - raw.len();
        println!(" - uncompressed: (would be {diff} bytes larger using deflate)");
        None
    }
}
