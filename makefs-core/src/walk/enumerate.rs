use crate::emit::artifact::{SCRATCH_DATA, SCRATCH_STRUCT};
use crate::error::{FsdataError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Legacy version-control directory always pruned when recursing.
const LEGACY_VCS_DIR: &str = "CVS";

#[derive(Clone, Debug)]
pub struct FsEntry {
    /// Forward-slash path from the root, always prefixed with `/`.
    pub qualified_name: String,
    pub path: PathBuf,
}

/// Lowercase text after the last dot of `name`, empty if there is none.
pub fn file_ext(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

fn is_scratch_name(name: &str) -> bool {
    name == SCRATCH_DATA || name == SCRATCH_STRUCT
}

fn qualified(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut q = String::new();
    for comp in rel.components() {
        q.push('/');
        q.push_str(&comp.as_os_str().to_string_lossy());
    }
    q
}

fn push_entry(root: &Path, path: &Path, exclude_exts: &[String], out: &mut Vec<FsEntry>) {
    let name = match path.file_name() {
        Some(n) => n.to_string_lossy().into_owned(),
        None => return,
    };
    if is_scratch_name(&name) {
        return;
    }
    let ext = file_ext(&name);
    if exclude_exts.iter().any(|x| *x == ext) {
        eprintln!("skipping {}: excluded extension", path.display());
        return;
    }
    out.push(FsEntry {
        qualified_name: qualified(root, path),
        path: path.to_path_buf(),
    });
}

/// One directory level: sorted files first, then the sorted subdirectories
/// worth recursing into. Hidden directories and the legacy `CVS` directory
/// are pruned here.
fn read_level(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        } else if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy();
            if !name.starts_with('.') && name != LEGACY_VCS_DIR {
                subdirs.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

fn walk_level(
    root: &Path,
    dir: &Path,
    process_subdirs: bool,
    exclude_exts: &[String],
    out: &mut Vec<FsEntry>,
) -> Result<()> {
    let (files, subdirs) = read_level(dir)?;
    for file in &files {
        push_entry(root, file, exclude_exts, out);
    }
    if process_subdirs {
        for subdir in &subdirs {
            walk_level(root, subdir, process_subdirs, exclude_exts, out)?;
        }
    }
    Ok(())
}

/// Walk `root` and return its files in a reproducible order.
///
/// Traversal is top-down: every level emits its files in lexicographic
/// order before descending into its subdirectories, also in lexicographic
/// order, so the emitted artifact does not depend on directory iteration
/// order of the host. Hidden directories and the legacy `CVS` directory are
/// pruned when recursing, and the tool's own scratch outputs are always
/// skipped.
pub fn enumerate(
    root: &Path,
    process_subdirs: bool,
    exclude_exts: &[String],
) -> Result<Vec<FsEntry>> {
    if !root.is_dir() {
        return Err(FsdataError::Config(format!(
            "invalid path: '{}'. Directory not found.",
            root.display()
        )));
    }

    let mut entries = Vec::new();
    walk_level(root, root, process_subdirs, exclude_exts, &mut entries)?;
    Ok(entries)
}
