use log::warn;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// File formats recognized when expanding directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Chunked binary mesh (.msh)
    MSH,

    /// Other unsupported file formats
    Unknown,
}

/// Given something that looks like a path parse it into a FileFormat.
pub fn extension_to_format(s: impl AsRef<Path>) -> FileFormat {
    let s = s.as_ref();
    let Some(e) = s.extension() else {
        return FileFormat::Unknown;
    };
    let Some(e) = e.to_str() else {
        return FileFormat::Unknown;
    };

    let matches = [("msh", FileFormat::MSH)];
    for (ext, fmt) in matches {
        if ext.eq_ignore_ascii_case(e) {
            return fmt;
        }
    }
    FileFormat::Unknown
}

/// Collects mesh paths from a list of arguments.
///
/// Arguments naming existing files come first, in argument order, whatever their extension.
/// Then every directory argument is walked recursively for `.msh` files. Nothing is
/// deduplicated, so a file named directly and found again in a directory appears twice.
pub fn discover<S: AsRef<OsStr>>(args: &[S]) -> Vec<PathBuf> {
    let mut out = args
        .iter()
        .map(|a| Path::new(a.as_ref()))
        .filter(|p| p.is_file())
        .map(Path::to_path_buf)
        .collect::<Vec<_>>();

    for dir in args.iter().map(|a| Path::new(a.as_ref())) {
        if dir.is_dir() {
            walk_meshes(dir, &mut out);
        }
    }
    out
}

/// Files in a directory sorted by name, then each subdirectory in name order.
/// Symlinked directories are not entered, so link cycles cannot repeat files.
fn walk_meshes(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!("Skipping unreadable directory {}: {e}", dir.display());
            return;
        }
    };
    let mut entries = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| Some((e.path(), e.file_type().ok()?)))
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut subdirs = vec![];
    for (p, ft) in entries {
        if ft.is_dir() {
            subdirs.push(p);
        } else if p.is_file() && extension_to_format(&p) == FileFormat::MSH {
            out.push(p);
        }
    }
    for d in subdirs {
        walk_meshes(&d, out);
    }
}

#[test]
fn test_extension() {
    assert_eq!(extension_to_format("a/b.msh"), FileFormat::MSH);
    assert_eq!(extension_to_format("a/b.MsH"), FileFormat::MSH);
    assert_eq!(extension_to_format("a/b.msh.grid.png"), FileFormat::Unknown);
    assert_eq!(extension_to_format("msh"), FileFormat::Unknown);
}
