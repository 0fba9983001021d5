use super::config::RenderConfig;
use super::error::GridError;
use super::mesh::MeshParser;
use super::raster::draw_uv_grid;
use image::ImageFormat;
use log::debug;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Appended to an input path to name its output image.
pub const OUTPUT_SUFFIX: &str = ".grid.png";

/// `mesh.msh` -> `mesh.msh.grid.png`, next to the input.
pub fn output_path(p: impl AsRef<Path>) -> PathBuf {
    with_suffix(p.as_ref(), OUTPUT_SUFFIX)
}

fn with_suffix(p: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(p.as_os_str());
    s.push(suffix);
    s.into()
}

#[derive(Debug)]
pub enum FileState {
    /// Output written to the contained path.
    Saved(PathBuf),
    Failed(GridError),
}

/// What happened to one input path.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub state: FileState,
}

impl FileOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self.state, FileState::Saved(_))
    }
}

/// Read, parse, draw and save a single mesh. Returns the path of the written image.
pub fn process_file(
    path: &Path,
    cfg: &RenderConfig,
    parser: &impl MeshParser,
) -> Result<PathBuf, GridError> {
    let bytes = std::fs::read(path)?;
    let mesh = parser.parse(&bytes)?;
    debug!(
        "{}: {} vertices, {} triangles",
        path.display(),
        mesh.num_vertices(),
        mesh.num_tris()
    );
    let img = draw_uv_grid(&mesh, cfg.size, &cfg.pen, cfg.background)?;
    let dst = output_path(path);
    img.save_with_format(&dst, ImageFormat::Png)?;

    #[cfg(feature = "svg")]
    super::svg::save_uv_grid(with_suffix(path, super::svg::OUTPUT_SUFFIX), &mesh, cfg)?;

    Ok(dst)
}

/// Processes every configured path in order.
///
/// Each path is written to `out` before it is attempted. A failure is reported on its own
/// line, red when `highlight` is set, and processing moves on to the next path.
/// Only a failure to write to `out` stops the batch.
pub fn run(
    cfg: &RenderConfig,
    parser: &impl MeshParser,
    out: &mut impl Write,
    highlight: bool,
) -> io::Result<Vec<FileOutcome>> {
    let mut outcomes = Vec::with_capacity(cfg.paths.len());
    for path in &cfg.paths {
        writeln!(out, "{}", path.display())?;
        let state = match process_file(path, cfg, parser) {
            Ok(dst) => FileState::Saved(dst),
            Err(e) => {
                if highlight {
                    writeln!(out, "\x1b[31m{e}\x1b[0m")?;
                } else {
                    writeln!(out, "{e}")?;
                }
                FileState::Failed(e)
            }
        };
        outcomes.push(FileOutcome {
            path: path.clone(),
            state,
        });
    }
    Ok(outcomes)
}

#[test]
fn test_output_path() {
    assert_eq!(output_path("a/b/c.msh"), PathBuf::from("a/b/c.msh.grid.png"));
    assert_eq!(output_path("C.MSH"), PathBuf::from("C.MSH.grid.png"));
}
