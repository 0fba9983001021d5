#[cfg(not(feature = "f64"))]
pub type F = f32;

#[cfg(feature = "f64")]
pub type F = f64;

/// Alias for array of floats.
pub type Vector<const N: usize, T = F> = [T; N];

pub type Vec2 = Vector<2>;

/// Mesh data model consumed by the rasterizer.
pub mod mesh;

/// MSH parsing
pub mod msh;

/// Named and hex colors.
pub mod color;

/// Resolve a render configuration from a flat argument list.
pub mod config;

/// Draw the UV wireframe of a mesh into an image.
pub mod raster;

/// Process a list of meshes, isolating failures per file.
pub mod batch;

pub mod error;

pub mod util;

/// Save UV wireframes as SVG.
#[cfg(feature = "svg")]
pub mod svg;

pub use batch::{FileOutcome, FileState};
pub use config::{Pen, RenderConfig};
pub use error::{GridError, MshError};
pub use mesh::{Mesh, MeshParser};

/// Re-exported for output images.
pub use image;

/// Cyclic edges of a polygon given by its vertex indices.
pub fn edges(vis: &[usize]) -> impl Iterator<Item = [usize; 2]> + '_ {
    (0..vis.len()).map(|vi| [vis[vi], vis[(vi + 1) % vis.len()]])
}

#[test]
fn test_tri_edges() {
    let e = edges(&[4, 7, 9]).collect::<Vec<_>>();
    assert_eq!(e, vec![[4, 7], [7, 9], [9, 4]]);
}
