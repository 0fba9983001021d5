use std::io;
use thiserror::Error;

/// Reasons a byte buffer is not a usable MSH mesh.
#[derive(Debug, Error)]
pub enum MshError {
    #[error("Not an MSH file (bad magic)")]
    BadMagic,
    #[error("Unexpected end of data while reading {0}")]
    Truncated(&'static str),
    #[error("Chunk {id} declares {len} bytes but only {remaining} remain")]
    ChunkOverrun { id: u32, len: u32, remaining: usize },
    #[error("Unknown vertex attribute {0}")]
    UnknownAttribute(u32),
    #[error("Vertex attributes need {needed} bytes but stride is {stride}")]
    StrideTooSmall { needed: usize, stride: usize },
    #[error("Vertex buffer has no UV attribute")]
    MissingUV,
    #[error("No vertex chunk")]
    MissingVertices,
    #[error("More than one vertex chunk")]
    DuplicateVertices,
    #[error("Triangle {tri} references vertex {index}, but there are only {num_vertices}")]
    IndexOutOfRange {
        tri: usize,
        index: usize,
        num_vertices: usize,
    },
}

/// Failure while turning one mesh file into a grid image.
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] MshError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
}
