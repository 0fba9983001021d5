use super::error::MshError;
use super::mesh::{Mesh, MeshParser};
use super::{F, Vec2};
use log::debug;
use std::array::from_fn;
use std::io::{self, Write};

pub const MAGIC: &[u8; 3] = b"MSH";

/// Version written by [`write`]. Any version is accepted when reading.
pub const VERSION: u8 = 11;

/// Chunk ids that carry geometry, everything else is skipped.
pub mod chunk {
    pub const VERTICES: u32 = 4;
    pub const TRIANGLES: u32 = 5;
}

/// Per-vertex attributes that may appear in a vertex buffer, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Normal,
    Tangent,
    Bitangent,
    UV,
    Weights,
    Bones,
    Color,
}

impl Attribute {
    pub fn from_num(i: u32) -> Option<Self> {
        let a = match i {
            0 => Self::Position,
            1 => Self::Normal,
            2 => Self::Tangent,
            3 => Self::Bitangent,
            4 => Self::UV,
            5 => Self::Weights,
            6 => Self::Bones,
            7 => Self::Color,
            _ => return None,
        };
        Some(a)
    }
    pub const fn id(self) -> u32 {
        self as u32
    }
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Position | Self::Normal | Self::Tangent | Self::Bitangent => 12,
            Self::UV => 8,
            Self::Weights => 16,
            Self::Bones | Self::Color => 4,
        }
    }
}

/// The MSH decoder as a [`MeshParser`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Msh;

impl MeshParser for Msh {
    fn parse(&self, bytes: &[u8]) -> Result<Mesh, MshError> {
        parse(bytes)
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], MshError> {
        if n > self.remaining() {
            return Err(MshError::Truncated(what));
        }
        let s = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }
}

macro_rules! read_word {
    ($src: expr, $t: ty, $what: expr) => {{
        let s = $src.take(size_of::<$t>(), $what)?;
        <$t>::from_le_bytes(from_fn(|i| s[i]))
    }};
}

/// Decode an MSH file held in memory.
pub fn parse(bytes: &[u8]) -> Result<Mesh, MshError> {
    let mut src = Cursor::new(bytes);
    if src.take(MAGIC.len(), "magic").ok() != Some(MAGIC.as_slice()) {
        return Err(MshError::BadMagic);
    }
    let version = read_word!(src, u8, "version");
    debug!("MSH version {version}");

    let mut uv = None;
    let mut f = vec![];

    while src.remaining() > 0 {
        let id = read_word!(src, u32, "chunk id");
        let len = read_word!(src, u32, "chunk length");
        let remaining = src.remaining();
        if len as usize > remaining {
            return Err(MshError::ChunkOverrun { id, len, remaining });
        }
        let mut body = Cursor::new(src.take(len as usize, "chunk")?);
        match id {
            chunk::VERTICES => {
                if uv.is_some() {
                    return Err(MshError::DuplicateVertices);
                }
                uv = Some(read_vertices(&mut body)?);
            }
            chunk::TRIANGLES => read_triangles(&mut body, &mut f)?,
            _ => debug!("Skipping chunk {id} ({len} bytes)"),
        }
    }

    let uv = uv.ok_or(MshError::MissingVertices)?;
    debug!("Read {} vertices, {} triangles", uv.len(), f.len());
    Mesh::new(uv, f)
}

fn read_vertices(src: &mut Cursor<'_>) -> Result<Vec<Vec2>, MshError> {
    let stride = read_word!(src, u32, "vertex stride") as usize;
    let num_attrs = read_word!(src, u32, "attribute count");

    let mut uv_offset = None;
    let mut offset = 0;
    for _ in 0..num_attrs {
        let id = read_word!(src, u32, "attribute id");
        let attr = Attribute::from_num(id).ok_or(MshError::UnknownAttribute(id))?;
        if attr == Attribute::UV && uv_offset.is_none() {
            uv_offset = Some(offset);
        }
        offset += attr.num_bytes();
    }
    if offset > stride {
        return Err(MshError::StrideTooSmall {
            needed: offset,
            stride,
        });
    }
    let uv_offset = uv_offset.ok_or(MshError::MissingUV)?;

    let num_verts = read_word!(src, u32, "vertex count") as usize;
    let mut uv = Vec::with_capacity(num_verts.min(src.remaining() / stride));
    for _ in 0..num_verts {
        let v = src.take(stride, "vertex")?;
        let [u, w] = [0, 4].map(|o| f32::from_le_bytes(from_fn(|i| v[uv_offset + o + i])) as F);
        uv.push([u, w]);
    }
    Ok(uv)
}

fn read_triangles(src: &mut Cursor<'_>, out: &mut Vec<[usize; 3]>) -> Result<(), MshError> {
    let num_tris = read_word!(src, u32, "triangle count") as usize;
    out.reserve(num_tris.min(src.remaining() / 6));
    for _ in 0..num_tris {
        let mut t = [0; 3];
        for vi in t.iter_mut() {
            *vi = read_word!(src, u16, "triangle") as usize;
        }
        out.push(t);
    }
    Ok(())
}

/// Writes a mesh as MSH with a UV-only vertex buffer.
pub fn write(mesh: &Mesh, mut w: impl Write) -> io::Result<()> {
    w.write_all(MAGIC)?;
    w.write_all(&[VERSION])?;

    let stride = Attribute::UV.num_bytes() as u32;
    let vert_len = 4 * 4 + stride * mesh.uv.len() as u32;
    w.write_all(&chunk::VERTICES.to_le_bytes())?;
    w.write_all(&vert_len.to_le_bytes())?;
    w.write_all(&stride.to_le_bytes())?;
    w.write_all(&1u32.to_le_bytes())?;
    w.write_all(&Attribute::UV.id().to_le_bytes())?;
    w.write_all(&(mesh.uv.len() as u32).to_le_bytes())?;
    for uv in &mesh.uv {
        for c in uv {
            w.write_all(&(*c as f32).to_le_bytes())?;
        }
    }

    let tri_len = 4 + 6 * mesh.f.len() as u32;
    w.write_all(&chunk::TRIANGLES.to_le_bytes())?;
    w.write_all(&tri_len.to_le_bytes())?;
    w.write_all(&(mesh.f.len() as u32).to_le_bytes())?;
    for t in &mesh.f {
        for &vi in t {
            let vi = u16::try_from(vi).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "MSH indices must fit in u16")
            })?;
            w.write_all(&vi.to_le_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
fn chunk_bytes(id: u32, body: &[u8]) -> Vec<u8> {
    let mut out = id.to_le_bytes().to_vec();
    out.extend((body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

#[test]
fn test_uv_offset_after_position() {
    let mut vb = vec![];
    for v in [32u32, 2, Attribute::Position.id(), Attribute::UV.id(), 2] {
        vb.extend(v.to_le_bytes());
    }
    for (i, uv) in [[0.25f32, 0.5], [1., 0.75]].into_iter().enumerate() {
        for p in [i as f32, 9., 9.] {
            vb.extend(p.to_le_bytes());
        }
        vb.extend(uv[0].to_le_bytes());
        vb.extend(uv[1].to_le_bytes());
        // padding up to the stride
        vb.extend([0u8; 12]);
    }

    let mut bytes = b"MSH\x0b".to_vec();
    bytes.extend(chunk_bytes(0, &[1, 2, 3]));
    bytes.extend(chunk_bytes(chunk::VERTICES, &vb));

    let m = parse(&bytes).unwrap();
    assert_eq!(m.uv, vec![[0.25, 0.5], [1., 0.75]]);
    assert!(m.f.is_empty());
}

#[test]
fn test_write_then_parse() {
    let m = Mesh::new(
        vec![[0., 0.], [1., 0.], [0., 1.], [1., 1.]],
        vec![[0, 1, 2], [2, 1, 3]],
    )
    .unwrap();
    let mut buf = vec![];
    write(&m, &mut buf).unwrap();
    assert_eq!(Msh.parse(&buf).unwrap(), m);
}

#[test]
fn test_malformed() {
    assert!(matches!(parse(b"OBJ\x0b"), Err(MshError::BadMagic)));
    assert!(matches!(parse(b"MS"), Err(MshError::BadMagic)));
    assert!(matches!(parse(b"MSH\x0b"), Err(MshError::MissingVertices)));

    let mut short = b"MSH\x0b".to_vec();
    short.extend(5u32.to_le_bytes());
    short.extend(100u32.to_le_bytes());
    short.extend([0u8; 10]);
    assert!(matches!(
        parse(&short),
        Err(MshError::ChunkOverrun { id: 5, len: 100, remaining: 10 })
    ));

    let mut no_uv = vec![];
    for v in [12u32, 1, Attribute::Position.id(), 0] {
        no_uv.extend(v.to_le_bytes());
    }
    let mut bytes = b"MSH\x0b".to_vec();
    bytes.extend(chunk_bytes(chunk::VERTICES, &no_uv));
    assert!(matches!(parse(&bytes), Err(MshError::MissingUV)));

    let m = Mesh::new(vec![[0.; 2]; 3], vec![]).unwrap();
    let mut bad_idx = vec![];
    write(&m, &mut bad_idx).unwrap();
    // replace the empty triangle chunk with one pointing past the vertices
    bad_idx.truncate(bad_idx.len() - 12);
    let mut tris = 1u32.to_le_bytes().to_vec();
    for i in [0u16, 1, 7] {
        tris.extend(i.to_le_bytes());
    }
    bad_idx.extend(chunk_bytes(chunk::TRIANGLES, &tris));
    assert!(matches!(
        parse(&bad_idx),
        Err(MshError::IndexOutOfRange { tri: 0, index: 7, num_vertices: 3 })
    ));
}
