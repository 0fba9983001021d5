use super::error::MshError;
use super::Vec2;

/// Triangle mesh reduced to what is needed to draw its UV layout.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Mesh {
    /// One UV per vertex, not range checked.
    pub uv: Vec<Vec2>,
    /// Triangles as indices into `uv`.
    pub f: Vec<[usize; 3]>,
}

impl Mesh {
    /// Constructs a mesh, checking that every triangle index refers to a vertex.
    pub fn new(uv: Vec<Vec2>, f: Vec<[usize; 3]>) -> Result<Self, MshError> {
        let num_vertices = uv.len();
        for (tri, t) in f.iter().enumerate() {
            if let Some(&index) = t.iter().find(|&&vi| vi >= num_vertices) {
                return Err(MshError::IndexOutOfRange {
                    tri,
                    index,
                    num_vertices,
                });
            }
        }
        Ok(Self { uv, f })
    }

    pub fn num_vertices(&self) -> usize {
        self.uv.len()
    }

    pub fn num_tris(&self) -> usize {
        self.f.len()
    }
}

/// Something that can decode a mesh file's bytes.
pub trait MeshParser {
    fn parse(&self, bytes: &[u8]) -> Result<Mesh, MshError>;
}

impl<P: Fn(&[u8]) -> Result<Mesh, MshError>> MeshParser for P {
    fn parse(&self, bytes: &[u8]) -> Result<Mesh, MshError> {
        self(bytes)
    }
}

#[test]
fn test_rejects_bad_index() {
    let uv = vec![[0.; 2]; 3];
    assert!(Mesh::new(uv.clone(), vec![[0, 1, 2]]).is_ok());
    match Mesh::new(uv, vec![[0, 1, 2], [2, 3, 0]]) {
        Err(MshError::IndexOutOfRange { tri: 1, index: 3, num_vertices: 3 }) => {}
        v => panic!("{v:?}"),
    }
}
