//! Mesh loading from OFF/OBJ/STL files
//!
//! Out of scope for `voxelize_lib` itself (spec.md §1 treats mesh loading as an external
//! collaborator); this module is the CLI's own boundary code that turns a file on disk into
//! the [`TriMesh3d`] the engine consumes. OBJ parsing is delegated to `tobj`, the ecosystem
//! crate the retrieved corpus itself reaches for; OFF and STL have no such crate in the
//! corpus, so they get small hand-written readers here, matching the size and register of
//! `splashsurf`'s own bespoke (non-VTK) input-format parsers.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Vector3;
use voxelize_lib::mesh::TriMesh3d;

/// Loads an indexed triangle mesh from `path`, dispatching on its file extension.
///
/// Returns an error (surfaced by the caller as `voxelize_lib`'s `MeshLoadError` per spec.md
/// §7) if the extension is unrecognized, the file cannot be read, or it cannot be parsed.
pub fn load_mesh(path: &Path) -> Result<TriMesh3d<f64>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| anyhow!("input file {path:?} has no recognizable extension"))?;

    match ext.as_str() {
        "off" => load_off(path),
        "obj" => load_obj(path),
        "stl" => load_stl(path),
        other => bail!("unsupported mesh format: .{other} (expected .off, .obj or .stl)"),
    }
}

fn load_off(path: &Path) -> Result<TriMesh3d<f64>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading OFF file {path:?}"))?;
    let mut tokens = text.split_whitespace();

    let magic = tokens.next().ok_or_else(|| anyhow!("empty OFF file"))?;
    if magic != "OFF" {
        bail!("OFF file {path:?} does not start with the 'OFF' magic header");
    }

    let num_vertices: usize = next_token(&mut tokens, "vertex count")?;
    let num_faces: usize = next_token(&mut tokens, "face count")?;
    let _num_edges: usize = next_token(&mut tokens, "edge count")?;

    let mut vertices = Vec::with_capacity(num_vertices);
    for _ in 0..num_vertices {
        let x: f64 = next_token(&mut tokens, "vertex x")?;
        let y: f64 = next_token(&mut tokens, "vertex y")?;
        let z: f64 = next_token(&mut tokens, "vertex z")?;
        vertices.push(Vector3::new(x, y, z));
    }

    let mut triangles = Vec::with_capacity(num_faces);
    for _ in 0..num_faces {
        let arity: usize = next_token(&mut tokens, "face arity")?;
        let indices: Vec<usize> = (0..arity)
            .map(|_| next_token(&mut tokens, "face vertex index"))
            .collect::<Result<_>>()?;
        triangulate_polygon(&indices, &mut triangles);
    }

    Ok(TriMesh3d::new(vertices, triangles))
}

fn load_obj(path: &Path) -> Result<TriMesh3d<f64>> {
    let load_options = tobj::LoadOptions {
        triangulate: true,
        ..Default::default()
    };
    let (models, _materials) =
        tobj::load_obj(path, &load_options).with_context(|| format!("parsing OBJ file {path:?}"))?;

    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for model in models {
        let base = vertices.len();
        let mesh = model.mesh;
        for chunk in mesh.positions.chunks_exact(3) {
            vertices.push(Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64));
        }
        for tri in mesh.indices.chunks_exact(3) {
            triangles.push([
                base + tri[0] as usize,
                base + tri[1] as usize,
                base + tri[2] as usize,
            ]);
        }
    }

    Ok(TriMesh3d::new(vertices, triangles))
}

/// Reads a binary STL (80-byte header, `u32` triangle count, 50 bytes per facet: a normal and
/// three vertices as `f32` triples, plus a 2-byte attribute field). Falls back to the ASCII
/// `solid ... facet normal ... vertex x y z ... endfacet ... endsolid` variant if the file
/// does not look like binary STL (i.e. its size doesn't match the declared triangle count).
fn load_stl(path: &Path) -> Result<TriMesh3d<f64>> {
    let bytes = fs::read(path).with_context(|| format!("reading STL file {path:?}"))?;
    if bytes.len() >= 84 {
        let declared = u32::from_le_bytes(bytes[80..84].try_into().unwrap()) as usize;
        if bytes.len() == 84 + declared * 50 {
            return Ok(parse_binary_stl(&bytes, declared));
        }
    }
    parse_ascii_stl(path)
}

fn parse_binary_stl(bytes: &[u8], triangle_count: usize) -> TriMesh3d<f64> {
    let mut vertices = Vec::with_capacity(triangle_count * 3);
    let mut triangles = Vec::with_capacity(triangle_count);

    let mut cursor = 84;
    for _ in 0..triangle_count {
        // Skip the 12-byte facet normal; recomputed downstream where needed.
        cursor += 12;
        let base = vertices.len();
        for _ in 0..3 {
            let x = read_f32(bytes, cursor);
            let y = read_f32(bytes, cursor + 4);
            let z = read_f32(bytes, cursor + 8);
            vertices.push(Vector3::new(x as f64, y as f64, z as f64));
            cursor += 12;
        }
        cursor += 2; // attribute byte count
        triangles.push([base, base + 1, base + 2]);
    }

    TriMesh3d::new(vertices, triangles)
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn parse_ascii_stl(path: &Path) -> Result<TriMesh3d<f64>> {
    let mut text = String::new();
    fs::File::open(path)
        .with_context(|| format!("opening STL file {path:?}"))?
        .read_to_string(&mut text)
        .with_context(|| format!("reading ASCII STL file {path:?}"))?;

    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    let mut current = Vec::with_capacity(3);

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("vertex") {
            let mut coords = rest.split_whitespace();
            let x: f64 = next_token(&mut coords, "STL vertex x")?;
            let y: f64 = next_token(&mut coords, "STL vertex y")?;
            let z: f64 = next_token(&mut coords, "STL vertex z")?;
            current.push(Vector3::new(x, y, z));
            if current.len() == 3 {
                let base = vertices.len();
                vertices.extend(current.drain(..));
                triangles.push([base, base + 1, base + 2]);
            }
        }
    }

    if triangles.is_empty() {
        bail!("ASCII STL file {path:?} contained no facets");
    }

    Ok(TriMesh3d::new(vertices, triangles))
}

/// Fan-triangulates a convex polygon face `(i0, i1, ..., ik)` into `(i0, i1, i2), (i0, i2, i3), ...`.
fn triangulate_polygon(indices: &[usize], out: &mut Vec<[usize; 3]>) {
    if indices.len() < 3 {
        return;
    }
    for i in 1..indices.len() - 1 {
        out.push([indices[0], indices[i], indices[i + 1]]);
    }
}

fn next_token<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = tokens.next().ok_or_else(|| anyhow!("unexpected end of input while reading {what}"))?;
    raw.parse::<T>()
        .map_err(|e| anyhow!("could not parse {what} from {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn off_tetrahedron_round_trips() {
        let mut file = tempfile::Builder::new().suffix(".off").tempfile().unwrap();
        writeln!(
            file,
            "OFF\n4 4 0\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n3 0 1 2\n3 0 1 3\n3 0 2 3\n3 1 2 3"
        )
        .unwrap();
        let mesh = load_off(file.path()).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.triangles().len(), 4);
    }

    #[test]
    fn ascii_stl_single_triangle_parses() {
        let mut file = tempfile::Builder::new().suffix(".stl").tempfile().unwrap();
        writeln!(
            file,
            "solid test\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid test"
        )
        .unwrap();
        let mesh = parse_ascii_stl(file.path()).unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.triangles().len(), 1);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        writeln!(file, "not a mesh").unwrap();
        assert!(load_mesh(file.path()).is_err());
    }
}
