//! Integration test driving the three voxelize_lib writers end to end against a synthetic
//! unit-cube mesh and a temp directory, the way `aero-disk-convert` and `splashsurf_lib`
//! exercise their own file-producing code paths in the retrieved corpus.

use std::fs;

use nalgebra::Vector3;
use tempfile::tempdir;
use voxelize_lib::mesh::TriMesh3d;
use voxelize_lib::VoxelEngine;

fn unit_cube_mesh() -> TriMesh3d<f64> {
    let v = vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(1.0, 0.0, 1.0),
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(0.0, 1.0, 1.0),
    ];
    let triangles = vec![
        [0, 1, 2], [0, 2, 3],
        [4, 6, 5], [4, 7, 6],
        [0, 4, 5], [0, 5, 1],
        [1, 5, 6], [1, 6, 2],
        [2, 6, 7], [2, 7, 3],
        [3, 7, 4], [3, 4, 0],
    ];
    TriMesh3d::new(v, triangles)
}

#[test]
fn all_three_writers_produce_nonempty_files_for_a_solid_cube() {
    let dir = tempdir().unwrap();
    let mut engine = VoxelEngine::new(8, 2, unit_cube_mesh()).unwrap();
    engine.voxelize_surface();
    engine.voxelize_solid();

    let sparse_path = dir.path().join("grid.txt");
    let mut sparse_file = fs::File::create(&sparse_path).unwrap();
    engine.write_sparse(&mut sparse_file).unwrap();
    let sparse_contents = fs::read_to_string(&sparse_path).unwrap();
    assert!(sparse_contents.lines().count() > 3, "sparse output should list set voxels beyond the header");

    let dense_path = dir.path().join("grid.binvox");
    let mut dense_file = fs::File::create(&dense_path).unwrap();
    engine.write_dense_viewer(&mut dense_file).unwrap();
    let dense_contents = fs::read(&dense_path).unwrap();
    assert!(dense_contents.starts_with(b"#binvox 1\n"));

    let compressed_path = dir.path().join("grid.bin");
    let mut compressed_file = fs::File::create(&compressed_path).unwrap();
    engine.write_compressed(&mut compressed_file).unwrap();
    let compressed_contents = fs::read(&compressed_path).unwrap();
    assert!(compressed_contents.len() > 4 + 3 * 8 + 8 + 6 * 4, "compressed output should include RLE body past the header");
}

#[test]
fn polycube_extraction_runs_on_a_solid_cube() {
    let mut engine = VoxelEngine::new(12, 2, unit_cube_mesh()).unwrap();
    engine.voxelize_surface();
    engine.voxelize_solid();

    let params = voxelize_lib::polycube::PolycubeParams::default();
    let (_, polycube) = engine.polycube(&params);
    assert_eq!(polycube.resolution(), 12);
}
