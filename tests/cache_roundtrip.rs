//! SH cache persistence: round-trip, idempotence and recovery from bad files.

use std::path::Path;

use refract_sh::bake::cache::{parse_cache, read_cache, write_cache};
use refract_sh::bake::CacheStatus;
use refract_sh::geom::primitives::cube;
use refract_sh::prelude::*;
use refract_sh::util::Vec3;

fn config() -> BakeConfig {
    BakeConfig { sample_count: 24, progress_interval: 0, ..Default::default() }
}

fn bake(path: &Path) -> (ShSource, GeometryLump) {
    let mut assembler = MeshAssembler::new(config());
    let outcome = assembler
        .consume("cube", cube(Vec3::ZERO, 1.0).expect("cube"), path, FillType::Hollow)
        .expect("consume failed");
    (outcome.source, assembler.take_lump())
}

fn payload(lump: &GeometryLump) -> Vec<ShBlock> {
    lump.vertices.iter().map(|v| v.sh).collect()
}

#[test]
fn test_write_then_reload_is_identical() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("cube.sph");

    let (source, lump) = bake(&path);
    assert_eq!(source, ShSource::Computed { cache_written: true });

    match read_cache(&path, lump.vertices.len()) {
        CacheStatus::Loaded(blocks) => assert_eq!(blocks, payload(&lump)),
        other => panic!("expected Loaded, got {other:?}"),
    }
}

#[test]
fn test_second_consume_hits_cache_and_keeps_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("cube.sph");

    let (first_source, first) = bake(&path);
    let first_text = std::fs::read_to_string(&path).unwrap();

    let (second_source, second) = bake(&path);
    let second_text = std::fs::read_to_string(&path).unwrap();

    assert_eq!(first_source, ShSource::Computed { cache_written: true });
    assert_eq!(second_source, ShSource::CacheHit);
    assert_eq!(first_text, second_text);
    assert_eq!(payload(&first), payload(&second));
    assert_eq!(first.indices, second.indices);
}

#[test]
fn test_cache_hit_skips_tracing() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("cube.sph");

    // Values no trace of a unit cube can produce: any encode would overwrite them.
    let markers: Vec<ShBlock> = (0..24)
        .map(|v| {
            let mut block: ShBlock = [[0.0; SH_CHANNELS]; SH_TERMS];
            for (i, c) in block.iter_mut().flatten().enumerate() {
                *c = -1000.0 - (v * SH_FLOATS + i) as f32;
            }
            block
        })
        .collect();
    write_cache(&path, &markers).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    // A sample count this large would take far longer than the load if traced.
    let config = BakeConfig { sample_count: 1 << 20, progress_interval: 0, ..Default::default() };
    let mut assembler = MeshAssembler::new(config);
    let outcome = assembler
        .consume("cube", cube(Vec3::ZERO, 1.0).expect("cube"), &path, FillType::Hollow)
        .expect("consume failed");

    assert_eq!(outcome.source, ShSource::CacheHit);
    assert_eq!(payload(&assembler.take_lump()), markers);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_truncated_line_forces_recompute() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("cube.sph");

    let (_, reference) = bake(&path);
    let good = std::fs::read_to_string(&path).unwrap();

    // Drop the last value of the third line.
    let mut lines: Vec<String> = good.lines().map(str::to_string).collect();
    let cut = lines[2].rfind(' ').unwrap();
    lines[2].truncate(cut);
    std::fs::write(&path, lines.join("\n")).unwrap();

    let (source, recomputed) = bake(&path);
    assert_eq!(source, ShSource::Computed { cache_written: true });
    assert_eq!(payload(&recomputed), payload(&reference));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), good);
}

#[test]
fn test_missing_lines_force_recompute() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("cube.sph");

    bake(&path);
    let good = std::fs::read_to_string(&path).unwrap();
    let half: String = good.lines().take(10).map(|l| format!("{l}\n")).collect();
    std::fs::write(&path, half).unwrap();

    let (source, _) = bake(&path);
    assert_eq!(source, ShSource::Computed { cache_written: true });
    assert_eq!(parse_cache(&std::fs::read_to_string(&path).unwrap()).unwrap().len(), 24);
}

#[test]
fn test_garbage_file_forces_recompute() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("cube.sph");
    std::fs::write(&path, "not a cache file\n").unwrap();

    let (source, lump) = bake(&path);
    assert_eq!(source, ShSource::Computed { cache_written: true });
    assert!(matches!(read_cache(&path, lump.vertices.len()), CacheStatus::Loaded(_)));
}
