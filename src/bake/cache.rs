//! On-disk SH cache (`.sph` side-car files).
//!
//! Plain text, one line per vertex in vertex order, 100 whitespace-separated
//! floats per line in block order (term-major, width/x/y/z per term).
//! Floats are written in shortest round-trip form, so a reload reproduces
//! the payload bit for bit.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::sh::{flatten, ShBlock, SH_CHANNELS, SH_FLOATS, SH_TERMS};
use crate::util::{Error, Result};

/// File extension of SH cache files.
pub const CACHE_EXTENSION: &str = "sph";

/// Result of looking for a usable cache file.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheStatus {
    /// One block per vertex, in vertex order.
    Loaded(Vec<ShBlock>),
    /// No file at the path.
    Missing,
    /// File present but unusable; the reason is for logging only.
    Invalid(String),
}

/// Cache path convention: the mesh path with its extension replaced by `.sph`.
pub fn cache_path_for(mesh_path: impl AsRef<Path>) -> PathBuf {
    mesh_path.as_ref().with_extension(CACHE_EXTENSION)
}

/// Parse cache text. Blank lines are skipped; every other line must hold
/// exactly [`SH_FLOATS`] floats.
pub fn parse_cache(text: &str) -> Result<Vec<ShBlock>> {
    let mut blocks = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let mut block: ShBlock = [[0.0; SH_CHANNELS]; SH_TERMS];
        let mut count = 0;
        for token in line.split_whitespace() {
            if count == SH_FLOATS {
                count += 1;
                break;
            }
            let value: f32 = token.parse().map_err(|_| Error::CacheFormat {
                line: line_no + 1,
                reason: format!("not a number: {token:?}"),
            })?;
            block[count / SH_CHANNELS][count % SH_CHANNELS] = value;
            count += 1;
        }
        if count != SH_FLOATS {
            return Err(Error::CacheFormat {
                line: line_no + 1,
                reason: format!(
                    "expected {SH_FLOATS} values, got {}",
                    line.split_whitespace().count()
                ),
            });
        }
        blocks.push(block);
    }
    Ok(blocks)
}

/// Load the cache for a mesh of `vertex_count` vertices.
///
/// Never fails: unreadable or malformed files are reported as
/// [`CacheStatus::Invalid`] so the caller recomputes.
pub fn read_cache(path: impl AsRef<Path>, vertex_count: usize) -> CacheStatus {
    let path = path.as_ref();
    if !path.exists() {
        return CacheStatus::Missing;
    }

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return CacheStatus::Invalid(e.to_string()),
    };
    match parse_cache(&text) {
        Ok(blocks) if blocks.len() == vertex_count => CacheStatus::Loaded(blocks),
        Ok(blocks) => CacheStatus::Invalid(format!(
            "expected {vertex_count} vertices, got {}",
            blocks.len()
        )),
        Err(e) => CacheStatus::Invalid(e.to_string()),
    }
}

/// Render blocks as cache text.
pub fn format_cache<'a>(blocks: impl IntoIterator<Item = &'a ShBlock>) -> String {
    let mut out = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_blocks(&mut out, blocks);
    String::from_utf8_lossy(&out).into_owned()
}

/// Write blocks to `path`, replacing any existing file.
pub fn write_cache<'a>(path: impl AsRef<Path>, blocks: impl IntoIterator<Item = &'a ShBlock>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_blocks(&mut writer, blocks)?;
    writer.flush()?;
    Ok(())
}

fn write_blocks<'a, W: Write>(w: &mut W, blocks: impl IntoIterator<Item = &'a ShBlock>) -> std::io::Result<()> {
    for block in blocks {
        for (i, value) in flatten(block).iter().enumerate() {
            if i > 0 {
                w.write_all(b" ")?;
            }
            write!(w, "{value}")?;
        }
        w.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_block(seed: f32) -> ShBlock {
        let mut block: ShBlock = [[0.0; SH_CHANNELS]; SH_TERMS];
        for (i, v) in block.iter_mut().flatten().enumerate() {
            *v = (seed + i as f32 * 0.37).sin() * 10f32.powi(i as i32 % 7 - 3);
        }
        block
    }

    #[test]
    fn test_roundtrip_bit_exact() {
        let blocks = vec![sample_block(0.1), sample_block(2.5), sample_block(-7.0)];
        let temp = NamedTempFile::new().expect("Failed to create temp file");
        write_cache(temp.path(), &blocks).unwrap();

        match read_cache(temp.path(), 3) {
            CacheStatus::Loaded(loaded) => {
                for (a, b) in blocks.iter().zip(&loaded) {
                    for (x, y) in a.iter().flatten().zip(b.iter().flatten()) {
                        assert_eq!(x.to_bits(), y.to_bits());
                    }
                }
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn test_line_format() {
        let text = format_cache(&[sample_block(1.0)]);
        assert_eq!(text.lines().count(), 1);
        assert_eq!(text.lines().next().unwrap().split(' ').count(), SH_FLOATS);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_cache(dir.path().join("none.sph"), 4), CacheStatus::Missing);
    }

    #[test]
    fn test_wrong_vertex_count_is_invalid() {
        let temp = NamedTempFile::new().expect("Failed to create temp file");
        write_cache(temp.path(), &[sample_block(0.0), sample_block(1.0)]).unwrap();
        assert!(matches!(read_cache(temp.path(), 3), CacheStatus::Invalid(_)));
    }

    #[test]
    fn test_short_and_long_lines_rejected() {
        let line = format_cache(&[sample_block(0.0)]);
        let short = line.rsplit_once(' ').unwrap().0.to_string();
        assert!(matches!(parse_cache(&short), Err(Error::CacheFormat { line: 1, .. })));

        let long = format!("{} 1.0", line.trim_end());
        assert!(parse_cache(&long).is_err());

        assert!(parse_cache(&line.replace(' ', " x ")).is_err());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let line = format_cache(&[sample_block(0.0)]);
        let text = format!("\n{line}\n\n{line}");
        assert_eq!(parse_cache(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_cache_path_convention() {
        assert_eq!(cache_path_for("models/sphere.obj"), PathBuf::from("models/sphere.sph"));
        assert_eq!(cache_path_for("cube"), PathBuf::from("cube.sph"));
    }
}
