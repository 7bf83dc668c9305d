//! refract-sh CLI - bake and inspect per-vertex refraction SH payloads.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tracing_subscriber::EnvFilter;

use refract_sh::bake::cache::{cache_path_for, parse_cache};
use refract_sh::prelude::*;
use refract_sh::sh::evaluate;
use refract_sh::util::DVec3;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "bake" | "b" => cmd_bake(&filtered_args[1..]),
        "inspect" | "i" => match filtered_args.get(1) {
            Some(path) => cmd_inspect(path),
            None => Err(anyhow!("missing file argument\nUsage: refract-sh inspect <file.sph>")),
        },
        "layout" | "l" => {
            cmd_layout();
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("refract_sh={default_level},warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_help() {
    println!("refract-sh - per-vertex refraction SH baker");
    println!();
    println!("USAGE:");
    println!("    refract-sh [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    b, bake <sphere|cube> [bake options]   Bake a built-in mesh (reuses its .sph cache)");
    println!("    i, inspect <file.sph>                  Summarize an SH cache file");
    println!("    l, layout                              Print the vertex attribute layout");
    println!("    h, help                                Show this help");
    println!();
    println!("BAKE OPTIONS:");
    println!("    --fill <solid|hollow>   Material fill type (default: solid)");
    println!("    --radius <r>            Sphere radius / cube half extent (default: 1)");
    println!("    --samples <n>           Hemisphere samples per vertex (default: 500)");
    println!("    --config <file.json>    Load bake configuration");
    println!("    --cache <file.sph>      Cache file (default: <mesh>.sph)");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    refract-sh bake sphere --fill hollow   # Writes sphere.sph");
    println!("    refract-sh bake cube --samples 128     # Quick low-quality bake");
    println!("    refract-sh inspect sphere.sph          # Check a cache file");
}

struct BakeArgs {
    primitive: Primitive,
    fill: FillType,
    radius: f32,
    samples: Option<u32>,
    config: Option<PathBuf>,
    cache: Option<PathBuf>,
}

fn parse_bake_args(args: &[&str]) -> Result<BakeArgs> {
    let Some((first, rest)) = args.split_first() else {
        bail!("missing mesh argument\nUsage: refract-sh bake <sphere|cube> [options]");
    };
    let mut parsed = BakeArgs {
        primitive: first.parse()?,
        fill: FillType::Solid,
        radius: 1.0,
        samples: None,
        config: None,
        cache: None,
    };

    let mut iter = rest.iter();
    while let Some(&flag) = iter.next() {
        let mut value = || iter.next().copied().ok_or_else(|| anyhow!("{flag} needs a value"));
        match flag {
            "--fill" => parsed.fill = value()?.parse()?,
            "--radius" => parsed.radius = value()?.parse().context("--radius")?,
            "--samples" => parsed.samples = Some(value()?.parse().context("--samples")?),
            "--config" => parsed.config = Some(PathBuf::from(value()?)),
            "--cache" => parsed.cache = Some(PathBuf::from(value()?)),
            other => bail!("unknown bake option: {other}"),
        }
    }
    Ok(parsed)
}

fn cmd_bake(args: &[&str]) -> Result<()> {
    let args = parse_bake_args(args)?;

    let mut config = match &args.config {
        Some(path) => BakeConfig::load(path)?,
        None => BakeConfig::default(),
    };
    if let Some(samples) = args.samples {
        config.sample_count = samples;
    }
    config.validate()?;

    let name = args.primitive.name();
    let cache = args.cache.clone().unwrap_or_else(|| cache_path_for(name));
    let mesh = args.primitive.build(args.radius)?;
    tracing::debug!("{name}: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());

    let mut assembler = MeshAssembler::new(config);
    let outcome = assembler.consume(name, mesh, &cache, args.fill)?;
    let lump = assembler.take_lump();

    println!("Mesh:      {name} ({}, radius {})", args.fill, args.radius);
    println!("Vertices:  {}", outcome.range.vertex_count);
    println!("Triangles: {}", outcome.range.index_count / 3);
    match outcome.source {
        ShSource::CacheHit => println!("SH source: cache ({})", cache.display()),
        ShSource::Computed { cache_written: true } => println!("SH source: computed, saved to {}", cache.display()),
        ShSource::Computed { cache_written: false } => println!("SH source: computed (cache not saved)"),
    }
    println!("Buffers:   {} vertex bytes, {} index bytes", lump.vertex_bytes().len(), lump.index_bytes().len());
    print_block_summary(lump.vertices.iter().map(|v| &v.sh));
    Ok(())
}

fn cmd_inspect(path: &str) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let blocks = parse_cache(&text)?;

    println!("Cache:     {path}");
    println!("Vertices:  {}", blocks.len());
    print_block_summary(blocks.iter());
    Ok(())
}

/// Per-channel statistics of the DC term plus the reconstructed pole width.
fn print_block_summary<'a>(blocks: impl Iterator<Item = &'a ShBlock>) {
    const CHANNELS: [&str; SH_CHANNELS] = ["width", "x", "y", "z"];

    let mut min = [f32::INFINITY; SH_CHANNELS];
    let mut max = [f32::NEG_INFINITY; SH_CHANNELS];
    let mut sum = [0.0f64; SH_CHANNELS];
    let mut pole_width = 0.0;
    let mut count = 0usize;
    let mut non_finite = 0usize;

    for block in blocks {
        for c in 0..SH_CHANNELS {
            let v = block[0][c];
            min[c] = min[c].min(v);
            max[c] = max[c].max(v);
            sum[c] += f64::from(v);
        }
        pole_width += evaluate(block, DVec3::Z)[0];
        non_finite += block.iter().flatten().filter(|v| !v.is_finite()).count();
        count += 1;
    }
    if count == 0 {
        return;
    }

    println!();
    println!("DC term:");
    for c in 0..SH_CHANNELS {
        println!(
            "  {:<6} min {:>12.6}  max {:>12.6}  mean {:>12.6}",
            CHANNELS[c],
            min[c],
            max[c],
            sum[c] / count as f64
        );
    }
    println!("Mean reconstructed width along normal: {:.6}", pole_width / count as f64);
    if non_finite > 0 {
        println!("WARNING: {non_finite} non-finite coefficients");
    }
}

fn cmd_layout() {
    let layout = VertexLayout::transparent();
    println!("Stride: {} bytes ({} floats)", layout.stride, layout.stride / 4);
    for attr in &layout.attributes {
        let name = match attr.location {
            0 => "position".to_string(),
            1 => "normal".to_string(),
            n => format!("sh[{}]", n - 2),
        };
        println!("  location {:>2}  {:<9} offset {:>3}  {:?}", attr.location, name, attr.offset, attr.format);
    }
}
