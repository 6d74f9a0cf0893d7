//! Render a frame sequence for one variant to binary PPM (P6) files,
//! for offline inspection or encoding:
//!
//!   cargo run --release --bin export_frames -- <out_dir> [variant] [frames] [width] [height]

use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tui_tunnel::visual::{make_variants, EffectParams, RenderCtx, TunnelEngine};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(
        args.next()
            .context("usage: export_frames <out_dir> [variant] [frames] [width] [height]")?,
    );
    let variant_idx: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(0);
    let frames: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(120);
    let width: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(640);
    let height: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(360);

    let variants = make_variants();
    if variant_idx >= variants.len() {
        anyhow::bail!("variant index {} out of range (0..{})", variant_idx, variants.len());
    }
    let name = variants[variant_idx].name;

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;

    let mut engine = TunnelEngine::new(variants, variant_idx, false, false, 3600.0);
    engine.resize(width, height);
    let params = EffectParams::default();

    for frame in 0..frames {
        let ctx = RenderCtx {
            t: frame as f32 / 60.0,
            w: width,
            h: height,
            params,
            scale: 1,
        };
        let pixels = engine.render(&ctx, Instant::now()).to_vec();

        let path = out_dir.join(format!("frame_{frame:05}.ppm"));
        let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write!(out, "P6\n{width} {height}\n255\n")?;
        for px in pixels.chunks_exact(4) {
            out.write_all(&px[..3])?;
        }
        out.flush()?;
    }

    println!("wrote {frames} frames of '{name}' to {}", out_dir.display());
    Ok(())
}
