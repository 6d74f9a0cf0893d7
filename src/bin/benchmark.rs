//! Offscreen shade-throughput benchmark: renders a fixed number of
//! frames per variant and quality without touching the terminal modes.
//!
//!   cargo run --release --bin benchmark -- [frames] [width] [height]

use std::time::Instant;
use tui_tunnel::config::Quality;
use tui_tunnel::visual::{make_variants, EffectParams, RenderCtx, TunnelEngine};

fn main() {
    let mut args = std::env::args().skip(1);
    let frames: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(60);
    let width: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(240);
    let height: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(136);

    let variants = make_variants();
    let params = EffectParams::default();

    println!(
        "benchmark: {} frames per case at {}x{} ({} variants)",
        frames,
        width,
        height,
        variants.len()
    );
    println!("{:<34} {:>9} {:>10} {:>9}", "case", "ms/frame", "Mpx/s", "fps");

    for (idx, variant) in variants.iter().enumerate() {
        for quality in [Quality::Ultra, Quality::Balanced, Quality::Fast] {
            let mut engine = TunnelEngine::new(variants.clone(), idx, false, false, 3600.0);
            engine.resize(width, height);

            let start = Instant::now();
            for frame in 0..frames {
                let ctx = RenderCtx {
                    t: frame as f32 / 60.0,
                    w: width,
                    h: height,
                    params,
                    scale: quality.block_scale(),
                };
                let pixels = engine.render(&ctx, Instant::now());
                std::hint::black_box(pixels.first().copied());
            }
            let elapsed = start.elapsed().as_secs_f64();

            let ms_per_frame = elapsed * 1000.0 / frames as f64;
            let mpx_per_s = (width * height * frames) as f64 / elapsed / 1.0e6;
            println!(
                "{:<34} {:>9.2} {:>10.2} {:>9.1}",
                format!("{} [{}]", variant.name, quality.label()),
                ms_per_frame,
                mpx_per_s,
                1000.0 / ms_per_frame
            );
        }
    }
}
