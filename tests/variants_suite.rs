use std::time::{Duration, Instant};

use tui_tunnel::visual::{make_variants, EffectParams, Family, RenderCtx, TunnelEngine};

fn ctx(t: f32, w: usize, h: usize) -> RenderCtx {
    RenderCtx {
        t,
        w,
        h,
        params: EffectParams::default(),
        scale: 1,
    }
}

fn has_non_black(buf: &[u8]) -> bool {
    buf.chunks_exact(4)
        .any(|px| px[0] != 0 || px[1] != 0 || px[2] != 0)
}

#[test]
fn variant_table_is_sane() {
    let variants = make_variants();
    assert_eq!(variants.len(), 6, "expected exactly six variants");

    for (i, v) in variants.iter().enumerate() {
        assert!(!v.name.trim().is_empty(), "variant {i} has empty name");
    }
    for (i, a) in variants.iter().enumerate() {
        for b in &variants[i + 1..] {
            assert_ne!(a.name, b.name, "duplicate variant name '{}'", a.name);
        }
    }

    let marched = variants
        .iter()
        .filter(|v| matches!(v.family, Family::March(_)))
        .count();
    assert_eq!(marched, 2, "two variants should be raymarched");
}

#[test]
fn march_budgets_match_their_families() {
    let variants = make_variants();
    let cfgs: Vec<_> = variants
        .iter()
        .filter_map(|v| match v.family {
            Family::March(cfg) => Some(cfg),
            _ => None,
        })
        .collect();

    for cfg in &cfgs {
        assert!(
            (100..=150).contains(&cfg.iterations),
            "iteration cap {} outside expected order of magnitude",
            cfg.iterations
        );
        assert!(cfg.min_step > 0.0, "step floor must be positive");
        assert!(cfg.max_travel > 0.0);
        assert!(cfg.intensity_cap > 0.0);
    }
    // The chromatic look marches deeper than the plain one.
    assert!(cfgs.iter().any(|c| c.chromatic));
    assert!(cfgs.iter().any(|c| !c.chromatic));
}

#[test]
fn every_variant_renders_non_black_frames() {
    let variants = make_variants();
    let w = 96usize;
    let h = 64usize;

    for idx in 0..variants.len() {
        let mut engine = TunnelEngine::new(variants.clone(), idx, false, false, 3600.0);
        engine.resize(w, h);

        let mut had_non_black = false;
        for f in 0..8 {
            let pixels = engine.render(&ctx(f as f32 * 0.2, w, h), Instant::now());
            assert_eq!(pixels.len(), w * h * 4);
            had_non_black |= has_non_black(pixels);
        }
        assert!(
            had_non_black,
            "variant {} ('{}') stayed fully black",
            idx,
            variants[idx].name
        );
    }
}

#[test]
fn engine_renders_identical_frames_for_identical_ctx() {
    let variants = make_variants();
    let mut engine = TunnelEngine::new(variants.clone(), 0, false, false, 3600.0);
    engine.resize(64, 48);

    let now = Instant::now();
    let a = engine.render(&ctx(1.5, 64, 48), now).to_vec();
    let b = engine.render(&ctx(1.5, 64, 48), now).to_vec();
    assert_eq!(a, b, "same ctx must produce the same pixels");
}

#[test]
fn block_scale_replicates_pixels() {
    let variants = make_variants();
    let mut engine = TunnelEngine::new(variants, 0, false, false, 3600.0);
    let w = 32usize;
    let h = 24usize;
    engine.resize(w, h);

    let mut c = ctx(0.8, w, h);
    c.scale = 4;
    let pixels = engine.render(&c, Instant::now()).to_vec();

    // Every 4x4 block holds one shade result.
    for by in (0..h).step_by(4) {
        for bx in (0..w).step_by(4) {
            let base = (by * w + bx) * 4;
            for dy in 0..4.min(h - by) {
                for dx in 0..4.min(w - bx) {
                    let i = ((by + dy) * w + bx + dx) * 4;
                    assert_eq!(
                        &pixels[i..i + 4],
                        &pixels[base..base + 4],
                        "block ({bx},{by}) not uniform at ({dx},{dy})"
                    );
                }
            }
        }
    }
}

#[test]
fn manual_stepping_wraps_both_ways() {
    let variants = make_variants();
    let n = variants.len();
    let mut engine = TunnelEngine::new(variants, 0, false, false, 3600.0);
    engine.resize(32, 24);

    engine.prev_variant();
    settle_fade(&mut engine, 32, 24);
    assert_eq!(engine.variant_index(), n - 1, "prev from 0 should wrap to the last variant");

    engine.next_variant();
    settle_fade(&mut engine, 32, 24);
    assert_eq!(engine.variant_index(), 0, "next should wrap back to 0");
}

#[test]
fn crossfade_lands_on_the_target_variant() {
    let variants = make_variants();
    let mut engine = TunnelEngine::new(variants, 0, false, false, 3600.0);
    engine.resize(48, 32);

    engine.set_variant(3);
    // Mid-fade the engine still reports the outgoing variant.
    engine.render(&ctx(0.1, 48, 32), Instant::now());
    let later = Instant::now() + Duration::from_millis(900);
    engine.render(&ctx(0.2, 48, 32), later);
    assert_eq!(engine.variant_index(), 3, "fade should complete onto the target");
}

#[test]
fn auto_cycle_switches_after_interval() {
    let variants = make_variants();
    let mut engine = TunnelEngine::new(variants, 0, false, true, 2.0);
    engine.resize(32, 24);

    let start = engine.variant_index();
    engine.update_auto_cycle(Instant::now() + Duration::from_secs(3));
    // Finish the crossfade.
    engine.render(&ctx(0.1, 32, 24), Instant::now() + Duration::from_secs(5));
    assert_ne!(engine.variant_index(), start, "auto-cycle should advance the variant");
}

#[test]
fn shuffle_pick_never_repeats_current() {
    let variants = make_variants();
    for _ in 0..30 {
        let mut engine = TunnelEngine::new(variants.clone(), 2, true, true, 1.0);
        engine.resize(32, 24);
        engine.update_auto_cycle(Instant::now() + Duration::from_secs(2));
        engine.render(&ctx(0.1, 32, 24), Instant::now() + Duration::from_secs(4));
        assert_ne!(engine.variant_index(), 2, "shuffle landed on the current variant");
    }
}

#[test]
#[should_panic(expected = "at least one variant")]
fn engine_rejects_an_empty_variant_table() {
    let _ = TunnelEngine::new(Vec::new(), 0, false, false, 20.0);
}

#[test]
fn jump_skips_the_crossfade() {
    let variants = make_variants();
    let mut engine = TunnelEngine::new(variants, 0, false, false, 3600.0);
    engine.jump_to_variant(5);
    assert_eq!(engine.variant_index(), 5);
    assert_eq!(engine.variant_name(), "Hammer Vortex: Violent Twist");
}

fn settle_fade(engine: &mut TunnelEngine, w: usize, h: usize) {
    let later = Instant::now() + Duration::from_secs(2);
    engine.render(
        &RenderCtx {
            t: 0.5,
            w,
            h,
            params: EffectParams::default(),
            scale: 1,
        },
        later,
    );
}
