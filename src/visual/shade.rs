//! Pure per-pixel shading core.
//!
//! Everything in this module is a total function of its inputs: the same
//! (pixel, resolution, time, params) always produces the same color, so
//! pixels can be evaluated in any order or concurrently. No allocation,
//! no I/O, no shared state.

use crate::visual::EffectParams;
use crate::visual::variants::{Family, MarchCfg, Variant};
use std::f32::consts::PI;

const TAU: f32 = 2.0 * PI;

/// Axial repeat period for the marched tunnel field: one full breathing
/// cycle (4*pi), so the modulo seam lands on a wave zero-crossing.
const Z_WRAP: f32 = 12.566_370;

const PATH_SEG_LEN: f32 = 6.0;
const PATH_BLEND_LEN: f32 = 2.2;

// ── small math helpers ──────────────────────────────────────────────────────

#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t)]
}

/// Hermite smoothstep; edges may be given in descending order, which
/// inverts the ramp (matches the usual shading-language semantics).
#[inline]
pub fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Cubic ease in/out on [0,1]; clamps outside.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn rotate(x: f32, y: f32, angle: f32) -> (f32, f32) {
    let (s, c) = angle.sin_cos();
    (x * c - y * s, x * s + y * c)
}

// ── NoiseField ──────────────────────────────────────────────────────────────

/// Deterministic 2D lattice hash in [0,1).
pub fn hash21(x: f32, y: f32) -> f32 {
    let mut hx = fract(x * 123.34);
    let mut hy = fract(y * 456.21);
    let d = hx * (hx + 45.32) + hy * (hy + 45.32);
    hx += d;
    hy += d;
    fract(hx * hy)
}

/// Value noise: smoothstep-weighted bilinear blend of the four corner
/// hashes, continuous across lattice boundaries.
pub fn value_noise(x: f32, y: f32) -> f32 {
    let ix = x.floor();
    let iy = y.floor();
    let mut fx = x - ix;
    let mut fy = y - iy;
    fx = fx * fx * (3.0 - 2.0 * fx);
    fy = fy * fy * (3.0 - 2.0 * fy);

    let a = hash21(ix, iy);
    let b = hash21(ix + 1.0, iy);
    let c = hash21(ix, iy + 1.0);
    let d = hash21(ix + 1.0, iy + 1.0);
    mix(mix(a, b, fx), mix(c, d, fx), fy)
}

// ── PaletteMapper ───────────────────────────────────────────────────────────

/// Triadic sinusoid palette, periodic with period 1 in `phase`.
/// `shift` rotates the whole wheel. Channels are always in [0,1].
pub fn palette(phase: f32, shift: f32) -> [f32; 3] {
    [
        0.5 + 0.5 * (TAU * (phase + shift)).sin(),
        0.5 + 0.5 * (TAU * (phase + 0.33 + shift)).sin(),
        0.5 + 0.5 * (TAU * (phase + 0.66 + shift)).sin(),
    ]
}

// ── PathModel ───────────────────────────────────────────────────────────────

#[inline]
fn cardinal(idx: i32) -> (f32, f32) {
    match idx.rem_euclid(4) {
        0 => (1.0, 0.0),
        1 => (0.0, 1.0),
        2 => (-1.0, 0.0),
        _ => (0.0, -1.0),
    }
}

/// Local tunnel heading at travel depth `z`: piecewise cardinal directions
/// cycling +X, +Y, -X, -Y, eased toward the next cardinal over the final
/// `PATH_BLEND_LEN` units of each segment.
pub fn path_direction(z: f32) -> (f32, f32) {
    let t = z / PATH_SEG_LEN;
    let seg = t.floor() as i32;
    let f = fract(t);

    let (dx, dy) = cardinal(seg);
    let (nx, ny) = cardinal(seg + 1);

    let corner_start = 1.0 - PATH_BLEND_LEN / PATH_SEG_LEN;
    let w = ease_in_out((f - corner_start) / (1.0 - corner_start));

    let bx = mix(dx, nx, w);
    let by = mix(dy, ny, w);
    let len = (bx * bx + by * by).sqrt().max(1e-6);
    (bx / len, by / len)
}

/// Lateral center offset at depth `z`: forward drift along the local
/// heading plus a sinusoidal bow perpendicular to it, so corners read as
/// rounded rather than angular. `forward_gain` scales the drift,
/// `bow_amp` the excursion; callers damp the result.
pub fn path_center(z: f32, bow_amp: f32, forward_gain: f32) -> (f32, f32) {
    let f = fract(z / PATH_SEG_LEN);
    let (dx, dy) = path_direction(z);
    let phase = ease_in_out(f);
    let bow = bow_amp * (PI * phase).sin() * ease_in_out(phase);
    (
        dx * (f * PATH_SEG_LEN * forward_gain) - dy * bow,
        dy * (f * PATH_SEG_LEN * forward_gain) + dx * bow,
    )
}

// ── TunnelField ─────────────────────────────────────────────────────────────

/// Signed distance-like value for the wobbling tube: negative inside,
/// positive outside, zero at the wall. `z` must already be wrapped into
/// one axial period by the caller.
pub fn tunnel_distance(x: f32, y: f32, z: f32, time: f32, cfg: &MarchCfg) -> f32 {
    let r = (x * x + y * y).sqrt();
    let wave = cfg.wave_amp * (6.0 * z + 2.0 * (3.0 * z + time * 0.6).sin()).sin();
    let rings = cfg.ring_amp * (40.0 * (r + cfg.ring_drift * (2.0 * z + time).sin())).sin();
    r - (1.0 + wave + rings)
}

// ── Raymarcher ──────────────────────────────────────────────────────────────

/// Step rule: proportional to |distance| so empty space is crossed
/// quickly, floored at `min_step` so the loop always progresses even when
/// the sample sits exactly on the wall.
#[inline]
pub fn step_advance(dist: f32, min_step: f32, step_gain: f32) -> f32 {
    (step_gain * dist.abs()).max(min_step)
}

/// Soft wall-band response: 1 at the wall, falling to 0 once |distance|
/// exceeds `thickness`. Widening `thickness` strictly increases the
/// weight of any sample inside the band.
#[inline]
pub fn glow_weight(dist: f32, thickness: f32) -> f32 {
    1.0 - smoothstep(0.0, thickness.max(1e-4), dist.abs())
}

struct Marched {
    accum: f32,
    accum_rgb: [f32; 3],
    glow: f32,
    travel: f32,
}

fn march(cfg: &MarchCfg, ox: f32, oy: f32, oz: f32, dx: f32, dy: f32, dz: f32, time: f32, thickness: f32) -> Marched {
    let mut t = 0.0f32;
    let mut accum = 0.0f32;
    let mut accum_rgb = [0.0f32; 3];
    let mut glow = 0.0f32;

    for _ in 0..cfg.iterations {
        let sx = ox + dx * t;
        let sy = oy + dy * t;
        let sz = oz + dz * t;

        // Wrap the axial coordinate so the tunnel repeats seamlessly; the
        // chromatic variant slides the wrap origin for a woozier loop.
        let zw = if cfg.chromatic {
            (sz + 10.0 * (time * 0.15 + sx * 0.07).sin()).rem_euclid(Z_WRAP)
        } else {
            sz.rem_euclid(Z_WRAP)
        };

        let d = tunnel_distance(sx, sy, zw, time, cfg);
        let hit = (-cfg.hit_sharpness * d.abs()).exp();
        let n = value_noise(
            sx * cfg.noise_scale + time * cfg.noise_drift.0,
            sy * cfg.noise_scale - time * cfg.noise_drift.1,
        );
        let layer = 0.5 + 0.5 * (cfg.layer_freq * sz + cfg.layer_noise * n + time * cfg.layer_rate).sin();

        if cfg.chromatic {
            let pulse = 0.6 + 0.4 * (sz * 3.0 + time * 4.0 + n * 6.0).sin();
            accum_rgb[0] += hit * layer * (1.0 + 0.2 * (time * 2.3 + sz * 2.0 + n * 3.0).sin()) * pulse;
            accum_rgb[1] += hit * layer * (1.0 + 0.2 * (time * 2.7 + sz * 2.2 + n * 2.5).sin()) * pulse;
            accum_rgb[2] += hit * layer * (1.0 + 0.2 * (time * 3.1 + sz * 2.4 + n * 2.0).sin()) * pulse;
        } else {
            accum += hit * layer;
        }
        glow += hit * glow_weight(d, thickness);

        t += step_advance(d, cfg.min_step, cfg.step_gain);
        if t > cfg.max_travel {
            break;
        }
    }

    Marched { accum, accum_rgb, glow, travel: t }
}

// ── Compositor ──────────────────────────────────────────────────────────────

/// Clamp each channel to [0,1] and apply power-law gamma. Clamping first
/// keeps non-integer exponents away from negative bases.
#[inline]
pub fn tone_map(col: [f32; 3], gamma: f32) -> [f32; 3] {
    [
        col[0].clamp(0.0, 1.0).powf(gamma),
        col[1].clamp(0.0, 1.0).powf(gamma),
        col[2].clamp(0.0, 1.0).powf(gamma),
    ]
}

// ── coordinate normalization ────────────────────────────────────────────────

/// Raster position -> aspect-corrected coordinate with y up, x in
/// [-aspect, aspect] and y in [-1, 1]. Degenerate resolutions fall back
/// to 1280x720 so normalization never divides by zero.
pub fn normalize_coord(px: f32, py: f32, width: f32, height: f32) -> (f32, f32) {
    let (w, h) = if width <= 0.0 || height <= 0.0 {
        (1280.0, 720.0)
    } else {
        (width, height)
    };
    ((2.0 * px - w) / h, (h - 2.0 * py) / h)
}

// ── shade entry point ───────────────────────────────────────────────────────

/// Compute the color of one pixel of one frame. Pure; all parameter
/// clamping happens here at the boundary.
pub fn shade(
    px: f32,
    py: f32,
    width: f32,
    height: f32,
    time: f32,
    params: &EffectParams,
    variant: &Variant,
) -> [f32; 3] {
    let (x, y) = normalize_coord(px, py, width, height);
    let p = params.clamped();
    match &variant.family {
        Family::March(cfg) => shade_marched(cfg, x, y, time, &p),
        Family::CornerBend => shade_corner_bend(x, y, time, &p),
        Family::FlowerBurst => shade_flower_burst(x, y, time, &p),
        Family::RingLattice => shade_ring_lattice(x, y, time, &p),
        Family::HammerVortex => shade_hammer_vortex(x, y, time, &p),
    }
}

// ── marched family ──────────────────────────────────────────────────────────

fn shade_marched(cfg: &MarchCfg, x: f32, y: f32, time: f32, p: &EffectParams) -> [f32; 3] {
    let mut qx = x;
    let mut qy = y;
    let mut ox = 0.0f32;
    let mut oy = 0.0f32;

    if cfg.chromatic {
        // Drifting center plus a center-weighted swirl before the march.
        let mut cx = (time * 0.6).sin() * 0.35 * (0.5 + 0.5 * p.warp);
        let mut cy = (time * 0.4).cos() * 0.25 * (0.5 + 0.5 * p.warp);
        cx += 0.08 * value_noise(time * 0.7, 0.0);
        cy += 0.08 * value_noise(0.0, time * 0.9);
        qx -= cx * 0.6;
        qy -= cy * 0.6;

        let r = (qx * qx + qy * qy).sqrt();
        let strength = 0.8 * (1.0 / (0.5 + r)) * p.warp;
        let angle = time * 0.8 + 2.0 * (time * 0.4 + r * 6.0).sin();
        (qx, qy) = rotate(qx, qy, angle * strength);

        ox = cx * 2.0;
        oy = cy * 2.0;
    }

    // Camera ray: slight pitch oscillation on the projection depth.
    let pz = -cfg.proj_depth + cfg.pitch_amp * (time * 0.2).sin();
    let len = (qx * qx + qy * qy + pz * pz).sqrt();
    let (dx, dy, dz) = (qx / len, qy / len, pz / len);
    let oz = time * p.speed;

    let m = march(cfg, ox, oy, oz, dx, dy, dz, time, p.thickness);

    let depth = (-cfg.fog_falloff * m.travel).exp().clamp(0.0, 1.0);
    let plen = (qx * qx + qy * qy).sqrt();

    let mut col = if cfg.chromatic {
        compose_chromatic(cfg, &m, qx, qy, plen, depth, time, p)
    } else {
        let intensity = (m.accum * cfg.accum_gain + m.glow * cfg.glow_gain).clamp(0.0, cfg.intensity_cap);
        let pos = fract(time * cfg.palette_rate * p.warp + m.travel * cfg.palette_depth + m.accum * 0.1);
        let base = palette(pos, p.color_shift);
        let mut col = [base[0] * intensity, base[1] * intensity, base[2] * intensity];

        let veins = 0.5
            + 0.5
                * (cfg.vein_freq * plen - time * cfg.vein_rate
                    + value_noise(qx * cfg.vein_noise, qy * cfg.vein_noise))
                .sin();
        let vp = palette(pos + 0.2, p.color_shift);
        for (c, v) in col.iter_mut().zip(vp) {
            *c += cfg.vein_gain * v * veins;
        }
        col
    };

    let vig = smoothstep(cfg.vignette.0, cfg.vignette.1, plen);
    for c in &mut col {
        *c *= vig;
    }
    col = mix3(cfg.background, col, depth);
    tone_map(col, cfg.gamma)
}

fn compose_chromatic(
    cfg: &MarchCfg,
    m: &Marched,
    qx: f32,
    qy: f32,
    plen: f32,
    _depth: f32,
    time: f32,
    p: &EffectParams,
) -> [f32; 3] {
    let [ar, ag, ab] = m.accum_rgb;
    let base = fract(time * cfg.palette_rate * p.warp + m.travel * cfg.palette_depth);
    let pos_r = fract(base + ar * 0.08 + 0.01);
    let pos_g = fract(base + ag * 0.06);
    let pos_b = fract(base + ab * 0.04 - 0.01);

    let cr = palette(pos_r, p.color_shift)[0];
    let cg = palette(pos_g, p.color_shift)[1];
    let cb = palette(pos_b, p.color_shift)[2];

    let ir = (ar * cfg.accum_gain + m.glow * cfg.glow_gain).clamp(0.0, cfg.intensity_cap);
    let ig = (ag * cfg.accum_gain + m.glow * cfg.glow_gain).clamp(0.0, cfg.intensity_cap);
    let ib = (ab * cfg.accum_gain + m.glow * cfg.glow_gain).clamp(0.0, cfg.intensity_cap);

    let mut col = [cr * ir, cg * ig, cb * ib];

    // Soft cross-channel bleed keeps the separation dreamy, not harsh.
    let bleed = 0.5 + 0.5 * value_noise(qx * 8.0 + time * 0.7, qy * 8.0 + time * 0.7);
    let bp = palette(base + 0.2, p.color_shift);
    for (c, v) in col.iter_mut().zip(bp) {
        *c += 0.15 * v * bleed;
    }

    let veins = 0.5
        + 0.5
            * (cfg.vein_freq * plen - time * cfg.vein_rate
                + value_noise(qx * cfg.vein_noise, qy * cfg.vein_noise))
            .sin();
    let vp = palette(base + 0.35, p.color_shift);
    for (c, v) in col.iter_mut().zip(vp) {
        *c += cfg.vein_gain * v * veins;
    }

    let boost = smoothstep(0.7, 0.0, plen) * (1.0 + 0.8 * (time * 1.5).sin());
    let cp = palette(base + 0.5, p.color_shift);
    for (c, v) in col.iter_mut().zip(cp) {
        *c += 0.25 * boost * v;
    }

    // Chromatic smear: nudge the red/blue ends toward offset palette taps.
    let ca = value_noise(qx * 10.0 + time * 0.3, qy * 10.0 + time * 0.3);
    col[0] = mix(col[0], palette(fract(base + ca * 0.02 + 0.02), p.color_shift)[0], 0.12);
    col[2] = mix(col[2], palette(fract(base - ca * 0.02 - 0.02), p.color_shift)[2], 0.12);

    col
}

// ── corner-bend family ──────────────────────────────────────────────────────

fn bend_material(r: f32, a: f32, z: f32, shift: f32) -> [f32; 3] {
    let rings = (10.0 * r - 0.6 * z).sin();
    let stripes = (8.0 * a + 1.2 * z).sin();
    let mixv = 0.5 + 0.5 * rings * stripes;

    let base_a = [0.10, 0.25, 0.90];
    let base_b = [0.95, 0.30, 0.10];
    let mut col = mix3(base_a, base_b, 0.5 + 0.5 * (a * 2.0 + shift).sin());
    let gain = 0.6 + 0.4 * mixv;
    let v = smoothstep(1.4, 0.2, r);
    for c in &mut col {
        *c *= gain * (0.6 + 0.4 * v);
    }
    col
}

fn shade_corner_bend(x: f32, y: f32, time: f32, p: &EffectParams) -> [f32; 3] {
    let z = time * p.speed;

    let bank = 0.6 * (0.7 * z).sin();
    let (cx, cy) = path_center(z, 1.6, 1.0);
    let (px, py) = (x - cx * 0.15, y - cy * 0.15);

    let (qx, qy) = rotate(px, py, bank);
    let r = (qx * qx + qy * qy).sqrt();
    let turn_ease = ease_in_out(fract(z / PATH_SEG_LEN));

    // Subtle per-channel separation, widened slightly through corners.
    let ca = 0.004 + 0.002 * turn_ease;
    let mut col = [0.0f32; 3];
    for (ch, off) in [(0usize, ca), (1, 0.0), (2, -ca)] {
        let ex = qx + off;
        let er = (ex * ex + qy * qy).sqrt();
        let mut ea = qy.atan2(ex);
        ea += 0.35 * p.warp * turn_ease * (2.0 * ea).sin();
        col[ch] = bend_material(er, ea, z, p.color_shift)[ch];
    }

    // Speed lines near the axis plus segment markers for depth cues.
    let glow = (-10.0 * r).exp();
    let pulse = 0.5 + 0.5 * (1.5 * z).sin();
    col[0] += 0.9 * glow * pulse;
    col[1] += 0.9 * glow * pulse;
    col[2] += 1.0 * glow * pulse;

    let markers = 0.5 + 0.5 * (10.0 * r - 0.6 * z).sin();
    for c in &mut col {
        *c *= 0.8 + 0.2 * markers;
    }

    tone_map(col, 0.9)
}

// ── flower family ───────────────────────────────────────────────────────────

fn shade_flower_burst(x: f32, y: f32, time: f32, p: &EffectParams) -> [f32; 3] {
    let z = time * p.speed;
    let r = (x * x + y * y).sqrt();
    let a = y.atan2(x);

    let rings = (10.0 * r - z).sin();
    let stripes = (6.0 * a + z + p.color_shift).sin();
    let v = rings * stripes;

    [
        (0.5 + 0.5 * v).clamp(0.0, 1.0),
        (0.3 + 0.3 * v).clamp(0.0, 1.0),
        (0.8 - 0.5 * v).clamp(0.0, 1.0),
    ]
}

// ── ring-lattice family ─────────────────────────────────────────────────────

fn shade_ring_lattice(x: f32, y: f32, time: f32, p: &EffectParams) -> [f32; 3] {
    let z = time * p.speed;
    let r = (x * x + y * y).sqrt();
    let mut a = y.atan2(x);
    a += p.warp * 0.25 * (2.0 * a + 0.8 * z).sin();

    let rings = smoothstep(p.thickness, 0.0, (10.0 * r - 0.7 * z).sin().abs());
    let stripes = 0.5 + 0.5 * (6.0 * a + 1.1 * z + p.color_shift).sin();

    let base_a = [0.12, 0.25, 0.90];
    let base_b = [0.95, 0.30, 0.10];
    let mut col = mix3(base_a, base_b, stripes);
    for c in &mut col {
        *c = (*c * (0.45 + 0.55 * rings)).clamp(0.0, 1.0);
    }
    col
}

// ── hammer-vortex family ────────────────────────────────────────────────────

fn vortex_rings(r: f32, z: f32, thickness: f32) -> f32 {
    // Thicker walls soften the rings; thin walls keep them crisp.
    let freq = mix(18.0, 6.0, smoothstep(0.2, 2.0, thickness));
    let rim = (freq * r - 0.9 * z).sin();
    smoothstep(0.2, 0.5, rim * 0.8 + 0.2 * thickness)
}

fn vortex_palette(a: f32, r: f32, z: f32, shift: f32) -> [f32; 3] {
    let cool = [0.12, 0.25, 1.0];
    let warm = [1.0, 0.45, 0.08];
    let wheel = 0.5 + 0.5 * (a * 2.0 + z * 0.8 + shift).sin();
    let mut col = mix3(cool, warm, wheel);
    let dark = 0.5 + 0.5 * smoothstep(1.6, 0.2, r);
    for c in &mut col {
        *c *= dark;
    }
    col
}

/// Stylized hammer silhouette riding the tunnel axis: narrow handle plus
/// a wide head, scaled down as it recedes.
fn hammer_mask(ux: f32, uy: f32, z: f32) -> f32 {
    let travel = (z * 1.6).rem_euclid(8.0);
    let zpos = -fract(travel) * 2.0 + 0.4;
    let scale = mix(0.9, 0.25, (zpos + 1.0).clamp(0.0, 1.0));

    let hx = ux / scale;
    let hy = uy / scale;
    let handle = smoothstep(0.02, 0.01, hx.abs()) * smoothstep(0.6, 0.3, (hy - (0.3 - 0.8 * zpos)).abs());
    let head_x = hx;
    let head_y = hy - (-0.15 - 0.5 * zpos);
    let head = smoothstep(
        0.35 + 0.02 * scale,
        0.33 + 0.02 * scale,
        head_x.abs().max((head_y * 0.4).abs()),
    );
    let mask = (head + handle * 0.7).clamp(0.0, 1.0);
    smoothstep(0.15, 0.0, 1.0 - mask)
}

/// Approximate hue rotation (YIQ axis), used for the final color-shift
/// grade on the vortex variant.
fn hue_shift(col: [f32; 3], angle: f32) -> [f32; 3] {
    let (s, c) = angle.sin_cos();
    let m = [
        [
            0.299 + 0.701 * c + 0.168 * s,
            0.587 - 0.587 * c + 0.330 * s,
            0.114 - 0.114 * c - 0.497 * s,
        ],
        [
            0.299 - 0.299 * c - 0.328 * s,
            0.587 + 0.413 * c + 0.035 * s,
            0.114 - 0.114 * c + 0.292 * s,
        ],
        [
            0.299 - 0.300 * c + 1.250 * s,
            0.587 - 0.588 * c - 1.050 * s,
            0.114 + 0.886 * c - 0.203 * s,
        ],
    ];
    let mut out = [0.0f32; 3];
    for (o, row) in out.iter_mut().zip(m) {
        *o = (row[0] * col[0] + row[1] * col[1] + row[2] * col[2]).clamp(0.0, 1.0);
    }
    out
}

fn shade_hammer_vortex(x: f32, y: f32, time: f32, p: &EffectParams) -> [f32; 3] {
    let z = time * p.speed;
    let warp = p.warp.clamp(0.0, 3.0);
    let thickness = p.thickness;

    // Violent banking and strong lateral bows through the corners.
    let bank = 0.9 * (0.9 * z).sin();
    let (cx, cy) = path_center(z, 2.4, 0.75);
    let (px, py) = (x - cx * 0.12, y - cy * 0.12);
    let (qx, qy) = rotate(px, py, bank);

    let r = (qx * qx + qy * qy).sqrt();
    let mut a = qy.atan2(qx);

    let turn_ease = ease_in_out(fract(z / PATH_SEG_LEN));
    let base_warp = 0.6 + 1.6 * warp;
    // The center stays stable; outer walls twist hardest.
    let warp_fall = smoothstep(0.0, 1.6, r);
    a += base_warp
        * turn_ease
        * warp_fall
        * (0.8 * (2.2 * a + 0.6 * z).sin() + 0.6 * (5.1 * a + 0.12 * z).sin());

    // Chromatic offset widens with warp to emphasize the streaks.
    let ca = (0.006 + 0.006 * turn_ease) * (1.0 + 0.9 * warp);
    let mut col = [0.0f32; 3];
    for (ch, off) in [(0usize, ca), (1, 0.0), (2, -ca)] {
        let ex = qx + off;
        let er = (ex * ex + qy * qy).sqrt();
        let ea = qy.atan2(ex);
        let rings = vortex_rings(er, z, thickness);
        col[ch] = vortex_palette(ea, er, z, p.color_shift)[ch] * (0.5 + 0.6 * rings);
    }

    // High-frequency motion lines near the axis.
    let streak = smoothstep(0.0, 0.3, 1.0 - (18.0 * (a + 0.2 * z)).sin().abs());
    let core = (1.0 - r * 6.0).max(0.0).powi(3);
    let boost = 1.2 * core * streak * (0.5 + 0.8 * warp);
    col[0] += 0.9 * boost;
    col[1] += 0.95 * boost;
    col[2] += boost;

    // Hammer silhouette on the unwarped frame so it reads as an object
    // passing through, not part of the walls.
    let hammer = hammer_mask(x, y * 1.6, z);
    let metal = mix3([0.15, 0.10, 0.05], [1.0, 0.95, 0.90], 0.9);
    let blend = smoothstep(0.02, 0.6, hammer);
    col[0] = mix(col[0], metal[0] + 2.2 * hammer, blend);
    col[1] = mix(col[1], metal[1] + 2.2 * 0.9 * hammer, blend);
    col[2] = mix(col[2], metal[2] + 2.2 * 0.6 * hammer, blend);

    let vig = smoothstep(1.6, 0.2, r) * (0.6 + 0.4 * (1.5 - thickness.clamp(0.2, 2.0)));
    for c in &mut col {
        *c = (*c * vig).clamp(0.0, 1.0);
    }

    if p.color_shift.abs() > 1e-5 {
        col = hue_shift(col, p.color_shift);
    }

    tone_map(col, 0.9)
}
