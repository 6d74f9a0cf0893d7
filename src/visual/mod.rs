pub mod shade;
pub mod variants;

pub use shade::shade;
pub use variants::{make_variants, Family, MarchCfg, Variant};

use rayon::prelude::*;
use std::time::{Duration, Instant};

/// The four user-tunable knobs. Raw values may be anything the host
/// hands over; `clamped` is applied at the shading boundary so every
/// variant sees sane ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    pub speed: f32,
    pub warp: f32,
    pub thickness: f32,
    pub color_shift: f32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            speed: 6.0,
            warp: 1.0,
            thickness: 0.18,
            color_shift: 0.0,
        }
    }
}

impl EffectParams {
    pub fn clamped(&self) -> Self {
        Self {
            speed: if self.speed.is_finite() { self.speed.max(0.001) } else { 6.0 },
            warp: if self.warp.is_finite() { self.warp.max(0.1) } else { 1.0 },
            thickness: if self.thickness.is_finite() { self.thickness.max(0.01) } else { 0.18 },
            color_shift: if self.color_shift.is_finite() { self.color_shift } else { 0.0 },
        }
    }

    pub fn scale_speed(&mut self, factor: f32) {
        self.speed = (self.speed * factor).clamp(0.05, 80.0);
    }

    pub fn nudge_warp(&mut self, delta: f32) {
        self.warp = (self.warp + delta).clamp(0.1, 8.0);
    }

    pub fn nudge_thickness(&mut self, delta: f32) {
        self.thickness = (self.thickness + delta).clamp(0.01, 2.5);
    }

    pub fn nudge_color_shift(&mut self, delta: f32) {
        self.color_shift += delta;
    }
}

/// Per-frame inputs to the engine.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub t: f32,
    pub w: usize,
    pub h: usize,
    pub params: EffectParams,
    /// Sample block edge; blocks > 1 decimate shade calls.
    pub scale: usize,
}

const FADE_DURATION: Duration = Duration::from_millis(700);

/// Variant playback: owns the pixel buffer, fills it from the pure
/// shading core and handles manual/auto cycling with a short crossfade.
pub struct TunnelEngine {
    variants: Vec<Variant>,
    active: usize,
    incoming: Option<usize>,
    fade_start: Option<Instant>,
    auto_cycle: bool,
    shuffle: bool,
    switch_every: Duration,
    last_switch: Instant,
    frame: Vec<u8>,
    scratch: Vec<u8>,
    w: usize,
    h: usize,
}

impl TunnelEngine {
    pub fn new(
        variants: Vec<Variant>,
        active: usize,
        shuffle: bool,
        auto_cycle: bool,
        seconds_per_switch: f32,
    ) -> Self {
        assert!(!variants.is_empty(), "engine needs at least one variant");
        let count = variants.len();
        Self {
            variants,
            active: active.min(count - 1),
            incoming: None,
            fade_start: None,
            auto_cycle,
            shuffle,
            switch_every: Duration::from_secs_f32(seconds_per_switch.clamp(1.0, 3600.0)),
            last_switch: Instant::now(),
            frame: Vec::new(),
            scratch: Vec::new(),
            w: 0,
            h: 0,
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        let len = w.saturating_mul(h).saturating_mul(4);
        self.frame.clear();
        self.frame.resize(len, 0);
        self.scratch.clear();
        self.scratch.resize(len, 0);
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn variant_index(&self) -> usize {
        self.active
    }

    pub fn variant_name(&self) -> &'static str {
        self.variants.get(self.active).map(|v| v.name).unwrap_or("?")
    }

    pub fn auto_cycle(&self) -> bool {
        self.auto_cycle
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn toggle_auto_cycle(&mut self) {
        self.auto_cycle = !self.auto_cycle;
        self.last_switch = Instant::now();
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn next_variant(&mut self) {
        let n = self.variants.len();
        if n > 1 {
            self.begin_fade((self.current_target() + 1) % n, Instant::now());
        }
    }

    pub fn prev_variant(&mut self) {
        let n = self.variants.len();
        if n > 1 {
            self.begin_fade((self.current_target() + n - 1) % n, Instant::now());
        }
    }

    pub fn set_variant(&mut self, idx: usize) {
        if idx < self.variants.len() {
            self.begin_fade(idx, Instant::now());
        }
    }

    /// Cut to a variant with no crossfade. Used at startup.
    pub fn jump_to_variant(&mut self, idx: usize) {
        if idx < self.variants.len() {
            self.active = idx;
            self.incoming = None;
            self.fade_start = None;
            self.last_switch = Instant::now();
        }
    }

    pub fn update_auto_cycle(&mut self, now: Instant) {
        if !self.auto_cycle || self.incoming.is_some() || self.variants.len() < 2 {
            return;
        }
        if now.duration_since(self.last_switch) < self.switch_every {
            return;
        }
        let n = self.variants.len();
        let target = if self.shuffle {
            // Skip the current slot so a shuffle pick always moves.
            let pick = fastrand::usize(..n - 1);
            if pick >= self.active { pick + 1 } else { pick }
        } else {
            (self.active + 1) % n
        };
        self.begin_fade(target, now);
    }

    fn current_target(&self) -> usize {
        self.incoming.unwrap_or(self.active)
    }

    fn begin_fade(&mut self, target: usize, now: Instant) {
        if target == self.active && self.incoming.is_none() {
            return;
        }
        // Retargeting mid-fade cuts the old fade short.
        if let Some(cur) = self.incoming.take() {
            self.active = cur;
        }
        if target != self.active {
            self.incoming = Some(target);
            self.fade_start = Some(now);
        }
        self.last_switch = now;
    }

    pub fn render(&mut self, ctx: &RenderCtx, now: Instant) -> &[u8] {
        if ctx.w != self.w || ctx.h != self.h {
            self.resize(ctx.w, ctx.h);
        }
        if self.frame.is_empty() {
            return &self.frame;
        }

        let active = self.variants[self.active];
        fill_frame(&mut self.frame, &active, ctx);

        if let (Some(target), Some(started)) = (self.incoming, self.fade_start) {
            let progress =
                (now.duration_since(started).as_secs_f32() / FADE_DURATION.as_secs_f32()).min(1.0);
            let alpha = shade::ease_in_out(progress);

            let incoming = self.variants[target];
            fill_frame(&mut self.scratch, &incoming, ctx);
            for (d, s) in self.frame.iter_mut().zip(self.scratch.iter()) {
                *d = (*d as f32 + (*s as f32 - *d as f32) * alpha) as u8;
            }

            if progress >= 1.0 {
                self.active = target;
                self.incoming = None;
                self.fade_start = None;
            }
        }

        &self.frame
    }
}

/// Fill an RGBA buffer from the pure core, one rayon job per block row.
/// Blocks of `scale` pixels share a single shade evaluation.
fn fill_frame(buf: &mut [u8], variant: &Variant, ctx: &RenderCtx) {
    let w = ctx.w;
    let h = ctx.h;
    let scale = ctx.scale.max(1);
    if w == 0 || h == 0 || buf.len() < w * h * 4 {
        return;
    }

    let row_bytes = w * 4;
    let wf = w as f32;
    let hf = h as f32;

    buf[..h * row_bytes]
        .par_chunks_mut(row_bytes * scale)
        .enumerate()
        .for_each(|(band, chunk)| {
            let by = band * scale;
            let band_rows = chunk.len() / row_bytes;
            for bx in (0..w).step_by(scale) {
                let col = shade(
                    bx as f32 + 0.5,
                    by as f32 + 0.5,
                    wf,
                    hf,
                    ctx.t,
                    &ctx.params,
                    variant,
                );
                let r = channel_u8(col[0]);
                let g = channel_u8(col[1]);
                let b = channel_u8(col[2]);
                for dy in 0..band_rows {
                    let row = dy * row_bytes;
                    for dx in 0..scale.min(w - bx) {
                        let i = row + (bx + dx) * 4;
                        chunk[i] = r;
                        chunk[i + 1] = g;
                        chunk[i + 2] = b;
                        chunk[i + 3] = 255;
                    }
                }
            }
        });
}

#[inline]
fn channel_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}
