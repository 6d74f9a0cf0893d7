use crate::config::{Config, Quality, RendererMode};
use crate::prefs::{prefs_storage_path, TunnelPrefs};
use crate::render::{AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::terminal::{checked_size, TerminalGuard};
use crate::visual::{make_variants, EffectParams, RenderCtx, TunnelEngine, Variant};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let prefs_path = if cfg.no_prefs { None } else { prefs_storage_path() };
    let prefs = TunnelPrefs::load(prefs_path.as_deref()).context("load prefs")?;

    let variants = make_variants();
    let active = select_variant(&cfg.variant, &variants)
        .unwrap_or(prefs.variant.min(variants.len().saturating_sub(1)));

    let mut params = EffectParams {
        speed: cfg.speed.unwrap_or(prefs.speed),
        warp: cfg.warp.unwrap_or(prefs.warp),
        thickness: cfg.thickness.unwrap_or(prefs.thickness),
        color_shift: cfg.color_shift.unwrap_or(prefs.color_shift),
    };

    let mut engine = TunnelEngine::new(
        variants,
        0,
        cfg.shuffle,
        cfg.auto_cycle,
        cfg.seconds_per_switch,
    );
    engine.jump_to_variant(active);

    let _term = TerminalGuard::new()?;
    let result = event_loop(&cfg, &mut engine, &mut params);

    if let Some(path) = prefs_path.as_deref() {
        let out = TunnelPrefs {
            speed: params.speed,
            warp: params.warp,
            thickness: params.thickness,
            color_shift: params.color_shift,
            variant: engine.variant_index(),
        };
        // Exit must not fail on a read-only config dir.
        let _ = out.save(Some(path));
    }

    result
}

fn event_loop(
    cfg: &Config,
    engine: &mut TunnelEngine,
    params: &mut EffectParams,
) -> anyhow::Result<()> {
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = match cfg.renderer {
        RendererMode::Ascii => (1usize, 1usize),
        RendererMode::HalfBlock => (1, 2),
        RendererMode::Braille => (2, 4),
    };

    let mut last_size = checked_size()?;
    let mut show_hud = true;
    let mut show_help = false;
    let mut hud_rows = hud_rows_for_size(last_size, show_hud);

    let mut runtime = RuntimeTuning::new(cfg.quality, cfg.adaptive_quality);
    let mut fps = FpsCounter::new();
    let mut last_engine_ms = 0.0f32;
    let mut last_render_ms = 0.0f32;
    let mut last_total_ms = 0.0f32;

    let start = Instant::now();

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let old_hud = show_hud;
                    if handle_key(k.code, k.modifiers, engine, params, &mut show_hud, &mut show_help) {
                        return Ok(());
                    }
                    if show_hud != old_hud {
                        hud_rows = hud_rows_for_size(last_size, show_hud);
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    hud_rows = hud_rows_for_size(last_size, show_hud);
                }
                _ => {}
            }
        }

        // Size check once per frame (resize events can be missed in some terminals).
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
            hud_rows = hud_rows_for_size(last_size, show_hud);
        }

        engine.update_auto_cycle(now);

        let (term_cols, term_rows) = last_size;
        let hud = if show_hud {
            build_wrapped_hud(
                term_cols as usize,
                engine.variant_name(),
                engine.variant_index(),
                engine.variant_count(),
                params,
                engine.auto_cycle(),
                cfg.seconds_per_switch,
                engine.shuffle(),
                fps.fps(),
                last_engine_ms,
                last_render_ms,
                last_total_ms,
                runtime.quality.label(),
                runtime.block_scale(),
                renderer.name(),
            )
        } else {
            String::new()
        };

        let target_hud_rows = hud_rows_for_text(term_rows, show_hud, &hud);
        if target_hud_rows != hud_rows {
            hud_rows = target_hud_rows;
        }
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let w = (term_cols as usize).saturating_mul(px_w_mul);
        let h = (visual_rows as usize).saturating_mul(px_h_mul);

        let ctx = RenderCtx {
            t: now.duration_since(start).as_secs_f32(),
            w,
            h,
            params: *params,
            scale: runtime.block_scale(),
        };

        let engine_start = Instant::now();
        let pixels = engine.render(&ctx, now);
        last_engine_ms = engine_start.elapsed().as_secs_f32() * 1000.0;

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pixels,
            hud: &hud,
            hud_rows,
            overlay: show_help.then(help_popup_text),
            sync_updates: cfg.sync_updates,
        };

        let render_start = Instant::now();
        renderer.render(&frame, &mut out)?;
        last_render_ms = render_start.elapsed().as_secs_f32() * 1000.0;
        last_total_ms = now.elapsed().as_secs_f32() * 1000.0;

        fps.tick();
        runtime.update(last_total_ms, 1000.0 / cfg.fps.max(1) as f32);

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn select_variant(wanted: &Option<String>, variants: &[Variant]) -> Option<usize> {
    let p = wanted.as_deref()?.trim();
    if p.is_empty() {
        return None;
    }
    if let Ok(i) = p.parse::<usize>() {
        return (i < variants.len()).then_some(i);
    }
    let p_l = p.to_lowercase();
    variants
        .iter()
        .position(|v| v.name.to_lowercase().contains(&p_l))
}

fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    engine: &mut TunnelEngine,
    params: &mut EffectParams,
    show_hud: &mut bool,
    show_help: &mut bool,
) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }

    match code {
        KeyCode::Esc => true,
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Up => {
            params.scale_speed(1.1);
            false
        }
        KeyCode::Down => {
            params.scale_speed(1.0 / 1.1);
            false
        }
        KeyCode::Left => {
            params.nudge_warp(-0.1);
            false
        }
        KeyCode::Right => {
            params.nudge_warp(0.1);
            false
        }
        KeyCode::Char('z') | KeyCode::Char('Z') => {
            params.nudge_thickness(-0.01);
            false
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            params.nudge_thickness(0.01);
            false
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            params.nudge_color_shift(-0.05);
            false
        }
        KeyCode::Char('v') | KeyCode::Char('V') => {
            params.nudge_color_shift(0.05);
            false
        }
        KeyCode::Char('[') => {
            engine.prev_variant();
            false
        }
        KeyCode::Char(']') => {
            engine.next_variant();
            false
        }
        KeyCode::Char(' ') => {
            engine.toggle_auto_cycle();
            false
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            engine.toggle_shuffle();
            false
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            *params = EffectParams::default();
            false
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            *show_hud = !*show_hud;
            false
        }
        KeyCode::Char('?') | KeyCode::Char('/') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            *show_help = !*show_help;
            false
        }
        _ => false,
    }
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud {
        return 0;
    }
    let rows = size.1;
    if rows <= 1 {
        return 0;
    }
    (rows - 1).min(4)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let max_rows = term_rows.saturating_sub(1);
    let wanted = hud.lines().count() as u16;
    wanted.min(max_rows)
}

#[allow(clippy::too_many_arguments)]
fn build_wrapped_hud(
    cols: usize,
    variant_name: &str,
    variant_idx: usize,
    variant_count: usize,
    params: &EffectParams,
    auto_cycle: bool,
    seconds_per_switch: f32,
    shuffle: bool,
    fps: f32,
    engine_ms: f32,
    render_ms: f32,
    total_ms: f32,
    quality: &str,
    scale: usize,
    renderer_name: &str,
) -> String {
    let logical_lines = vec![
        format!(
            "Variant: {} ({}/{}) | Auto: {}{} | Shuffle: {} | FPS: {:>4.1}",
            variant_name,
            variant_idx + 1,
            variant_count,
            if auto_cycle { "on" } else { "off" },
            if auto_cycle {
                format!(" ({seconds_per_switch:.0}s)")
            } else {
                String::new()
            },
            if shuffle { "on" } else { "off" },
            fps,
        ),
        format!(
            "Speed: {:>5.2} | Warp: {:>4.2} | Thickness: {:>4.2} | ColorShift: {:>+5.2}",
            params.speed, params.warp, params.thickness, params.color_shift
        ),
        format!(
            "ms(E/R/T): {:>4.1}/{:>4.1}/{:>4.1} | Quality: {} (x{}) | Renderer: {}",
            engine_ms, render_ms, total_ms, quality, scale, renderer_name
        ),
        "Keys: [/] variant | space auto | s shuffle | up/down speed | left/right warp | z/x thickness | c/v color | r reset | i HUD | ?/h/F1 help | q quit".to_string(),
    ];

    wrap_hud_lines(cols, &logical_lines).join("\n")
}

fn wrap_hud_lines(cols: usize, lines: &[String]) -> Vec<String> {
    let width = cols.max(1);
    let mut out = Vec::new();
    for line in lines {
        out.extend(hard_wrap_line(line, width));
    }
    out
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;
    for ch in line.chars() {
        cur.push(ch);
        cur_len += 1;
        if cur_len >= width {
            out.push(cur);
            cur = String::new();
            cur_len = 0;
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn help_popup_text() -> &'static str {
    "TUI Tunnel Hotkeys\n\
[ / ]  previous/next variant\n\
space  toggle timed auto-cycle\n\
s  toggle shuffle order\n\
up/down  speed faster/slower\n\
left/right  warp weaker/stronger\n\
z / x  wall thickness thinner/thicker\n\
c / v  rotate palette back/forward\n\
r  reset speed/warp/thickness/color\n\
i  show/hide HUD\n\
? or / or h or F1  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

/// Frame-time EMA drives quality down (and the sample block up) when a
/// frame budget is blown, and back up once there is headroom.
struct RuntimeTuning {
    base_quality: Quality,
    quality: Quality,
    extra_scale: usize,
    adaptive: bool,
    ema_ms: f32,
}

impl RuntimeTuning {
    fn new(base_quality: Quality, adaptive: bool) -> Self {
        Self {
            base_quality,
            quality: base_quality,
            extra_scale: 1,
            adaptive,
            ema_ms: 0.0,
        }
    }

    fn block_scale(&self) -> usize {
        self.quality.block_scale() * self.extra_scale
    }

    fn update(&mut self, frame_ms: f32, target_ms: f32) {
        if !self.adaptive {
            return;
        }
        self.ema_ms = if self.ema_ms == 0.0 {
            frame_ms
        } else {
            self.ema_ms * 0.95 + frame_ms * 0.05
        };

        if self.ema_ms > target_ms * 1.22 {
            if self.quality != self.quality.lower() {
                self.quality = self.quality.lower();
            } else if self.extra_scale < 2 {
                self.extra_scale = 2;
            }
            return;
        }

        if self.ema_ms < target_ms * 0.72 {
            if self.extra_scale > 1 {
                self.extra_scale = 1;
            } else if quality_rank(self.quality) < quality_rank(self.base_quality) {
                self.quality = self.quality.higher();
            }
        }
    }
}

fn quality_rank(q: Quality) -> u8 {
    match q {
        Quality::Fast => 0,
        Quality::Balanced => 1,
        Quality::High => 2,
        Quality::Ultra => 3,
    }
}
