use tui_tunnel::render::{AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};

fn gradient_pixels(w: usize, h: usize) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            buf[i] = (x * 255 / w.max(1)) as u8;
            buf[i + 1] = (y * 255 / h.max(1)) as u8;
            buf[i + 2] = 128;
            buf[i + 3] = 255;
        }
    }
    buf
}

fn frame<'a>(
    cols: u16,
    visual_rows: u16,
    w: usize,
    h: usize,
    pixels: &'a [u8],
    hud: &'a str,
    sync: bool,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 2,
        visual_rows,
        pixel_width: w,
        pixel_height: h,
        pixels_rgba: pixels,
        hud,
        hud_rows: if hud.is_empty() { 0 } else { 2 },
        overlay: None,
        sync_updates: sync,
    }
}

#[test]
fn ascii_renderer_emits_expected_rows() {
    let (cols, rows) = (12u16, 5u16);
    let pixels = gradient_pixels(12, 5);
    let f = frame(cols, rows, 12, 5, &pixels, "", true);

    let mut out = Vec::new();
    AsciiRenderer::new().render(&f, &mut out).expect("render");
    let s = String::from_utf8_lossy(&out);

    assert!(s.starts_with("\x1b[?2026h"), "sync begin missing");
    assert!(s.ends_with("\x1b[?2026l"), "sync end missing");
    assert!(s.contains("\x1b[?7l") && s.contains("\x1b[?7h"), "autowrap toggle missing");
    assert_eq!(
        s.matches("\r\n").count(),
        rows as usize,
        "one CRLF per visual row"
    );
    assert!(s.contains("\x1b[38;2;"), "true-color foreground missing");
}

#[test]
fn ascii_renderer_skips_sync_markers_when_disabled() {
    let pixels = gradient_pixels(8, 4);
    let f = frame(8, 4, 8, 4, &pixels, "", false);

    let mut out = Vec::new();
    AsciiRenderer::new().render(&f, &mut out).expect("render");
    let s = String::from_utf8_lossy(&out);
    assert!(!s.contains("\x1b[?2026"), "sync markers present despite sync_updates=false");
}

#[test]
fn halfblock_renderer_paints_top_and_bottom_cells() {
    let (cols, rows) = (10u16, 4u16);
    let (w, h) = (10usize, 8usize);
    let pixels = gradient_pixels(w, h);
    let f = frame(cols, rows, w, h, &pixels, "", true);

    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).expect("render");
    let s = String::from_utf8_lossy(&out);

    assert_eq!(
        s.matches('\u{2580}').count(),
        (cols as usize) * (rows as usize),
        "one half-block glyph per cell"
    );
    assert!(s.contains("\x1b[38;2;"), "foreground (top pixel) missing");
    assert!(s.contains("\x1b[48;2;"), "background (bottom pixel) missing");
}

#[test]
fn braille_renderer_emits_braille_cells() {
    let (cols, rows) = (6u16, 3u16);
    let (w, h) = (12usize, 12usize);
    let pixels = gradient_pixels(w, h);
    let f = frame(cols, rows, w, h, &pixels, "", true);

    let mut out = Vec::new();
    BrailleRenderer::new().render(&f, &mut out).expect("render");
    let s = String::from_utf8_lossy(&out);

    let braille = s
        .chars()
        .filter(|&c| ('\u{2800}'..='\u{28ff}').contains(&c))
        .count();
    assert!(
        braille > 0,
        "expected braille glyphs in output, got none"
    );
    assert_eq!(s.matches("\r\n").count(), rows as usize);
}

#[test]
fn mismatched_pixel_buffer_is_skipped() {
    // Pixel dimensions that disagree with the cell grid (mid-resize)
    // must render nothing instead of indexing out of bounds.
    let pixels = gradient_pixels(8, 8);
    let f = frame(10, 4, 8, 8, &pixels, "", true);

    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).expect("render");
    assert!(out.is_empty(), "mismatched frame should be skipped entirely");
}

#[test]
fn zero_sized_frame_is_skipped() {
    let pixels: Vec<u8> = Vec::new();
    let f = frame(0, 0, 0, 0, &pixels, "", true);

    let mut out = Vec::new();
    AsciiRenderer::new().render(&f, &mut out).expect("render");
    assert!(out.is_empty());
}

#[test]
fn hud_lines_are_written_and_truncated() {
    let (cols, rows) = (10u16, 3u16);
    let pixels = gradient_pixels(10, 6);
    let hud = "short\nthis line is far too long for ten columns";
    let f = frame(cols, rows, 10, 6, &pixels, hud, false);

    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).expect("render");
    let s = String::from_utf8_lossy(&out);

    assert!(s.contains("short"), "first HUD line missing");
    assert!(s.contains("this line "), "second HUD line should appear truncated");
    assert!(
        !s.contains("far too long"),
        "HUD line must be cut at the column limit"
    );
}

#[test]
fn hud_truncation_respects_multibyte_chars() {
    let (cols, rows) = (10u16, 3u16);
    let pixels = gradient_pixels(10, 6);
    // Sixteen two-byte glyphs; the cut must land on a char boundary and
    // keep exactly one column's worth of them.
    let hud = "ok\néééééééééééééééé";
    let f = frame(cols, rows, 10, 6, &pixels, hud, false);

    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).expect("render");
    let s = String::from_utf8_lossy(&out);
    assert_eq!(
        s.matches('é').count(),
        10,
        "second HUD line should cut at ten chars"
    );
}

#[test]
fn overlay_popup_is_drawn_over_the_frame() {
    let pixels = gradient_pixels(30, 12);
    let mut f = frame(30, 6, 30, 12, &pixels, "", false);
    f.term_rows = 10;
    f.overlay = Some("Help Title\nline one\nline two");

    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).expect("render");
    let s = String::from_utf8_lossy(&out);

    assert!(s.contains("Help Title"), "overlay title missing");
    assert!(s.contains("line one") && s.contains("line two"));
    assert!(s.contains("+--"), "popup border missing");
}
