use crate::render::{text_frame_begin, text_frame_end, write_bg_rgb, write_fg_rgb, Frame, Renderer};
use std::io::Write;

/// Eight pixels per cell (2x4) as braille dots. Each cell thresholds its
/// pixels at the local mid-luma; "on" pixels set dots and average into
/// the foreground color, "off" pixels into the background.
pub struct BrailleRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for BrailleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows, w, _h)) = text_frame_begin(frame, 2, 4, out)? else {
            return Ok(());
        };

        self.last_fg = None;
        self.last_bg = None;

        // Dot bit layout of U+2800..U+28FF, row-major 2x4.
        const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

        for row in 0..visual_rows {
            let base_y = row * 4;
            for col in 0..cols {
                let base_x = col * 2;

                let mut lum = [0u16; 8];
                let mut rgb = [(0u8, 0u8, 0u8); 8];

                for dy in 0..4usize {
                    for dx in 0..2usize {
                        let i = dy * 2 + dx;
                        let idx = ((base_y + dy) * w + base_x + dx) * 4;
                        let r = frame.pixels_rgba[idx];
                        let g = frame.pixels_rgba[idx + 1];
                        let b = frame.pixels_rgba[idx + 2];
                        rgb[i] = (r, g, b);
                        lum[i] = luma_u16(r, g, b);
                    }
                }

                let mut min_l = lum[0];
                let mut max_l = lum[0];
                for &v in lum.iter().skip(1) {
                    min_l = min_l.min(v);
                    max_l = max_l.max(v);
                }
                let thr = (min_l + max_l) / 2;

                let mut bits: u8 = 0;
                let mut fsum = [0u32; 3];
                let mut fc: u32 = 0;
                let mut bsum = [0u32; 3];
                let mut bc: u32 = 0;

                for i in 0..8usize {
                    let (r, g, b) = rgb[i];
                    if lum[i] > thr {
                        bits |= DOT_BITS[i];
                        fsum[0] += r as u32;
                        fsum[1] += g as u32;
                        fsum[2] += b as u32;
                        fc += 1;
                    } else {
                        bsum[0] += r as u32;
                        bsum[1] += g as u32;
                        bsum[2] += b as u32;
                        bc += 1;
                    }
                }

                let avg = |s: [u32; 3], n: u32| -> (u8, u8, u8) {
                    if n == 0 {
                        (0, 0, 0)
                    } else {
                        ((s[0] / n) as u8, (s[1] / n) as u8, (s[2] / n) as u8)
                    }
                };

                let (fgc, bgc, ch) = if bits == 0 {
                    let c = avg(bsum, bc);
                    (c, c, ' ')
                } else {
                    let fgc = avg(fsum, fc);
                    let bgc = if bc > 0 { avg(bsum, bc) } else { fgc };
                    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                    (fgc, bgc, ch)
                };

                if self.last_fg != Some(fgc) {
                    write_fg_rgb(out, fgc.0, fgc.1, fgc.2)?;
                    self.last_fg = Some(fgc);
                }
                if self.last_bg != Some(bgc) {
                    write_bg_rgb(out, bgc.0, bgc.1, bgc.2)?;
                    self.last_bg = Some(bgc);
                }

                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}

#[inline]
fn luma_u16(r: u8, g: u8, b: u8) -> u16 {
    // Approx Rec.709 luma using integer math (0..255).
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u16
}
