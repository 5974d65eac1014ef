//! The blob: a closed, noise-perturbed, pulsing shape painted straight into
//! the terminal buffer each frame.

use crate::core::state::AetherState;
use crate::visual::blob::{radius_at, sample_outline, sample_radii};
use crate::visual::params::{adjusted_noise, visual_params, Rgb};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Terminal cells are roughly twice as tall as wide; vertical distances are
/// scaled so the blob reads as round.
const CELL_ASPECT: f64 = 2.0;

/// Density ramp standing in for the radial gradient's alpha.
const RAMP: [&str; 4] = ["░", "▒", "▓", "█"];

pub struct BlobWidget {
    primary: Rgb,
    secondary: Rgb,
    noise: f64,
    pulse_rate: f64,
    t: f64,
}

impl BlobWidget {
    /// Derive the frame's parameters from the latest affective state. The
    /// state is re-read every frame, never cached across mood changes.
    pub fn new(state: &AetherState, t: f64) -> Self {
        let params = visual_params(state.mood);
        Self {
            primary: params.primary_color,
            secondary: params.secondary_color,
            noise: adjusted_noise(params.base_noise, state.coherence),
            pulse_rate: params.pulse_rate,
            t,
        }
    }
}

impl Widget for BlobWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 8 || area.height < 4 {
            return;
        }
        let w = area.width as usize;
        let h = area.height as usize;

        // Plot space: x in cells, y stretched so a circle stays circular.
        let width = w as f64;
        let height = h as f64 * CELL_ASPECT;
        let center = (width / 2.0, height / 2.0);
        let base_radius = 0.3 * width.min(height);

        let radii = sample_radii(base_radius, self.t, self.noise, self.pulse_rate);
        let primary = Color::Rgb(self.primary.0, self.primary.1, self.primary.2);
        let secondary = Color::Rgb(self.secondary.0, self.secondary.1, self.secondary.2);

        // Fill: radial gradient inside the path, opaque primary at
        // 0.2·base_radius fading out toward 1.5·base_radius.
        for row in 0..h {
            for col in 0..w {
                let x = col as f64 + 0.5 - center.0;
                let y = (row as f64 + 0.5) * CELL_ASPECT - center.1;
                let d = x.hypot(y);
                if d > radius_at(&radii, y.atan2(x)) {
                    continue;
                }
                let alpha = 1.0 - (d - 0.2 * base_radius) / (1.3 * base_radius);
                let alpha = alpha.clamp(0.0, 1.0);
                if alpha == 0.0 {
                    continue;
                }
                let glyph = RAMP[((alpha * 4.0) as usize).min(3)];
                buf.set_string(
                    area.x + col as u16,
                    area.y + row as u16,
                    glyph,
                    Style::default().fg(primary),
                );
            }
        }

        // Stroke: rasterize the straight segments between consecutive
        // outline samples.
        let points = sample_outline(center, base_radius, self.t, self.noise, self.pulse_rate);
        let mut stroked = vec![false; w * h];
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            let steps = ((x1 - x0).abs().max((y1 - y0).abs() / CELL_ASPECT)).ceil() as usize + 1;
            for s in 0..=steps {
                let f = s as f64 / steps as f64;
                let col = (x0 + (x1 - x0) * f).floor() as i64;
                let row = ((y0 + (y1 - y0) * f) / CELL_ASPECT).floor() as i64;
                if col >= 0 && row >= 0 && (col as usize) < w && (row as usize) < h {
                    stroked[row as usize * w + col as usize] = true;
                }
            }
        }

        // Soft glow halo first, then the stroke on top. The glow exists only
        // within this pass; widgets drawn after this one are untouched by it.
        let glow = Style::default().fg(secondary);
        for row in 0..h as i64 {
            for col in 0..w as i64 {
                if !stroked[row as usize * w + col as usize] {
                    continue;
                }
                for (dc, dr) in [
                    (-1, 0),
                    (1, 0),
                    (0, -1),
                    (0, 1),
                    (-1, -1),
                    (1, -1),
                    (-1, 1),
                    (1, 1),
                ] {
                    let (nc, nr) = (col + dc, row + dr);
                    if nc < 0 || nr < 0 || nc >= w as i64 || nr >= h as i64 {
                        continue;
                    }
                    if !stroked[nr as usize * w + nc as usize] {
                        buf.set_string(area.x + nc as u16, area.y + nr as u16, "·", glow);
                    }
                }
            }
        }
        let stroke = Style::default().fg(secondary).add_modifier(Modifier::BOLD);
        for row in 0..h {
            for col in 0..w {
                if stroked[row * w + col] {
                    buf.set_string(area.x + col as u16, area.y + row as u16, "█", stroke);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Mood;

    fn render_to_buffer(state: &AetherState, t: f64, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        BlobWidget::new(state, t).render(area, &mut buf);
        buf
    }

    #[test]
    fn test_render_paints_within_bounds() {
        let state = AetherState::boot();
        // Would panic on out-of-bounds writes if the rasterizer leaked.
        let _ = render_to_buffer(&state, 3.7, 80, 24);
        let _ = render_to_buffer(&state, 123.4, 21, 7);
    }

    #[test]
    fn test_render_skips_degenerate_areas() {
        let state = AetherState {
            mood: Mood::Anxious,
            thought: String::new(),
            energy_level: 1.0,
            coherence: 0.0,
        };
        let buf = render_to_buffer(&state, 1.0, 4, 2);
        let empty = Buffer::empty(Rect::new(0, 0, 4, 2));
        assert_eq!(buf, empty);
    }

    #[test]
    fn test_render_touches_center_region() {
        let state = AetherState::boot();
        let buf = render_to_buffer(&state, 0.0, 60, 30);
        let cell = buf.cell((30, 15)).unwrap();
        assert_ne!(cell.symbol(), " ");
    }
}
