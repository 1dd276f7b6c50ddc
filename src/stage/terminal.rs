use std::io::{self, Write};

use anyhow::Result;
use async_trait::async_trait;

use super::surface::{Frame, Surface};

const TRACK_WIDTH: usize = 48;
const VIEW_GLYPHS: f32 = 6.0;

/// Draws each frame as a one-line track in the terminal
///
/// The staged view is a block of `█` sliding along a `░` track; the
/// block shrinks with the transform scale and switches to `▓` while
/// the view is tipped more than 45 degrees.
pub struct TerminalSurface {
    screen_width: f32,
    out: io::Stdout,
}

impl TerminalSurface {
    pub fn new(screen_width: f32) -> Self {
        Self {
            screen_width,
            out: io::stdout(),
        }
    }

    fn render(&self, frame: &Frame) -> String {
        let mut track = vec!['░'; TRACK_WIDTH];

        let scale = frame.view.transform.scale_x.abs();
        let glyphs = ((VIEW_GLYPHS * scale).round() as usize).max(1);
        let glyph = if frame.view.transform.rotation.abs() > 45.0 {
            '▓'
        } else {
            '█'
        };

        // Offset 0 is stage center; the baseline parks past the right edge
        let center = (frame.view.offset / self.screen_width + 0.5) * TRACK_WIDTH as f32;
        let start = (center - glyphs as f32 / 2.0).round() as isize;
        for i in 0..glyphs {
            let col = start + i as isize;
            if (0..TRACK_WIDTH as isize).contains(&col) {
                track[col as usize] = glyph;
            }
        }

        let track: String = track.into_iter().collect();
        format!(
            "{:8} │{}│ t={:.2}s p={:+.3}",
            frame.tag, track, frame.elapsed_secs, frame.progress
        )
    }
}

#[async_trait]
impl Surface for TerminalSurface {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn present(&mut self, frame: &Frame) -> Result<()> {
        let line = self.render(frame);
        write!(self.out, "\r{line}")?;
        self.out.flush()?;
        Ok(())
    }

    async fn finish(&mut self, _tag: &str) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
