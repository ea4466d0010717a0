//! Approximate text metrics for overflow estimation.
//!
//! Advances are in em units for a generic humanist sans. This is an
//! estimate, not shaping: the orchestrator only uses it to warn when text is
//! likely to overflow its box, never to move anything.
//! Index = (char as usize) - 32, covering ASCII 0x20..=0x7E.

/// Static advance table for one face.
pub struct TextMetrics {
    widths: [f32; 95],
    /// Fallback for non-ASCII characters.
    pub average_char_width: f32,
    pub space_width: f32,
}

/// Default face used for every estimate.
pub static SANS_METRICS: TextMetrics = TextMetrics {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.55,
    space_width: 0.25,
};

impl TextMetrics {
    /// Width of `s` in em units.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` at `font_size`, in canvas units.
    pub fn measure(&self, s: &str, font_size: f32) -> f32 {
        self.measure_em(s) * font_size
    }

    /// Lines `text` occupies when greedily word-wrapped into `box_width`.
    ///
    /// Explicit newlines always start a new line; blank input is 0 lines.
    /// A word wider than the box still takes exactly one line.
    pub fn estimate_lines(&self, text: &str, font_size: f32, box_width: f32) -> u32 {
        if text.trim().is_empty() {
            return 0;
        }
        text.lines()
            .map(|line| self.wrap_paragraph(line, font_size, box_width).max(1))
            .sum()
    }

    pub fn estimate_height(&self, text: &str, font_size: f32, line_height: f32, box_width: f32) -> f32 {
        self.estimate_lines(text, font_size, box_width) as f32 * line_height
    }

    fn wrap_paragraph(&self, line: &str, font_size: f32, box_width: f32) -> u32 {
        let mut line_count = 0u32;
        let mut current_width = 0.0_f32;
        let space = self.space_width * font_size;

        for word in line.split_whitespace() {
            let word_w = self.measure(word, font_size);
            if line_count == 0 {
                line_count = 1;
                current_width = word_w;
            } else if current_width + space + word_w > box_width {
                line_count += 1;
                current_width = word_w;
            } else {
                current_width += space + word_w;
            }
        }
        line_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_is_zero() {
        assert_eq!(SANS_METRICS.measure_em(""), 0.0);
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00em
        let w = SANS_METRICS.measure("Rust", 10.0);
        assert!((w - 20.0).abs() < 1e-3, "got {w}");
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let w = SANS_METRICS.measure_em("é");
        assert!((w - SANS_METRICS.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_blank_text_is_zero_lines() {
        assert_eq!(SANS_METRICS.estimate_lines("   ", 20.0, 500.0), 0);
    }

    #[test]
    fn test_short_text_fits_one_line() {
        assert_eq!(SANS_METRICS.estimate_lines("Quarterly results", 24.0, 800.0), 1);
    }

    #[test]
    fn test_long_text_wraps() {
        let text = "word ".repeat(40);
        let lines = SANS_METRICS.estimate_lines(&text, 20.0, 300.0);
        assert!(lines > 3, "40 words in 300pt should wrap, got {lines}");
    }

    #[test]
    fn test_newlines_force_breaks() {
        let text = "▸ Region | Revenue\n• North | 10\n• South | 12";
        assert_eq!(SANS_METRICS.estimate_lines(text, 18.0, 2000.0), 3);
    }

    #[test]
    fn test_blank_line_inside_text_counts() {
        assert_eq!(SANS_METRICS.estimate_lines("a\n\nb", 18.0, 2000.0), 3);
    }

    #[test]
    fn test_estimate_height() {
        let h = SANS_METRICS.estimate_height("one\ntwo", 20.0, 30.0, 1000.0);
        assert_eq!(h, 60.0);
    }
}
