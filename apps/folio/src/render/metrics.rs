//! Character-width metrics and page geometry for the export renderer.
#![allow(dead_code)]
//!
//! Widths are in em units (relative to font size), one static table covering
//! ASCII 0x20..=0x7E. Index = (char as usize) - 32. This is an approximation:
//! exact glyph metrics belong to the output device, but a static table places
//! line breaks within a percent or two of where a real renderer would.

/// Layout parameters for one page of the export artifact.
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub font_size_pt: u8,
    /// Usable text width in em units (paper size minus margins, at font size).
    pub text_width_em: f32,
    /// Line slots per page, section headings and spacing included.
    pub lines_per_page: usize,
    /// Extra indent (em) applied to bullet lines and their continuations.
    pub bullet_indent_em: f32,
}

/// US letter, 11pt, 1" margins: 6.5" x (72.27pt/in / 11pt) ~ 42.7em wide,
/// 45 line slots tall.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        font_size_pt: 11,
        text_width_em: 42.7,
        lines_per_page: 45,
        bullet_indent_em: 1.4,
    }
}

/// Static character-width table for the export body font.
///
/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space)
/// through 0x7E (~). Non-ASCII characters fall back to `average_char_width`.
pub struct CharMetricTable {
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl CharMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
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
}

/// Humanist sans-serif body font used by the export artifact.
pub static BODY_FONT: CharMetricTable = CharMetricTable {
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
    average_char_width: 0.52,
    space_width: 0.25,
};
