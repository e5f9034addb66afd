//! Text measurement for the standard Helvetica font.
//!
//! Advance widths for the printable ASCII range, in 1/1000 em units, taken
//! from the Adobe AFM metrics. Good enough for centering page numbers and
//! watermarks; anything outside ASCII falls back to an average glyph width.

/// Widths for characters 0x20..=0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, // 'A'..'P'
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'Q'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, // 'a'..'p'
    556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'q'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

fn glyph_width(c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        HELVETICA_WIDTHS[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Width of `text` in points when drawn in Helvetica at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c))).sum();
    units as f32 / 1000.0 * font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_share_a_fixed_width() {
        // All Helvetica digits are 556 units wide, so numerals of equal
        // length measure identically regardless of value.
        assert_eq!(text_width("111", 12.0), text_width("999", 12.0));
        assert!((text_width("1", 10.0) - 5.56).abs() < 1e-4);
    }

    #[test]
    fn longer_text_is_wider() {
        assert!(text_width("watermark", 12.0) > text_width("mark", 12.0));
    }

    #[test]
    fn non_ascii_uses_fallback_width() {
        assert!(text_width("\u{00e9}", 12.0) > 0.0);
    }
}
