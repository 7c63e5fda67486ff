//! 5x7 bitmap font for row labels, delta numbers, and axis labels.
//!
//! Text is drawn as one filled square per lit pixel, which keeps rendering
//! down to the single rectangle primitive the host provides.  Only upper-case
//! letters and digits have glyphs; lower-case is folded to upper-case and
//! anything else renders blank but still advances the pen.

/// Glyph width in cells.
pub const GLYPH_WIDTH: usize = 5;
/// Glyph height in cells.
pub const GLYPH_HEIGHT: usize = 7;
/// Pen advance per character in cells (glyph plus one column of spacing).
pub const GLYPH_ADVANCE: f32 = 6.0;

/// Row bitmaps for `ch`, top row first, MSB (bit 4) leftmost.
pub fn glyph(ch: char) -> [u8; GLYPH_HEIGHT] {
    match ch.to_ascii_uppercase() {
        'A' => [0b00100, 0b01010, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b10000, 0b11110, 0b00001, 0b00001, 0b11110],
        '6' => [0b01110, 0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b01110],
        _ => [0; GLYPH_HEIGHT],
    }
}

/// Size of one glyph cell for a requested scale.
pub fn cell_size(scale: f32) -> f32 {
    scale.floor().max(1.0)
}

/// One lit square of rendered text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextCell {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Lays out `text` with its top-left corner at `(x, y)`.
pub fn layout_text(x: f32, y: f32, text: &str, scale: f32) -> Vec<TextCell> {
    let size = cell_size(scale);
    let mut cells = Vec::new();
    let mut pen_x = x;
    for ch in text.chars() {
        if ch != ' ' {
            for (r, bits) in glyph(ch).iter().enumerate() {
                for c in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - c)) != 0 {
                        cells.push(TextCell {
                            x: pen_x + c as f32 * size,
                            y: y + r as f32 * size,
                            size,
                        });
                    }
                }
            }
        }
        pen_x += GLYPH_ADVANCE * size;
    }
    cells
}

/// Rendered height of a line of text at `scale`.
pub fn text_height(scale: f32) -> f32 {
    GLYPH_HEIGHT as f32 * cell_size(scale)
}
