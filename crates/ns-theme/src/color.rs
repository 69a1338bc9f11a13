// SPDX-License-Identifier: MIT
//
// Theme colors — plain 8-bit sRGB triples.
//
// The original theme tables are authored as `#RRGGBB` strings, so the color
// type here is deliberately small: parse hex, print hex, and emit the
// true-color escape sequences the line front-end uses to paint highlights.

use std::fmt;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// An opaque 8-bit sRGB color.
///
/// # Examples
///
/// ```
/// use ns_theme::color::Rgb;
///
/// let blue = Rgb::hex("#569CD6").unwrap();
/// assert_eq!(blue, Rgb::new(0x56, 0x9c, 0xd6));
/// assert_eq!(blue.to_hex(), "#569cd6");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Pure white.
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    /// Create a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value.
    #[inline]
    #[must_use]
    pub const fn from_u32(packed: u32) -> Self {
        Self::new(
            ((packed >> 16) & 0xff) as u8,
            ((packed >> 8) & 0xff) as u8,
            (packed & 0xff) as u8,
        )
    }

    /// Parse a hex string.
    ///
    /// Supports `#RGB` and `#RRGGBB`, with or without the `#`. Returns `None`
    /// for anything else.
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        let bytes = s.as_bytes();

        match bytes.len() {
            3 => {
                let r = parse_hex_digit(bytes[0])?;
                let g = parse_hex_digit(bytes[1])?;
                let b = parse_hex_digit(bytes[2])?;
                Some(Self::new(r << 4 | r, g << 4 | g, b << 4 | b))
            }
            6 => {
                let r = parse_hex_byte(&bytes[0..2])?;
                let g = parse_hex_byte(&bytes[2..4])?;
                let b = parse_hex_byte(&bytes[4..6])?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Lowercase `#rrggbb` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in `0.0..=1.0` (sRGB coefficients, no gamma).
    ///
    /// Good enough to tell a light theme from a dark one.
    #[must_use]
    pub fn luminance(self) -> f32 {
        let r = f32::from(self.r) / 255.0;
        let g = f32::from(self.g) / 255.0;
        let b = f32::from(self.b) / 255.0;
        0.0722f32.mul_add(b, 0.2126f32.mul_add(r, 0.7152 * g))
    }

    /// SGR sequence selecting this color as the foreground.
    #[must_use]
    pub fn fg_escape(self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }

    /// SGR sequence selecting this color as the background.
    #[must_use]
    pub fn bg_escape(self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.r, self.g, self.b)
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb({})", self.to_hex())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// SGR reset — clears colors and attributes.
pub const RESET: &str = "\x1b[0m";

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_long_form() {
        assert_eq!(Rgb::hex("#2B2B2B"), Some(Rgb::new(0x2b, 0x2b, 0x2b)));
        assert_eq!(Rgb::hex("f8f8f2"), Some(Rgb::new(0xf8, 0xf8, 0xf2)));
    }

    #[test]
    fn hex_short_form_expands() {
        assert_eq!(Rgb::hex("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::hex("#a1c"), Some(Rgb::new(0xaa, 0x11, 0xcc)));
    }

    #[test]
    fn hex_rejects_garbage() {
        assert_eq!(Rgb::hex("#12345"), None);
        assert_eq!(Rgb::hex("#gggggg"), None);
        assert_eq!(Rgb::hex(""), None);
    }

    #[test]
    fn from_u32_unpacks_channels() {
        assert_eq!(Rgb::from_u32(0x27_28_22), Rgb::new(0x27, 0x28, 0x22));
    }

    #[test]
    fn to_hex_is_lowercase() {
        assert_eq!(Rgb::new(0xAB, 0xCD, 0xEF).to_hex(), "#abcdef");
    }

    #[test]
    fn luminance_orders_black_and_white() {
        assert!(Rgb::BLACK.luminance() < 0.01);
        assert!(Rgb::WHITE.luminance() > 0.99);
    }

    #[test]
    fn escapes_carry_channels() {
        let c = Rgb::new(1, 2, 3);
        assert_eq!(c.fg_escape(), "\x1b[38;2;1;2;3m");
        assert_eq!(c.bg_escape(), "\x1b[48;2;1;2;3m");
    }
}
