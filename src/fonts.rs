//! Font registry mapping a configured `(size, font name)` to a mono font.
//!
//! Glyph rasterization is delegated to `embedded-graphics` mono fonts and
//! `profont`; this module only chooses a face. Two families are available:
//!
//! | Name | Faces (cell height in px) |
//! |------|---------------------------|
//! | default (`None`, `"ascii"`) | 4x6, 5x8, 6x10, 6x12, 7x13, 7x14, 9x15, 9x18, 10x20 |
//! | `"profont"` | `ProFont` 7, 9, 10, 12, 14, 18, 24 point |
//!
//! A size picks the tallest face whose cell height does not exceed it, so
//! `size: 10` in the default family resolves to `FONT_6X10`. Sizes below the
//! smallest face fall back to that face. Unknown family names resolve to the
//! default family.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{
    FONT_4X6,
    FONT_5X8,
    FONT_6X10,
    FONT_6X12,
    FONT_7X13,
    FONT_7X14,
    FONT_9X15,
    FONT_9X18,
    FONT_10X20,
};
use profont::{
    PROFONT_7_POINT,
    PROFONT_9_POINT,
    PROFONT_10_POINT,
    PROFONT_12_POINT,
    PROFONT_14_POINT,
    PROFONT_18_POINT,
    PROFONT_24_POINT,
};

/// Resolved font reference handed to the text primitives.
pub type Font = &'static MonoFont<'static>;

/// Default family, ordered by cell height.
const ASCII_FACES: [Font; 9] = [
    &FONT_4X6,
    &FONT_5X8,
    &FONT_6X10,
    &FONT_6X12,
    &FONT_7X13,
    &FONT_7X14,
    &FONT_9X15,
    &FONT_9X18,
    &FONT_10X20,
];

/// `ProFont` family, ordered by cell height.
const PROFONT_FACES: [Font; 7] = [
    &PROFONT_7_POINT,
    &PROFONT_9_POINT,
    &PROFONT_10_POINT,
    &PROFONT_12_POINT,
    &PROFONT_14_POINT,
    &PROFONT_18_POINT,
    &PROFONT_24_POINT,
];

/// Default text size (cell height in pixels).
pub const DEFAULT_TEXT_SIZE: u32 = 10;

/// Pick a face for `size` from `name`'s family.
pub fn resolve(
    size: u32,
    name: Option<&str>,
) -> Font {
    let faces: &[Font] = match name.map(str::to_ascii_lowercase).as_deref() {
        Some("profont") => &PROFONT_FACES,
        _ => &ASCII_FACES,
    };

    faces
        .iter()
        .rev()
        .find(|f| f.character_size.height <= size)
        .copied()
        .unwrap_or(faces[0])
}

/// Whether `name` names a known family (used by config validation).
pub fn is_known_family(name: &str) -> bool { matches!(name.to_ascii_lowercase().as_str(), "ascii" | "default" | "profont") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_size_resolves_6x10() {
        let f = resolve(DEFAULT_TEXT_SIZE, None);
        assert_eq!(f.character_size.width, 6);
        assert_eq!(f.character_size.height, 10);
    }

    #[test]
    fn test_small_size_falls_back_to_smallest() {
        let f = resolve(2, None);
        assert_eq!(f.character_size.height, 6, "Sizes below the smallest face use the smallest face");
    }

    #[test]
    fn test_size_between_faces_rounds_down() {
        assert_eq!(resolve(9, None).character_size.height, 8);
        assert_eq!(resolve(100, None).character_size.height, 20);
    }

    #[test]
    fn test_profont_family() {
        let f = resolve(24, Some("ProFont"));
        assert!(
            f.character_size.height <= 24,
            "Resolved face must not exceed the requested size"
        );
        let largest = resolve(200, Some("profont"));
        assert_eq!(largest.character_size, PROFONT_24_POINT.character_size);
    }

    #[test]
    fn test_unknown_family_uses_default() {
        assert_eq!(resolve(10, Some("comic")).character_size, FONT_6X10.character_size);
        assert!(!is_known_family("comic"));
        assert!(is_known_family("profont"));
    }
}
