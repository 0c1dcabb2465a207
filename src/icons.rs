//! Bitmap icon sets for indicator widgets.
//!
//! Three sets of square icons, drawn as string art (`#` = lit pixel). A
//! widget picks a set from its content height:
//!
//! | Content height | Set |
//! |----------------|-----|
//! | `< 12` | 8 x 8 |
//! | `12..16` | 12 x 12 |
//! | `>= 16` | 16 x 16 |
//!
//! Lit pixels are drawn in the caller's color; unlit pixels are left alone,
//! so icons compose over any background.

use crate::canvas::GrayCanvas;

/// Content height at which the 12 px set replaces the 8 px set.
pub const ICON_12_MIN_HEIGHT: i32 = 12;
/// Content height at which the 16 px set replaces the 12 px set.
pub const ICON_16_MIN_HEIGHT: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconKind {
    Bluetooth,
    BluetoothOff,
    Play,
    Pause,
    Stop,
    Clipboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconSize {
    Small,
    Medium,
    Large,
}

impl IconSize {
    /// Largest set that fits `height`.
    pub const fn for_height(height: i32) -> Self {
        if height >= ICON_16_MIN_HEIGHT {
            Self::Large
        } else if height >= ICON_12_MIN_HEIGHT {
            Self::Medium
        } else {
            Self::Small
        }
    }

    pub const fn pixels(self) -> i32 {
        match self {
            Self::Small => 8,
            Self::Medium => 12,
            Self::Large => 16,
        }
    }
}

/// A square string-art glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Icon {
    rows: &'static [&'static str],
}

impl Icon {
    pub const fn new(kind: IconKind, size: IconSize) -> Self {
        let rows: &'static [&'static str] = match (size, kind) {
            (IconSize::Small, IconKind::Bluetooth) => &BLUETOOTH_8,
            (IconSize::Small, IconKind::BluetoothOff) => &BLUETOOTH_OFF_8,
            (IconSize::Small, IconKind::Play) => &PLAY_8,
            (IconSize::Small, IconKind::Pause) => &PAUSE_8,
            (IconSize::Small, IconKind::Stop) => &STOP_8,
            (IconSize::Small, IconKind::Clipboard) => &CLIPBOARD_8,
            (IconSize::Medium, IconKind::Bluetooth) => &BLUETOOTH_12,
            (IconSize::Medium, IconKind::BluetoothOff) => &BLUETOOTH_OFF_12,
            (IconSize::Medium, IconKind::Play) => &PLAY_12,
            (IconSize::Medium, IconKind::Pause) => &PAUSE_12,
            (IconSize::Medium, IconKind::Stop) => &STOP_12,
            (IconSize::Medium, IconKind::Clipboard) => &CLIPBOARD_12,
            (IconSize::Large, IconKind::Bluetooth) => &BLUETOOTH_16,
            (IconSize::Large, IconKind::BluetoothOff) => &BLUETOOTH_OFF_16,
            (IconSize::Large, IconKind::Play) => &PLAY_16,
            (IconSize::Large, IconKind::Pause) => &PAUSE_16,
            (IconSize::Large, IconKind::Stop) => &STOP_16,
            (IconSize::Large, IconKind::Clipboard) => &CLIPBOARD_16,
        };
        Self { rows }
    }

    /// Icon of `kind` from the set that fits `height`.
    pub const fn for_height(
        kind: IconKind,
        height: i32,
    ) -> Self {
        Self::new(kind, IconSize::for_height(height))
    }

    #[inline]
    pub const fn width(&self) -> i32 { self.rows.len() as i32 }

    #[inline]
    pub const fn height(&self) -> i32 { self.rows.len() as i32 }

    /// Draw with the top-left corner at `(x, y)`.
    pub fn draw(
        &self,
        canvas: &mut GrayCanvas,
        x: i32,
        y: i32,
        color: u8,
    ) {
        for (dy, row) in self.rows.iter().enumerate() {
            for (dx, b) in row.bytes().enumerate() {
                if b == b'#' {
                    canvas.set(x + dx as i32, y + dy as i32, color);
                }
            }
        }
    }
}

// =============================================================================
// 8 x 8
// =============================================================================

const BLUETOOTH_8: [&str; 8] = [
    "...#....",
    "...##...",
    ".#.#.#..",
    "..###...",
    "..###...",
    ".#.#.#..",
    "...##...",
    "...#....",
];

const BLUETOOTH_OFF_8: [&str; 8] = [
    "#..#....",
    ".#.##...",
    ".###.#..",
    "..###...",
    "..###...",
    ".#.#.#..",
    "...##.#.",
    "...#...#",
];

const PLAY_8: [&str; 8] = [
    ".#......",
    ".###....",
    ".#####..",
    ".######.",
    ".#####..",
    ".###....",
    ".#......",
    "........",
];

const PAUSE_8: [&str; 8] = [
    "........",
    ".##..##.",
    ".##..##.",
    ".##..##.",
    ".##..##.",
    ".##..##.",
    ".##..##.",
    "........",
];

const STOP_8: [&str; 8] = [
    "........",
    ".######.",
    ".######.",
    ".######.",
    ".######.",
    ".######.",
    ".######.",
    "........",
];

const CLIPBOARD_8: [&str; 8] = [
    "..####..",
    "########",
    "#.####.#",
    "#......#",
    "#.####.#",
    "#......#",
    "#......#",
    "########",
];

// =============================================================================
// 12 x 12
// =============================================================================

const BLUETOOTH_12: [&str; 12] = [
    ".....#......",
    ".....##.....",
    ".....#.#....",
    "..#..#..#...",
    "...#.#.#....",
    "....###.....",
    "....###.....",
    "...#.#.#....",
    "..#..#..#...",
    ".....#.#....",
    ".....##.....",
    ".....#......",
];

const BLUETOOTH_OFF_12: [&str; 12] = [
    "#....#......",
    ".#...##.....",
    "..#..#.#....",
    "..##.#..#...",
    "...###.#....",
    "....###.....",
    "....###.....",
    "...#.#.#....",
    "..#..#..#...",
    ".....#.#.#..",
    ".....##...#.",
    ".....#.....#",
];

const PLAY_12: [&str; 12] = [
    ".#..........",
    ".###........",
    ".#####......",
    ".#######....",
    ".#########..",
    ".##########.",
    ".#########..",
    ".#######....",
    ".#####......",
    ".###........",
    ".#..........",
    "............",
];

const PAUSE_12: [&str; 12] = [
    "............",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    ".####..####.",
    "............",
];

const STOP_12: [&str; 12] = [
    "............",
    ".##########.",
    ".##########.",
    ".##########.",
    ".##########.",
    ".##########.",
    ".##########.",
    ".##########.",
    ".##########.",
    ".##########.",
    ".##########.",
    "............",
];

const CLIPBOARD_12: [&str; 12] = [
    "...######...",
    "############",
    "#..######..#",
    "#..........#",
    "#.########.#",
    "#..........#",
    "#.########.#",
    "#..........#",
    "#.########.#",
    "#..........#",
    "#..........#",
    "############",
];

// =============================================================================
// 16 x 16
// =============================================================================

const BLUETOOTH_16: [&str; 16] = [
    ".......#........",
    ".......##.......",
    ".......#.#......",
    ".......#..#.....",
    "...#...#...#....",
    "....#..#..#.....",
    ".....#.#.#......",
    "......###.......",
    "......###.......",
    ".....#.#.#......",
    "....#..#..#.....",
    "...#...#...#....",
    ".......#..#.....",
    ".......#.#......",
    ".......##.......",
    ".......#........",
];

const BLUETOOTH_OFF_16: [&str; 16] = [
    "#......#........",
    ".#.....##.......",
    "..#....#.#......",
    "...#...#..#.....",
    "...##..#...#....",
    "....##.#..#.....",
    ".....###.#......",
    "......###.......",
    "......###.......",
    ".....#.#.#......",
    "....#..#..#.....",
    "...#...#...#....",
    ".......#..#.#...",
    ".......#.#...#..",
    ".......##.....#.",
    ".......#.......#",
];

const PLAY_16: [&str; 16] = [
    ".#..............",
    ".###............",
    ".#####..........",
    ".#######........",
    ".#########......",
    ".###########....",
    ".#############..",
    ".##############.",
    ".#############..",
    ".###########....",
    ".#########......",
    ".#######........",
    ".#####..........",
    ".###............",
    ".#..............",
    "................",
];

const PAUSE_16: [&str; 16] = [
    "................",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    ".#####....#####.",
    "................",
];

const STOP_16: [&str; 16] = [
    "................",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    ".##############.",
    "................",
];

const CLIPBOARD_16: [&str; 16] = [
    "....########....",
    "################",
    "#...########...#",
    "#..............#",
    "#.############.#",
    "#..............#",
    "#.############.#",
    "#..............#",
    "#.############.#",
    "#..............#",
    "#.############.#",
    "#..............#",
    "#.############.#",
    "#..............#",
    "#..............#",
    "################",
];

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [IconKind; 6] = [
        IconKind::Bluetooth,
        IconKind::BluetoothOff,
        IconKind::Play,
        IconKind::Pause,
        IconKind::Stop,
        IconKind::Clipboard,
    ];

    #[test]
    fn test_every_icon_is_square() {
        for size in [IconSize::Small, IconSize::Medium, IconSize::Large] {
            for kind in KINDS {
                let icon = Icon::new(kind, size);
                assert_eq!(icon.height(), size.pixels(), "{kind:?} at {size:?} has the set's height");
                for row in icon.rows {
                    assert_eq!(row.len() as i32, size.pixels(), "{kind:?} at {size:?} has ragged rows");
                }
            }
        }
    }

    #[test]
    fn test_size_thresholds() {
        assert_eq!(IconSize::for_height(8), IconSize::Small);
        assert_eq!(IconSize::for_height(11), IconSize::Small);
        assert_eq!(IconSize::for_height(12), IconSize::Medium);
        assert_eq!(IconSize::for_height(15), IconSize::Medium);
        assert_eq!(IconSize::for_height(16), IconSize::Large);
        assert_eq!(IconSize::for_height(40), IconSize::Large);
    }

    #[test]
    fn test_draw_only_touches_lit_pixels() {
        let mut c = GrayCanvas::filled(10, 10, 7);
        let icon = Icon::new(IconKind::Stop, IconSize::Small);
        icon.draw(&mut c, 1, 1, 255);
        assert_eq!(c.count_value(255), 36, "6x6 lit square");
        assert_eq!(c.get(1, 1), Some(7), "Unlit corner keeps the background");
        assert_eq!(c.get(2, 2), Some(255));
    }

    #[test]
    fn test_draw_clips() {
        let mut c = GrayCanvas::new(4, 4);
        Icon::new(IconKind::Pause, IconSize::Large).draw(&mut c, -2, -2, 255);
        assert!(c.count_value(255) > 0);
    }
}
