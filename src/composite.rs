//! Two-pass layout for widgets that mix icons, text and shapes on one line.
//!
//! 1. [`CompositeRenderer::layout`] resolves and measures every token.
//!    Icons carry a 2 px trailing gap; shapes take the width given by their
//!    parameter, capped to the content width.
//! 2. The start `x` comes from the horizontal alignment of the total width.
//! 3. [`CompositeRenderer::draw`] walks the pieces and advances `x` by each
//!    measured width even when a piece is hidden, so a blinking token never
//!    shifts its neighbours.
//!
//! Pieces are drawn into a content-sized scratch canvas that is then blitted
//! with zero as transparent, which clips everything to the content area.

use crate::bitmap::{
    BatteryOrientation, HAlign, VAlign, draw_battery, draw_horizontal_bar, draw_text_at, draw_vertical_bar, measure_text,
};
use crate::canvas::GrayCanvas;
use crate::fonts::Font;
use crate::icons::{Icon, IconKind};
use crate::tokens::{Token, TokenKind};
use crate::widget::ContentArea;

/// Gap after every icon.
pub const ICON_GAP: i32 = 2;

/// Shape width when the token carries no parameter.
pub const DEFAULT_SHAPE_WIDTH: i32 = 20;

/// Drawable shape tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Battery,
    BatteryVertical,
    Bar,
    BarVertical,
}

impl ShapeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "battery" => Some(Self::Battery),
            "battery_v" => Some(Self::BatteryVertical),
            "bar" => Some(Self::Bar),
            "bar_v" => Some(Self::BarVertical),
            _ => None,
        }
    }
}

/// Widget-side data behind the semantic tokens.
pub trait TokenSource {
    /// Value for a text token.
    fn text(
        &self,
        name: &str,
        param: Option<&str>,
    ) -> String;

    /// Icon for an icon token, or `None` to leave its slot empty.
    fn icon(
        &self,
        name: &str,
    ) -> Option<IconKind>;

    /// Fill level for a shape, or `None` to leave its slot empty.
    fn level(
        &self,
        shape: ShapeKind,
    ) -> Option<f64>;
}

/// Classifier for the shared token vocabulary: `icon`, the shape names, and
/// the widget's own `text_names`. Anything else stays literal.
pub fn classify_with<'a>(text_names: &'a [&'a str]) -> impl Fn(&str) -> TokenKind + 'a {
    move |name| {
        if name == "icon" {
            TokenKind::Icon
        } else if ShapeKind::from_name(name).is_some() {
            TokenKind::Shape
        } else if text_names.iter().any(|n| *n == name) {
            TokenKind::Text
        } else {
            TokenKind::Literal
        }
    }
}

/// Token to hide while blinking: first shape, else first icon, else the
/// first `name` text token.
pub fn blink_target(tokens: &[Token]) -> Option<usize> {
    tokens
        .iter()
        .position(|t| t.kind == TokenKind::Shape)
        .or_else(|| tokens.iter().position(|t| t.kind == TokenKind::Icon))
        .or_else(|| tokens.iter().position(|t| t.is(TokenKind::Text, "name")))
}

#[derive(Clone, Debug, PartialEq)]
pub enum PieceContent {
    Text(String),
    Icon(Icon),
    Shape { kind: ShapeKind, level: f64 },
    Empty,
}

/// One measured token.
#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    /// Offset from the start of the line.
    pub x: i32,
    pub width: i32,
    pub content: PieceContent,
}

/// Measured line, one piece per token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub pieces: Vec<Piece>,
    pub total_width: i32,
}

/// Shared drawing settings.
#[derive(Clone, Copy, Debug)]
pub struct CompositeRenderer {
    pub font: Font,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub color: u8,
    pub battery_padding: i32,
}

impl CompositeRenderer {
    /// Measure pass.
    pub fn layout(
        &self,
        tokens: &[Token],
        source: &dyn TokenSource,
        area: ContentArea,
    ) -> Layout {
        let mut x = 0;
        let mut pieces = Vec::with_capacity(tokens.len());

        for token in tokens {
            let (width, content) = match token.kind {
                TokenKind::Literal => {
                    let text = token.text().to_string();
                    (measure_text(&text, self.font).0, PieceContent::Text(text))
                }
                TokenKind::Text => {
                    let text = source.text(&token.name, token.param.as_deref());
                    (measure_text(&text, self.font).0, PieceContent::Text(text))
                }
                TokenKind::Icon => match source.icon(&token.name) {
                    Some(kind) => {
                        let icon = Icon::for_height(kind, area.h);
                        (icon.width() + ICON_GAP, PieceContent::Icon(icon))
                    }
                    None => (0, PieceContent::Empty),
                },
                TokenKind::Shape => {
                    let width = token
                        .param_int()
                        .unwrap_or(DEFAULT_SHAPE_WIDTH)
                        .clamp(0, area.w.max(0));
                    let content = ShapeKind::from_name(&token.name)
                        .and_then(|kind| source.level(kind).map(|level| PieceContent::Shape { kind, level }))
                        .unwrap_or(PieceContent::Empty);
                    (width, content)
                }
            };
            pieces.push(Piece { x, width, content });
            x += width;
        }

        Layout { pieces, total_width: x }
    }

    /// Start offset of `layout` inside `area` per the horizontal alignment.
    #[inline]
    pub fn start_x(
        &self,
        layout: &Layout,
        area: ContentArea,
    ) -> i32 {
        self.h_align.offset(area.w, layout.total_width)
    }

    /// Draw pass. `start` is relative to the content area; the piece at
    /// `hidden` keeps its slot but draws nothing.
    pub fn draw(
        &self,
        canvas: &mut GrayCanvas,
        layout: &Layout,
        area: ContentArea,
        start: i32,
        hidden: Option<usize>,
    ) {
        self.draw_twice(canvas, layout, area, (start, None), hidden);
    }

    /// Draw two copies for seamless horizontal scrolling.
    pub fn draw_twice(
        &self,
        canvas: &mut GrayCanvas,
        layout: &Layout,
        area: ContentArea,
        starts: (i32, Option<i32>),
        hidden: Option<usize>,
    ) {
        if area.w <= 0 || area.h <= 0 {
            return;
        }
        let mut scratch = GrayCanvas::new(area.w as u32, area.h as u32);
        self.draw_pieces(&mut scratch, layout, area.h, starts.0, hidden);
        if let Some(second) = starts.1 {
            self.draw_pieces(&mut scratch, layout, area.h, second, hidden);
        }
        canvas.blit(&scratch, area.x, area.y, true);
    }

    fn draw_pieces(
        &self,
        scratch: &mut GrayCanvas,
        layout: &Layout,
        height: i32,
        start: i32,
        hidden: Option<usize>,
    ) {
        let mut x = start;
        for (i, piece) in layout.pieces.iter().enumerate() {
            if hidden != Some(i) {
                self.draw_piece(scratch, piece, x, height);
            }
            x += piece.width;
        }
    }

    fn draw_piece(
        &self,
        scratch: &mut GrayCanvas,
        piece: &Piece,
        x: i32,
        height: i32,
    ) {
        match &piece.content {
            PieceContent::Text(text) => {
                let (_, th) = measure_text(text, self.font);
                let y = self.v_align.offset(height, th);
                draw_text_at(scratch, text, self.font, x, y, None, self.color);
            }
            PieceContent::Icon(icon) => {
                let y = self.v_align.offset(height, icon.height());
                icon.draw(scratch, x, y, self.color);
            }
            PieceContent::Shape { kind, level } => {
                let w = piece.width;
                match kind {
                    ShapeKind::Battery => draw_battery(
                        scratch,
                        x,
                        0,
                        w,
                        height,
                        *level,
                        self.color,
                        self.battery_padding,
                        BatteryOrientation::Horizontal,
                    ),
                    ShapeKind::BatteryVertical => draw_battery(
                        scratch,
                        x,
                        0,
                        w,
                        height,
                        *level,
                        self.color,
                        self.battery_padding,
                        BatteryOrientation::Vertical,
                    ),
                    ShapeKind::Bar => draw_horizontal_bar(scratch, x, 0, w, height, *level, self.color, Some(self.color)),
                    ShapeKind::BarVertical => {
                        draw_vertical_bar(scratch, x, 0, w, height, *level, self.color, Some(self.color));
                    }
                }
            }
            PieceContent::Empty => {}
        }
    }
}
