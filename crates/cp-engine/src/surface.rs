//! Drawing capabilities the renderer needs, plus a retained implementation.
//!
//! `DisplayList` keeps every primitive drawn since the last clear. The GUI
//! paints it each frame; tests and the headless CLI inspect it directly.

/// RGBA colour, components in `0.0..=1.0`.
pub type Rgba = [f32; 4];

/// Build an opaque colour from a `0xRRGGBB` literal.
pub const fn rgb(hex: u32) -> Rgba {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// A point in chart (data) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in chart coordinates, anchored at its lower-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Visible data range of the chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

/// Fixed chrome re-applied after every clear.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub title: String,
    /// Colour key drawn under the title
    pub legend: String,
    pub x_label: String,
    pub y_label: String,
    pub background: Rgba,
    pub foreground: Rgba,
    pub grid: Rgba,
    pub bullish: Rgba,
    pub bearish: Rgba,
    pub neutral: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: "Music Candlestick Chart - One Candlestick Per Note".to_string(),
            legend: "(Green: open>close, Red: open<close, Light Gray: open=close)".to_string(),
            x_label: "Notes (Chronological Order)".to_string(),
            y_label: "Pitch (MIDI Note Number)".to_string(),
            background: rgb(0x000000),
            foreground: rgb(0xffffff),
            grid: [1.0, 1.0, 1.0, 0.3],
            bullish: rgb(0x00aa00),
            bearish: rgb(0xff3333),
            neutral: rgb(0xcccccc),
        }
    }
}

/// Drawing capabilities exposed to the renderer.
pub trait RenderSurface {
    /// Remove everything drawn, including chrome.
    fn clear(&mut self);

    /// Apply background, labels and grid.
    fn apply_theme(&mut self, theme: &Theme);

    /// Draw a line segment.
    fn draw_line(&mut self, from: Point, to: Point, color: Rgba, width: f32);

    /// Draw a filled rectangle with an edge.
    fn draw_rect(&mut self, rect: Rect, fill: Rgba, edge: Rgba);

    /// Set the visible data range.
    fn set_limits(&mut self, bounds: ViewBounds);
}

/// A retained drawing primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Line {
        from: Point,
        to: Point,
        color: Rgba,
        width: f32,
    },
    Rect {
        rect: Rect,
        fill: Rgba,
        edge: Rgba,
    },
}

/// Retained surface: primitives since the last clear plus current chrome.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    primitives: Vec<Primitive>,
    theme: Option<Theme>,
    bounds: Option<ViewBounds>,
    clears: usize,
    theme_applications: usize,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    pub fn bounds(&self) -> Option<ViewBounds> {
        self.bounds
    }

    /// Number of `clear` calls so far.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Number of `apply_theme` calls so far.
    pub fn theme_count(&self) -> usize {
        self.theme_applications
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Point, &Point, &Rgba)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line { from, to, color, .. } => Some((from, to, color)),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = (&Rect, &Rgba, &Rgba)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Rect { rect, fill, edge } => Some((rect, fill, edge)),
            _ => None,
        })
    }

    /// Drop all content and counters, e.g. when a new score is loaded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl RenderSurface for DisplayList {
    fn clear(&mut self) {
        self.primitives.clear();
        self.theme = None;
        self.bounds = None;
        self.clears += 1;
    }

    fn apply_theme(&mut self, theme: &Theme) {
        self.theme = Some(theme.clone());
        self.theme_applications += 1;
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgba, width: f32) {
        self.primitives.push(Primitive::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn draw_rect(&mut self, rect: Rect, fill: Rgba, edge: Rgba) {
        self.primitives.push(Primitive::Rect { rect, fill, edge });
    }

    fn set_limits(&mut self, bounds: ViewBounds) {
        self.bounds = Some(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_components() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        let c = rgb(0x00aa00);
        assert!((c[1] - 170.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn clear_drops_content_and_counts() {
        let mut list = DisplayList::new();
        list.apply_theme(&Theme::default());
        list.draw_line(Point::new(0.0, 1.0), Point::new(0.0, 2.0), rgb(0xffffff), 1.5);
        list.draw_rect(
            Rect { x: -0.35, y: 1.0, width: 0.7, height: 0.5 },
            rgb(0xffffff),
            rgb(0xffffff),
        );
        list.set_limits(ViewBounds { x: (-1.0, 32.0), y: (0.0, 3.0) });
        assert_eq!(list.primitives().len(), 2);
        assert_eq!(list.lines().count(), 1);
        assert_eq!(list.rects().count(), 1);

        list.clear();
        assert!(list.primitives().is_empty());
        assert!(list.theme().is_none());
        assert!(list.bounds().is_none());
        assert_eq!(list.clear_count(), 1);
        assert_eq!(list.theme_count(), 1);
    }

    #[test]
    fn default_theme_explains_colours() {
        let theme = Theme::default();
        assert!(theme.legend.contains("Green: open>close"));
        assert!(theme.legend.contains("Red: open<close"));
        assert!(theme.legend.contains("Light Gray: open=close"));
        assert!(!theme.title.contains('\n'));
    }

    #[test]
    fn rect_edges() {
        let r = Rect { x: 1.0, y: 2.0, width: 0.5, height: 3.0 };
        assert_eq!(r.top(), 5.0);
        assert_eq!(r.right(), 1.5);
    }
}
