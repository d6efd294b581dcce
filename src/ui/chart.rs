//! Candlestick chart: paints the session's display list with the imgui DrawList.

use cp_master::{DisplayList, Point, Primitive, Rect, Theme, ViewBounds};

const MARGIN_LEFT: f32 = 48.0;
const MARGIN_RIGHT: f32 = 12.0;
const MARGIN_BOTTOM: f32 = 24.0;
/// Gap between stacked header lines and around the panel edge.
const LABEL_PAD: f32 = 4.0;

/// Pitch grid spacing (one octave).
const PITCH_STEP: f64 = 12.0;
/// Slot grid spacing.
const SLOT_STEP: f64 = 4.0;

/// Used before the renderer has set any limits.
const EMPTY_BOUNDS: ViewBounds = ViewBounds {
    x: (-1.0, 32.0),
    y: (0.0, 127.0),
};

/// Maps chart data coordinates onto a screen rectangle, y pointing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartTransform {
    origin: [f32; 2],
    size: [f32; 2],
    bounds: ViewBounds,
}

impl ChartTransform {
    pub fn new(origin: [f32; 2], size: [f32; 2], bounds: ViewBounds) -> Self {
        Self {
            origin,
            size,
            bounds,
        }
    }

    pub fn to_screen(&self, p: Point) -> [f32; 2] {
        let fx = fraction(p.x, self.bounds.x);
        let fy = fraction(p.y, self.bounds.y);
        [
            self.origin[0] + fx as f32 * self.size[0],
            self.origin[1] + (1.0 - fy as f32) * self.size[1],
        ]
    }

    /// Screen-space (min, max) corners of `rect`.
    pub fn rect(&self, rect: &Rect) -> ([f32; 2], [f32; 2]) {
        let top_left = self.to_screen(Point::new(rect.x, rect.top()));
        let bottom_right = self.to_screen(Point::new(rect.right(), rect.y));
        (top_left, bottom_right)
    }
}

/// Position of `v` within `range` as 0..1; degenerate ranges map to the middle.
fn fraction(v: f64, range: (f64, f64)) -> f64 {
    let span = range.1 - range.0;
    if span.abs() < f64::EPSILON {
        0.5
    } else {
        (v - range.0) / span
    }
}

/// Measured text sizes of the chart labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelSizes {
    pub title: [f32; 2],
    pub legend: [f32; 2],
    pub x_label: [f32; 2],
    pub y_label: [f32; 2],
}

/// Top-left screen positions of the chart labels and where the plot begins.
///
/// Title and legend are centred on their own rows. The y label sits on the
/// row below them, against the left margin, so it never shares a row with
/// the title.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelLayout {
    pub title: [f32; 2],
    pub legend: [f32; 2],
    pub x_label: [f32; 2],
    pub y_label: [f32; 2],
    pub plot_top: f32,
}

impl LabelLayout {
    pub fn new(origin: [f32; 2], avail: [f32; 2], sizes: &LabelSizes) -> Self {
        let centred = |size: [f32; 2]| origin[0] + ((avail[0] - size[0]) / 2.0).max(0.0);

        let title = [centred(sizes.title), origin[1] + LABEL_PAD];
        let legend = [centred(sizes.legend), title[1] + sizes.title[1] + LABEL_PAD];
        let y_label = [origin[0] + LABEL_PAD, legend[1] + sizes.legend[1] + LABEL_PAD];
        let x_label = [
            centred(sizes.x_label),
            origin[1] + avail[1] - sizes.x_label[1] - LABEL_PAD,
        ];
        Self {
            title,
            legend,
            x_label,
            y_label,
            plot_top: y_label[1] + sizes.y_label[1] + LABEL_PAD,
        }
    }
}

/// Multiples of `step` inside `range`.
fn grid_values(range: (f64, f64), step: f64) -> impl Iterator<Item = f64> {
    let first = (range.0 / step).ceil() as i64;
    let last = (range.1 / step).floor() as i64;
    (first..=last).map(move |i| i as f64 * step)
}

pub fn chart_panel(ui: &imgui::Ui, surface: &DisplayList) {
    let avail = ui.content_region_avail();
    let origin = ui.cursor_screen_pos();
    ui.dummy(avail);

    let Some(theme) = surface.theme() else {
        ui.set_cursor_screen_pos([origin[0] + 8.0, origin[1] + 8.0]);
        ui.text_disabled("Nothing playing.");
        return;
    };

    let draw_list = ui.get_window_draw_list();
    let sizes = LabelSizes {
        title: ui.calc_text_size(&theme.title),
        legend: ui.calc_text_size(&theme.legend),
        x_label: ui.calc_text_size(&theme.x_label),
        y_label: ui.calc_text_size(&theme.y_label),
    };
    let labels = LabelLayout::new(origin, avail, &sizes);
    let plot_min = [origin[0] + MARGIN_LEFT, labels.plot_top];
    let plot_size = [
        (avail[0] - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
        (origin[1] + avail[1] - labels.plot_top - MARGIN_BOTTOM).max(1.0),
    ];
    let plot_max = [plot_min[0] + plot_size[0], plot_min[1] + plot_size[1]];
    let bounds = surface.bounds().unwrap_or(EMPTY_BOUNDS);
    let transform = ChartTransform::new(plot_min, plot_size, bounds);

    draw_list
        .add_rect(origin, [origin[0] + avail[0], origin[1] + avail[1]], theme.background)
        .filled(true)
        .build();

    draw_grid(ui, &draw_list, theme, &transform, bounds);

    draw_list.with_clip_rect_intersect(plot_min, plot_max, || {
        for primitive in surface.primitives() {
            match primitive {
                Primitive::Line {
                    from,
                    to,
                    color,
                    width,
                } => {
                    draw_list
                        .add_line(transform.to_screen(*from), transform.to_screen(*to), *color)
                        .thickness(*width)
                        .build();
                }
                Primitive::Rect { rect, fill, edge } => {
                    let (min, max) = transform.rect(rect);
                    draw_list.add_rect(min, max, *fill).filled(true).build();
                    draw_list.add_rect(min, max, *edge).build();
                }
            }
        }
    });

    draw_list.add_rect(plot_min, plot_max, theme.foreground).build();
    draw_labels(&draw_list, theme, &labels);
}

fn draw_grid(
    ui: &imgui::Ui,
    draw_list: &imgui::DrawListMut<'_>,
    theme: &Theme,
    transform: &ChartTransform,
    bounds: ViewBounds,
) {
    for pitch in grid_values(bounds.y, PITCH_STEP) {
        let left = transform.to_screen(Point::new(bounds.x.0, pitch));
        let right = transform.to_screen(Point::new(bounds.x.1, pitch));
        draw_list.add_line(left, right, theme.grid).build();

        let label = format!("{pitch:.0}");
        let size = ui.calc_text_size(&label);
        draw_list.add_text(
            [left[0] - size[0] - 6.0, left[1] - size[1] / 2.0],
            theme.foreground,
            &label,
        );
    }
    for slot in grid_values((bounds.x.0.max(0.0), bounds.x.1), SLOT_STEP) {
        let top = transform.to_screen(Point::new(slot, bounds.y.1));
        let bottom = transform.to_screen(Point::new(slot, bounds.y.0));
        draw_list.add_line(top, bottom, theme.grid).build();
    }
}

fn draw_labels(draw_list: &imgui::DrawListMut<'_>, theme: &Theme, labels: &LabelLayout) {
    draw_list.add_text(labels.title, theme.foreground, &theme.title);
    draw_list.add_text(labels.legend, theme.foreground, &theme.legend);
    draw_list.add_text(labels.x_label, theme.foreground, &theme.x_label);
    draw_list.add_text(labels.y_label, theme.foreground, &theme.y_label);
}
