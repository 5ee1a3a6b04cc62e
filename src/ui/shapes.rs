use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::ScatterPoint;

/// Largest angle covered by one polygon, so every piece stays convex.
const ARC_STEP: f32 = 0.05;

// ---------------------------------------------------------------------------
// Payment methods (pie)
// ---------------------------------------------------------------------------

pub fn payment_pie(ui: &mut Ui, counts: &[(String, usize)]) {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        ui.label("No transactions match the current filters.");
        return;
    }

    let (rect, painter) = chart_canvas(ui, 300.0);
    let center = Pos2::new(rect.left() + rect.height() / 2.0 + 10.0, rect.center().y);
    let radius = rect.height() / 2.0 - 10.0;
    let palette = generate_palette(counts.len());

    let mut start = -FRAC_PI_2;
    for ((_, n), color) in counts.iter().zip(&palette) {
        let sweep = *n as f32 / total as f32 * TAU;
        annular_sector(&painter, center, 0.0, radius, start, start + sweep, *color);

        let mid = start + sweep / 2.0;
        let share = *n as f32 / total as f32 * 100.0;
        if share >= 4.0 {
            painter.text(
                center + Vec2::angled(mid) * radius * 0.65,
                Align2::CENTER_CENTER,
                format!("{share:.1}%"),
                FontId::proportional(13.0),
                Color32::WHITE,
            );
        }
        start += sweep;
    }

    let legend_x = center.x + radius + 30.0;
    for (i, ((name, n), color)) in counts.iter().zip(&palette).enumerate() {
        let y = rect.top() + 20.0 + i as f32 * 20.0;
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(legend_x, y - 6.0), Vec2::splat(12.0)),
            2.0,
            *color,
        );
        painter.text(
            Pos2::new(legend_x + 18.0, y),
            Align2::LEFT_CENTER,
            format!("{name} ({n})"),
            FontId::proportional(13.0),
            ui.visuals().text_color(),
        );
    }
}

// ---------------------------------------------------------------------------
// Gross income by branch and product line (sunburst)
// ---------------------------------------------------------------------------

/// Inner ring: branches. Outer ring: each branch's product lines.
pub fn income_sunburst(
    ui: &mut Ui,
    income: &BTreeMap<(String, String), f64>,
    product_colors: &ColorMap,
) {
    let mut branches: BTreeMap<&str, Vec<(&str, f64)>> = BTreeMap::new();
    for ((branch, line), value) in income {
        if *value > 0.0 {
            branches
                .entry(branch.as_str())
                .or_default()
                .push((line.as_str(), *value));
        }
    }
    let total: f64 = branches.values().flatten().map(|(_, v)| v).sum();
    if total <= 0.0 {
        ui.label("No gross income for the current filters.");
        return;
    }

    let (rect, painter) = chart_canvas(ui, 360.0);
    let center = rect.center();
    let outer = rect.height() / 2.0 - 10.0;
    let inner = outer * 0.25;
    let middle = outer * 0.6;
    let branch_palette = generate_palette(branches.len());
    let text_color = ui.visuals().text_color();

    let mut start = -FRAC_PI_2;
    for ((branch, lines), color) in branches.iter().zip(branch_palette) {
        let branch_total: f64 = lines.iter().map(|(_, v)| v).sum();
        let branch_sweep = (branch_total / total) as f32 * TAU;
        annular_sector(&painter, center, inner, middle, start, start + branch_sweep, color);
        let ring = (inner + middle) / 2.0;
        label_sector(&painter, center, ring, start, branch_sweep, branch, text_color);

        let mut line_start = start;
        for (line, value) in lines {
            let sweep = (value / total) as f32 * TAU;
            let line_color = product_colors.color_for(line);
            let end = line_start + sweep;
            annular_sector(&painter, center, middle, outer, line_start, end, line_color);
            if sweep > 0.25 {
                let ring = (middle + outer) / 2.0;
                let label = short_label(line);
                label_sector(&painter, center, ring, line_start, sweep, &label, text_color);
            }
            line_start += sweep;
        }
        start += branch_sweep;
    }
}

fn label_sector(
    painter: &Painter,
    center: Pos2,
    radius: f32,
    start: f32,
    sweep: f32,
    text: &str,
    color: Color32,
) {
    painter.text(
        center + Vec2::angled(start + sweep / 2.0) * radius,
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(11.0),
        color,
    );
}

/// First word of a product line, enough to tell segments apart.
fn short_label(line: &str) -> String {
    line.split_whitespace().next().unwrap_or(line).to_string()
}

// ---------------------------------------------------------------------------
// Cost, gross income and unit price (3-axis scatter)
// ---------------------------------------------------------------------------

/// Orthographic 3-axis scatter; drag to rotate.
pub fn cost_income_price_scatter(ui: &mut Ui, points: &[ScatterPoint], colors: &ColorMap) {
    if points.is_empty() {
        ui.label("No transactions match the current filters.");
        return;
    }

    let desired = Vec2::new(ui.available_width(), 420.0);
    let (response, painter) = ui.allocate_painter(desired, Sense::drag());
    let rect = response.rect;

    let id = response.id.with("rotation");
    let mut rotation: Vec2 = ui.data(|d| d.get_temp(id)).unwrap_or(Vec2::new(0.6, 0.35));
    if response.dragged() {
        rotation += response.drag_delta() * 0.01;
        rotation.y = rotation.y.clamp(-1.5, 1.5);
        ui.data_mut(|d| d.insert_temp(id, rotation));
    }
    let camera = Camera {
        yaw: rotation.x,
        pitch: rotation.y,
        center: rect.center(),
        scale: rect.height().min(rect.width()) * 0.35,
    };

    let cogs = Axis::of(points.iter().map(|p| p.cogs));
    let income = Axis::of(points.iter().map(|p| p.gross_income));
    let price = Axis::of(points.iter().map(|p| p.unit_price));

    let axis_stroke = Stroke::new(1.0, ui.visuals().weak_text_color());
    let origin = camera.project([-1.0, -1.0, -1.0]);
    for (end, label) in [
        ([1.0, -1.0, -1.0], "cogs"),
        ([-1.0, 1.0, -1.0], "gross income"),
        ([-1.0, -1.0, 1.0], "Unit price"),
    ] {
        let tip = camera.project(end);
        painter.line_segment([origin, tip], axis_stroke);
        painter.text(
            tip,
            Align2::CENTER_BOTTOM,
            label,
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
    }

    for p in points {
        let pos = camera.project([
            cogs.norm(p.cogs),
            income.norm(p.gross_income),
            price.norm(p.unit_price),
        ]);
        let color = colors.color_for(&p.product_line).gamma_multiply(0.7);
        painter.circle_filled(pos, 2.5, color);
    }
}

/// Value range of one axis, mapped onto `[-1, 1]`.
struct Axis {
    min: f64,
    max: f64,
}

impl Axis {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        Axis { min, max }
    }

    fn norm(&self, v: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            0.0
        } else {
            ((v - self.min) / range * 2.0 - 1.0) as f32
        }
    }
}

struct Camera {
    yaw: f32,
    pitch: f32,
    center: Pos2,
    scale: f32,
}

impl Camera {
    /// Axes x, y, z → screen, with z pointing up.
    fn project(&self, [x, y, z]: [f32; 3]) -> Pos2 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let rx = x * cy - y * sy;
        let depth = x * sy + y * cy;
        let ry = z * cp - depth * sp;
        self.center + Vec2::new(rx, -ry) * self.scale
    }
}

// ---------------------------------------------------------------------------
// Painting helpers
// ---------------------------------------------------------------------------

fn chart_canvas(ui: &mut Ui, height: f32) -> (Rect, Painter) {
    let desired = Vec2::new(ui.available_width(), height);
    let (response, painter) = ui.allocate_painter(desired, Sense::hover());
    (response.rect, painter)
}

/// Fill the ring segment between `r_in` and `r_out` from angle `a0` to `a1`.
/// `r_in == 0` gives a pie slice.
fn annular_sector(
    painter: &Painter,
    center: Pos2,
    r_in: f32,
    r_out: f32,
    a0: f32,
    a1: f32,
    color: Color32,
) {
    let steps = (((a1 - a0) / ARC_STEP).ceil() as usize).max(1);
    let step = (a1 - a0) / steps as f32;
    for k in 0..steps {
        let t0 = a0 + step * k as f32;
        let t1 = t0 + step;
        let mut pts = vec![
            center + Vec2::angled(t0) * r_out,
            center + Vec2::angled(t1) * r_out,
        ];
        if r_in > 0.0 {
            pts.push(center + Vec2::angled(t1) * r_in);
            pts.push(center + Vec2::angled(t0) * r_in);
        } else {
            pts.push(center);
        }
        painter.add(Shape::convex_polygon(pts, color, Stroke::NONE));
    }
    // Separator lines between segments.
    let edge = Stroke::new(1.0, Color32::from_black_alpha(90));
    painter.line_segment(
        [center + Vec2::angled(a0) * r_in, center + Vec2::angled(a0) * r_out],
        edge,
    );
}
