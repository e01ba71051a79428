//! Thin drawing layer over `vello_cpu`.
//!
//! Paths are built with the crate's `kurbo` and converted to the rasterizer's copy at the call
//! boundary. Strokes are expanded to fills with `kurbo::stroke`.

use kurbo::{BezPath, Circle, Shape, Stroke, StrokeOpts};

use crate::foundation::core::{Point, Rgba8};

const TOLERANCE: f64 = 0.1;

/// A reusable transparent render target.
pub(crate) struct Layer {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Layer {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        }
    }

    /// Clear, run `draw`, and return the premultiplied result.
    pub(crate) fn render(&mut self, draw: impl FnOnce(&mut Painter<'_>)) -> &[u8] {
        clear_pixmap_to_transparent(&mut self.pixmap);
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        draw(&mut Painter { ctx: &mut ctx });
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        self.pixmap.data_as_u8_slice()
    }
}

/// Drawing calls available inside [`Layer::render`].
pub(crate) struct Painter<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
}

impl Painter<'_> {
    pub(crate) fn fill(&mut self, path: &BezPath, color: Rgba8) {
        if color.a == 0 {
            return;
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub(crate) fn stroke(&mut self, path: &BezPath, width: f64, color: Rgba8) {
        let outline = kurbo::stroke(
            path.iter(),
            &Stroke::new(width),
            &StrokeOpts::default(),
            TOLERANCE,
        );
        self.fill(&outline, color);
    }

    pub(crate) fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        if radius > 0.0 {
            self.fill(&Circle::new(center, radius).to_path(TOLERANCE), color);
        }
    }

    pub(crate) fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Rgba8) {
        if radius > 0.0 {
            self.stroke(&Circle::new(center, radius).to_path(TOLERANCE), width, color);
        }
    }
}

/// Open polyline through `points`; empty for fewer than two.
pub(crate) fn polyline(points: impl IntoIterator<Item = Point>) -> BezPath {
    let mut path = BezPath::new();
    let mut started = false;
    for p in points {
        if started {
            path.line_to(p);
        } else {
            path.move_to(p);
            started = true;
        }
    }
    path
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}
