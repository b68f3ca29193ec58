use crate::core::color::Colour;
use crate::core::framebuffer::{Canvas, DepthBuffer};
use crate::core::geometry::{CanvasPoint, CanvasTriangle};
use crate::core::math::interpolation::sample_at;
use crate::scene::texture::TextureMap;
use std::ops::Range;

/// Scanline rasterizer drawing lines and triangles onto a [`Canvas`].
///
/// Lines are walked one sample per pixel along the longer screen axis. Triangles are split
/// at their middle vertex into a flat-bottom and a flat-top half and filled one horizontal
/// line at a time, so no per-pixel edge tests are needed.
pub struct Rasterizer {
    /// Reject whole primitives with no vertex on the canvas before sampling them.
    pub cull_offscreen: bool,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_offscreen: true,
        }
    }

    /// Half-open bounds test against the canvas rectangle. NaN is never inside.
    #[inline]
    pub fn in_canvas<C: Canvas>(canvas: &C, x: f32, y: f32) -> bool {
        x >= 0.0 && x < canvas.width() as f32 && y >= 0.0 && y < canvas.height() as f32
    }

    fn any_visible<C: Canvas>(&self, canvas: &C, points: &[CanvasPoint]) -> bool {
        if points.iter().any(|p| !p.is_finite()) {
            return false;
        }
        !self.cull_offscreen || points.iter().any(|p| Self::in_canvas(canvas, p.x, p.y))
    }

    /// Draws a solid line. With a depth buffer, each sample is written only if it is at
    /// least as near as what the buffer already holds.
    pub fn draw_line<C: Canvas>(
        &self,
        canvas: &mut C,
        p1: CanvasPoint,
        p2: CanvasPoint,
        colour: Colour,
        alpha: u8,
        depth: Option<&mut DepthBuffer>,
    ) {
        if !self.any_visible(canvas, &[p1, p2]) {
            return;
        }
        let packed = colour.pack(alpha);
        self.walk_line(canvas, p1, p2, depth, |_| packed);
    }

    /// Draws a line whose colour comes from the texture, sampled at the texel coordinate
    /// interpolated between the endpoints.
    pub fn map_line<C: Canvas>(
        &self,
        canvas: &mut C,
        p1: CanvasPoint,
        p2: CanvasPoint,
        texture: &TextureMap,
        depth: Option<&mut DepthBuffer>,
    ) {
        if !self.any_visible(canvas, &[p1, p2]) {
            return;
        }
        self.walk_line(canvas, p1, p2, depth, |texel| texture.texel(texel.x, texel.y));
    }

    /// Samples a line one step per pixel along its longer axis. No culling: triangle spans
    /// may cross the canvas with both ends outside it.
    fn walk_line<C, F>(
        &self,
        canvas: &mut C,
        p1: CanvasPoint,
        p2: CanvasPoint,
        mut depth: Option<&mut DepthBuffer>,
        shade: F,
    ) where
        C: Canvas,
        F: Fn(nalgebra::Vector2<f32>) -> u32,
    {
        if !p1.is_finite() || !p2.is_finite() {
            return;
        }

        let steps = (p2.x - p1.x).abs().max((p2.y - p1.y).abs()) as usize;
        let count = steps.saturating_add(2);
        let (start, end) = (p1.position(), p2.position());

        for index in visible_samples(&p1, &p2, count, canvas.width(), canvas.height()) {
            let coord = sample_at(start, end, count, index);
            if !Self::in_canvas(canvas, coord.x, coord.y) {
                continue;
            }
            let x = coord.x as usize;
            let y = coord.y as usize;

            if let Some(buffer) = depth.as_deref_mut()
                && !buffer.test_and_update(x, y, coord.z)
            {
                continue;
            }

            let texel = sample_at(p1.texture, p2.texture, count, index);
            canvas.set_pixel_colour(x, y, shade(texel));
        }
    }

    /// Wireframe triangle: the three edges, no depth test.
    pub fn draw_triangle<C: Canvas>(
        &self,
        canvas: &mut C,
        triangle: &CanvasTriangle,
        colour: Colour,
        alpha: u8,
    ) {
        if !self.any_visible(canvas, &triangle.vertices) {
            return;
        }
        for (a, b) in triangle.edges() {
            self.draw_line(canvas, a, b, colour, alpha, None);
        }
    }

    /// Flat-shaded triangle.
    pub fn fill_triangle<C: Canvas>(
        &self,
        canvas: &mut C,
        triangle: &CanvasTriangle,
        colour: Colour,
        alpha: u8,
        mut depth: Option<&mut DepthBuffer>,
    ) {
        if !self.any_visible(canvas, &triangle.vertices) {
            return;
        }
        let packed = colour.pack(alpha);
        self.scan_triangle(canvas, triangle, |canvas, left, right| {
            self.walk_line(canvas, left, right, depth.as_deref_mut(), |_| packed);
        });
    }

    /// Texture-mapped triangle. Texel coordinates are interpolated linearly in screen space
    /// and sampled with nearest-texel lookup.
    pub fn map_triangle<C: Canvas>(
        &self,
        canvas: &mut C,
        triangle: &CanvasTriangle,
        texture: &TextureMap,
        mut depth: Option<&mut DepthBuffer>,
    ) {
        if !self.any_visible(canvas, &triangle.vertices) {
            return;
        }
        self.scan_triangle(canvas, triangle, |canvas, left, right| {
            self.walk_line(canvas, left, right, depth.as_deref_mut(), |texel| {
                texture.texel(texel.x, texel.y)
            });
        });
    }

    /// Copies a texture onto the canvas pixel for pixel, anchored at the origin.
    pub fn render_map<C: Canvas>(&self, canvas: &mut C, texture: &TextureMap) {
        if texture.width == 0 {
            return;
        }
        for (index, &pixel) in texture.pixels.iter().enumerate() {
            let x = index % texture.width;
            let y = index / texture.width;
            if x < canvas.width() && y < canvas.height() {
                canvas.set_pixel_colour(x, y, pixel);
            }
        }
    }

    /// Walks the two halves of the triangle one pixel row at a time, handing each
    /// horizontal span to `scanline`.
    fn scan_triangle<C, F>(&self, canvas: &mut C, triangle: &CanvasTriangle, mut scanline: F)
    where
        C: Canvas,
        F: FnMut(&mut C, CanvasPoint, CanvasPoint),
    {
        let [top, middle_1, middle_2, bottom] = split_triangle(triangle);
        let height = canvas.height();

        // Flat-bottom half: top -> (middle_1, middle_2)
        for row in pixel_rows(top.y, middle_1.y, height) {
            if let Some((left, right)) = row_span(row, [(&top, &middle_1), (&top, &middle_2)]) {
                scanline(canvas, left, right);
            }
        }

        // Flat-top half: (middle_1, middle_2) -> bottom
        for row in pixel_rows(middle_1.y, bottom.y, height) {
            if let Some((left, right)) = row_span(row, [(&middle_1, &bottom), (&middle_2, &bottom)])
            {
                scanline(canvas, left, right);
            }
        }
    }
}

/// Sorts the vertices by y and adds a fourth point on the long (top-bottom) edge at the
/// height of the middle vertex.
///
/// Returns `[top, middle_1, middle_2, bottom]`, where `middle_2` is the synthetic point.
pub fn split_triangle(triangle: &CanvasTriangle) -> [CanvasPoint; 4] {
    let mut points = triangle.vertices;
    points.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [top, middle_1, bottom] = points;

    let span = bottom.y - top.y;
    let ratio = if span.abs() > f32::EPSILON {
        (middle_1.y - top.y) / span
    } else {
        0.0
    };

    let middle_2 = CanvasPoint {
        x: top.x + ratio * (bottom.x - top.x),
        y: middle_1.y,
        depth: top.depth + ratio * (bottom.depth - top.depth),
        texture: top.texture + (bottom.texture - top.texture) * ratio,
    };

    [top, middle_1, middle_2, bottom]
}

/// Edge samples from `draw_line` can land a rounding error outside the exact span.
const SPAN_SLACK: f32 = 1e-4;

/// Pixel rows touched between two heights, clipped to the canvas.
fn pixel_rows(from_y: f32, to_y: f32, height: usize) -> Range<usize> {
    let first = (from_y as f64).floor().max(0.0);
    let last = (to_y as f64).floor().min(height as f64 - 1.0);
    if last < first {
        0..0
    } else {
        first as usize..last as usize + 1
    }
}

fn lerp_point(from: &CanvasPoint, to: &CanvasPoint, t: f32) -> CanvasPoint {
    CanvasPoint {
        x: from.x + (to.x - from.x) * t,
        y: from.y + (to.y - from.y) * t,
        depth: from.depth + (to.depth - from.depth) * t,
        texture: from.texture + (to.texture - from.texture) * t,
    }
}

/// Points where an edge (with `from.y <= to.y`) enters and leaves the band `lo..=hi`.
fn edge_points(from: &CanvasPoint, to: &CanvasPoint, lo: f32, hi: f32) -> [CanvasPoint; 2] {
    let dy = to.y - from.y;
    if dy <= f32::EPSILON {
        return [*from, *to];
    }
    let at = |y: f32| lerp_point(from, to, ((y - from.y) / dy).clamp(0.0, 1.0));
    [at(lo), at(hi)]
}

/// Horizontal extent of a triangle half within pixel row `row`.
///
/// Both edges are linear in y, so the extremes lie where they cross the top and bottom of the
/// row; the span therefore covers every pixel the edges themselves pass through.
fn row_span(row: usize, edges: [(&CanvasPoint, &CanvasPoint); 2]) -> Option<(CanvasPoint, CanvasPoint)> {
    let row_top = row as f32;
    let mut left: Option<CanvasPoint> = None;
    let mut right: Option<CanvasPoint> = None;

    for (from, to) in edges {
        let lo = row_top.max(from.y);
        let hi = (row_top + 1.0).min(to.y);
        if lo > hi {
            continue;
        }
        for point in edge_points(from, to, lo, hi) {
            if left.is_none_or(|l| point.x < l.x) {
                left = Some(point);
            }
            if right.is_none_or(|r| point.x > r.x) {
                right = Some(point);
            }
        }
    }

    let (mut left, mut right) = (left?, right?);
    left.x -= SPAN_SLACK;
    right.x += SPAN_SLACK;
    left.y = row_top;
    right.y = row_top;
    Some((left, right))
}

/// Sample indices along a line that can land on the canvas. Samples outside this range
/// would be dropped by the per-sample bounds check anyway.
fn visible_samples(
    p1: &CanvasPoint,
    p2: &CanvasPoint,
    count: usize,
    width: usize,
    height: usize,
) -> Range<usize> {
    let last = count - 1;
    let x_range = axis_range(p1.x, p2.x, width as f64, last);
    let y_range = axis_range(p1.y, p2.y, height as f64, last);
    match (x_range, y_range) {
        (Some((x_lo, x_hi)), Some((y_lo, y_hi))) => {
            let lo = x_lo.max(y_lo);
            let hi = x_hi.min(y_hi);
            if lo > hi { 0..0 } else { lo..hi + 1 }
        }
        _ => 0..0,
    }
}

fn axis_range(start: f32, end: f32, limit: f64, last: usize) -> Option<(usize, usize)> {
    let start = start as f64;
    let delta = end as f64 - start;
    if delta == 0.0 {
        return (start >= 0.0 && start < limit).then_some((0, last));
    }
    let scale = last as f64 / delta;
    let a = -start * scale;
    let b = (limit - start) * scale;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let lo = (lo.floor() - 1.0).max(0.0);
    let hi = (hi.ceil() + 1.0).min(last as f64);
    (lo <= hi).then_some((lo as usize, hi as usize))
}
