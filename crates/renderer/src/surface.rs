//! Rendering surfaces.
//!
//! A surface turns projector output into bytes. Positions and colors are
//! taken as given; no surface re-projects or re-classifies anything.

use std::fmt::Write as _;

use anomaly_common::{AnomalyError, AnomalyResult, Color, Statistics};
use serde::Serialize;

use crate::png;
use crate::projector::{DrawablePoint, ProjectionOutput};
use crate::raster::Raster;

/// Radius used for points that carry no size.
pub const DEFAULT_POINT_RADIUS: f64 = 2.0;

pub trait RenderSurface {
    /// File extension of the produced document, without the dot.
    fn extension(&self) -> &'static str;

    fn render_points(&self, points: &[DrawablePoint], stats: &Statistics) -> AnomalyResult<Vec<u8>>;

    fn render_raster(&self, raster: &Raster, stats: &Statistics) -> AnomalyResult<Vec<u8>>;

    fn render(&self, output: &ProjectionOutput, stats: &Statistics) -> AnomalyResult<Vec<u8>> {
        match output {
            ProjectionOutput::Points(points) => self.render_points(points, stats),
            ProjectionOutput::Raster(raster) => self.render_raster(raster, stats),
        }
    }
}

// ============================================================================
// SVG
// ============================================================================

/// Scatter of circles, one per point.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    background: Color,
    default_radius: f64,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::transparent(),
            default_radius: DEFAULT_POINT_RADIUS,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_default_radius(mut self, radius: f64) -> Self {
        self.default_radius = radius;
        self
    }

    fn open(&self, stats: &Statistics) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            svg,
            "<desc>min {:.2} °C, max {:.2} °C, mean {:.2} °C</desc>",
            stats.min_anomaly, stats.max_anomaly, stats.mean_anomaly
        );
        if self.background.a > 0 {
            let _ = writeln!(
                svg,
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                self.background.to_hex()
            );
        }
        svg
    }
}

impl RenderSurface for SvgSurface {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render_points(&self, points: &[DrawablePoint], stats: &Statistics) -> AnomalyResult<Vec<u8>> {
        let mut svg = self.open(stats);
        svg.push_str("<g class=\"anomalies\">\n");
        for p in points {
            let _ = writeln!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" data-value="{:.2}"/>"#,
                p.x,
                p.y,
                p.size.unwrap_or(self.default_radius),
                p.color.to_hex(),
                p.value
            );
        }
        svg.push_str("</g>\n</svg>\n");
        Ok(svg.into_bytes())
    }

    /// Each row becomes runs of same-colored rectangles; background runs are
    /// left out.
    fn render_raster(&self, raster: &Raster, stats: &Statistics) -> AnomalyResult<Vec<u8>> {
        let mut svg = self.open(stats);
        svg.push_str("<g class=\"raster\" shape-rendering=\"crispEdges\">\n");
        for y in 0..raster.height() {
            let mut x = 0;
            while x < raster.width() {
                let bucket = raster.bucket_at(x, y);
                let start = x;
                while x < raster.width() && raster.bucket_at(x, y) == bucket {
                    x += 1;
                }
                if bucket.is_some() {
                    let _ = writeln!(
                        svg,
                        r#"<rect x="{}" y="{}" width="{}" height="1" fill="{}"/>"#,
                        start,
                        y,
                        x - start,
                        raster.color_at(start, y).to_hex()
                    );
                }
            }
        }
        svg.push_str("</g>\n</svg>\n");
        Ok(svg.into_bytes())
    }
}

// ============================================================================
// PNG
// ============================================================================

/// Points as filled discs, or the raster pixel for pixel.
#[derive(Debug, Clone)]
pub struct PngSurface {
    width: u32,
    height: u32,
    background: Color,
    default_radius: f64,
}

impl PngSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::transparent(),
            default_radius: DEFAULT_POINT_RADIUS,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_default_radius(mut self, radius: f64) -> Self {
        self.default_radius = radius;
        self
    }
}

impl RenderSurface for PngSurface {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn render_points(&self, points: &[DrawablePoint], _stats: &Statistics) -> AnomalyResult<Vec<u8>> {
        let mut canvas = Canvas::new(self.width as usize, self.height as usize, self.background);
        for p in points {
            canvas.fill_disc(p.x, p.y, p.size.unwrap_or(self.default_radius), p.color);
        }
        png::encode_png(&canvas.pixels, canvas.width, canvas.height)
    }

    fn render_raster(&self, raster: &Raster, _stats: &Statistics) -> AnomalyResult<Vec<u8>> {
        match raster.to_indexed() {
            Some((palette, indices)) => {
                png::encode_indexed(raster.width(), raster.height(), &palette, &indices)
            }
            None => png::encode_png(&raster.to_rgba(), raster.width(), raster.height()),
        }
    }
}

/// RGBA pixel buffer.
struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: usize, height: usize, fill: Color) -> Self {
        let pixels = [fill.r, fill.g, fill.b, fill.a].repeat(width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    fn set(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let offset = (y as usize * self.width + x as usize) * 4;
        self.pixels[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    /// Paint every pixel whose center lies within `radius` of `(cx, cy)`.
    /// The pixel containing the center is always painted.
    fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        self.set(cx.floor() as i64, cy.floor() as i64, color);
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let (max_x, max_y) = (self.width as i64 - 1, self.height as i64 - 1);
        let x0 = ((cx - radius).floor() as i64).max(0);
        let x1 = ((cx + radius).ceil() as i64).min(max_x);
        let y0 = ((cy - radius).floor() as i64).max(0);
        let y1 = ((cy + radius).ceil() as i64).min(max_y);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set(x, y, color);
                }
            }
        }
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Points (or raster bucket rows) as a JSON document.
#[derive(Debug, Clone, Default)]
pub struct JsonSurface {
    pretty: bool,
}

#[derive(Serialize)]
struct PointsDocument<'a> {
    statistics: &'a Statistics,
    count: usize,
    points: &'a [DrawablePoint],
}

#[derive(Serialize)]
struct RasterDocument<'a> {
    statistics: &'a Statistics,
    width: usize,
    height: usize,
    stride: usize,
    background: Color,
    /// Bucket index per pixel, `null` for no data
    rows: Vec<Vec<Option<usize>>>,
}

impl JsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn encode<T: Serialize>(&self, doc: &T) -> AnomalyResult<Vec<u8>> {
        let result = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        result.map_err(|e| AnomalyError::render(format!("JSON encoding failed: {}", e)))
    }
}

impl RenderSurface for JsonSurface {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render_points(&self, points: &[DrawablePoint], stats: &Statistics) -> AnomalyResult<Vec<u8>> {
        self.encode(&PointsDocument {
            statistics: stats,
            count: points.len(),
            points,
        })
    }

    fn render_raster(&self, raster: &Raster, stats: &Statistics) -> AnomalyResult<Vec<u8>> {
        let rows = (0..raster.height())
            .map(|y| (0..raster.width()).map(|x| raster.bucket_at(x, y)).collect())
            .collect();
        self.encode(&RasterDocument {
            statistics: stats,
            width: raster.width(),
            height: raster.height(),
            stride: raster.stride(),
            background: raster.background(),
            rows,
        })
    }
}
