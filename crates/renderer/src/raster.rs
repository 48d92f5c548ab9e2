//! Nearest-neighbor raster mode.
//!
//! Every sampled pixel center is mapped back to `(lat, lon)` and takes the
//! bucket of the closest valid grid cell. Distance is Euclidean in degree
//! space, so cells are effectively stretched east-west at high latitudes.
//!
//! Valid cells are binned into a uniform lattice so a lookup only visits
//! nearby bins. Rows are computed in parallel; with a stride of `k` one
//! sample is taken per `k × k` block and copied across the block.

use anomaly_common::{Color, Statistics, TemperatureGrid};
use rayon::prelude::*;

use crate::projector::AnomalyProjector;

/// Canvas-sized grid of bucket indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    stride: usize,
    background: Color,
    bucket_colors: Vec<Color>,
    buckets: Vec<Option<usize>>,
}

impl Raster {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Bucket under pixel `(x, y)`, `None` where there is no data.
    pub fn bucket_at(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.buckets[y * self.width + x]
    }

    /// Color of pixel `(x, y)`.
    pub fn color_at(&self, x: usize, y: usize) -> Color {
        self.bucket_at(x, y)
            .and_then(|b| self.bucket_colors.get(b).copied())
            .unwrap_or(self.background)
    }

    /// Number of pixels carrying data.
    pub fn filled_count(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_some()).count()
    }

    /// RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.width * self.height * 4);
        for bucket in &self.buckets {
            let color = bucket
                .and_then(|b| self.bucket_colors.get(b).copied())
                .unwrap_or(self.background);
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        pixels
    }

    /// Palette and one index per pixel.
    ///
    /// Palette entry 0 is the background, entry `b + 1` is bucket `b`.
    /// Returns `None` when the table has more than 255 buckets.
    pub fn to_indexed(&self) -> Option<(Vec<Color>, Vec<u8>)> {
        if self.bucket_colors.len() > 255 {
            return None;
        }
        let mut palette = Vec::with_capacity(self.bucket_colors.len() + 1);
        palette.push(self.background);
        palette.extend_from_slice(&self.bucket_colors);
        let indices = self
            .buckets
            .iter()
            .map(|b| b.map_or(0, |b| (b + 1) as u8))
            .collect();
        Some((palette, indices))
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexedCell {
    lat: f64,
    lon: f64,
    bucket: usize,
}

/// Uniform binning of valid cells in degree space.
#[derive(Debug)]
struct CellIndex {
    cells: Vec<IndexedCell>,
    bins: Vec<Vec<usize>>,
    min_lat: f64,
    min_lon: f64,
    bin_size: f64,
    rows: i64,
    cols: i64,
}

impl CellIndex {
    fn build(cells: Vec<IndexedCell>) -> Self {
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
        for c in &cells {
            min_lat = min_lat.min(c.lat);
            max_lat = max_lat.max(c.lat);
            min_lon = min_lon.min(c.lon);
            max_lon = max_lon.max(c.lon);
        }

        if cells.is_empty() {
            return Self {
                cells,
                bins: Vec::new(),
                min_lat: 0.0,
                min_lon: 0.0,
                bin_size: 1.0,
                rows: 0,
                cols: 0,
            };
        }

        // Aim for roughly one cell per bin, without letting a single row or
        // column of cells collapse the bins to nothing.
        let lat_range = max_lat - min_lat;
        let lon_range = max_lon - min_lon;
        let n = cells.len() as f64;
        let bin_size = (lat_range.max(1e-6) * lon_range.max(1e-6) / n)
            .sqrt()
            .max(lat_range.max(lon_range) / n)
            .max(1e-6);
        let rows = ((max_lat - min_lat) / bin_size).floor() as i64 + 1;
        let cols = ((max_lon - min_lon) / bin_size).floor() as i64 + 1;

        let mut bins = vec![Vec::new(); (rows * cols) as usize];
        for (idx, c) in cells.iter().enumerate() {
            let r = (((c.lat - min_lat) / bin_size).floor() as i64).clamp(0, rows - 1);
            let q = (((c.lon - min_lon) / bin_size).floor() as i64).clamp(0, cols - 1);
            bins[(r * cols + q) as usize].push(idx);
        }

        Self {
            cells,
            bins,
            min_lat,
            min_lon,
            bin_size,
            rows,
            cols,
        }
    }

    /// Lattice bins at Chebyshev distance `ring` from `(qr, qc)`.
    fn ring_bins(&self, qr: i64, qc: i64, ring: i64) -> Vec<(i64, i64)> {
        let r0 = (qr - ring).max(0);
        let r1 = (qr + ring).min(self.rows - 1);
        let c0 = (qc - ring).max(0);
        let c1 = (qc + ring).min(self.cols - 1);

        let mut out = Vec::new();
        for r in r0..=r1 {
            if r == qr - ring || r == qr + ring {
                out.extend((c0..=c1).map(|c| (r, c)));
            } else {
                if qc - ring >= 0 && qc - ring < self.cols {
                    out.push((r, qc - ring));
                }
                if ring > 0 && qc + ring >= 0 && qc + ring < self.cols {
                    out.push((r, qc + ring));
                }
            }
        }
        out
    }

    /// Closest cell within `max_distance`, ties broken by scan order.
    fn nearest(&self, lat: f64, lon: f64, max_distance: Option<f64>) -> Option<&IndexedCell> {
        if self.cells.is_empty() || !lat.is_finite() || !lon.is_finite() {
            return None;
        }

        // Bin coordinates of the query, possibly outside the lattice
        let qr = ((lat - self.min_lat) / self.bin_size).floor() as i64;
        let qc = ((lon - self.min_lon) / self.bin_size).floor() as i64;

        // Rings closer than `first_ring` miss the lattice entirely; rings past
        // `last_ring` hold nothing new.
        let first_ring = [qr - (self.rows - 1), -qr, qc - (self.cols - 1), -qc, 0]
            .into_iter()
            .max()
            .unwrap_or(0);
        let last_ring = [qr, self.rows - 1 - qr, qc, self.cols - 1 - qc]
            .into_iter()
            .map(i64::abs)
            .max()
            .unwrap_or(0);

        let mut best: Option<(f64, usize)> = None;
        for ring in first_ring..=last_ring {
            // Bins in this ring are at least `ring - 1` bins away.
            if let Some(limit) = max_distance {
                if (ring - 1) as f64 * self.bin_size > limit {
                    break;
                }
            }

            for (r, c) in self.ring_bins(qr, qc, ring) {
                for &idx in &self.bins[(r * self.cols + c) as usize] {
                    let cell = &self.cells[idx];
                    let d = ((cell.lat - lat).powi(2) + (cell.lon - lon).powi(2)).sqrt();
                    let better = match best {
                        None => true,
                        Some((bd, bi)) => d < bd || (d == bd && idx < bi),
                    };
                    if better {
                        best = Some((d, idx));
                    }
                }
            }

            if let Some((d, _)) = best {
                if d < ring as f64 * self.bin_size {
                    break;
                }
            }
        }

        match (best, max_distance) {
            (Some((d, _)), Some(limit)) if d > limit => None,
            (Some((_, idx)), _) => self.cells.get(idx),
            (None, _) => None,
        }
    }
}

/// Pixel coordinate sampled for the block containing `i`.
fn sample_center(i: usize, stride: usize, len: usize) -> f64 {
    let block_start = i / stride * stride;
    (block_start + (stride - 1) / 2).min(len - 1) as f64 + 0.5
}

pub(crate) fn rasterize(
    projector: &AnomalyProjector,
    grid: &TemperatureGrid,
    stats: &Statistics,
) -> Raster {
    let config = projector.config();
    let width = config.width as usize;
    let height = config.height as usize;
    let stride = config.stride.max(1);
    let max_distance = config.max_distance_deg;

    let cells: Vec<IndexedCell> = grid
        .cells(1)
        .map(|cell| IndexedCell {
            lat: cell.lat,
            lon: projector.wrap(cell.lon),
            bucket: projector.classify(cell.value, stats).bucket,
        })
        .collect();
    let index = CellIndex::build(cells);

    let mut buckets: Vec<Option<usize>> = vec![None; width * height];
    buckets
        .par_chunks_mut(width * stride)
        .enumerate()
        .for_each(|(block_row, chunk)| {
            let sy = sample_center(block_row * stride, stride, height);
            let sampled: Vec<Option<usize>> = (0..width)
                .step_by(stride)
                .map(|x| {
                    let sx = sample_center(x, stride, width);
                    projector
                        .to_geo(sx, sy)
                        .and_then(|(lat, lon)| index.nearest(lat, lon, max_distance))
                        .map(|cell| cell.bucket)
                })
                .collect();
            for row in chunk.chunks_mut(width) {
                for (x, slot) in row.iter_mut().enumerate() {
                    *slot = sampled[x / stride];
                }
            }
        });

    Raster {
        width,
        height,
        stride,
        background: config.background,
        bucket_colors: config.thresholds.buckets.iter().map(|b| b.color).collect(),
        buckets,
    }
}
