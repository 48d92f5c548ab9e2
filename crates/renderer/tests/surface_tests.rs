//! Tests for the SVG, PNG and JSON surfaces.

use std::io::Read;

use anomaly_common::{Color, RegionOfInterest, Statistics, TemperatureGrid};
use renderer::{
    AnomalyProjector, JsonSurface, PngSurface, ProjectorConfig, RenderMode, RenderSurface,
    SvgSurface,
};
use test_utils::fixtures::scenario;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

struct Chunk {
    kind: [u8; 4],
    data: Vec<u8>,
}

/// Split a PNG into chunks, checking every CRC.
fn parse_chunks(png: &[u8]) -> Vec<Chunk> {
    assert_eq!(&png[..8], &PNG_SIGNATURE);
    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        let data = png[pos + 8..pos + 8 + len].to_vec();
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&kind);
        hasher.update(&data);
        assert_eq!(hasher.finalize(), crc, "bad CRC in {:?}", kind);

        chunks.push(Chunk { kind, data });
        pos += 12 + len;
    }
    chunks
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .unwrap();
    out
}

fn scenario_inputs() -> (TemperatureGrid, Statistics) {
    (
        TemperatureGrid::new(
            scenario::LATS.to_vec(),
            scenario::LONS.to_vec(),
            scenario::values(),
        ),
        Statistics::new(
            scenario::MIN_ANOMALY,
            scenario::MAX_ANOMALY,
            scenario::MEAN_ANOMALY,
        ),
    )
}

// ============================================================================
// SVG
// ============================================================================

#[test]
fn test_svg_one_circle_per_point() {
    let (grid, stats) = scenario_inputs();
    let points = AnomalyProjector::new(ProjectorConfig::default())
        .unwrap()
        .project_points(&grid, &stats)
        .unwrap();

    let svg = SvgSurface::new(800, 600).render_points(&points, &stats).unwrap();
    let svg = String::from_utf8(svg).unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<circle").count(), 3);
    assert!(svg.contains(&points[0].color.to_hex()));
}

#[test]
fn test_svg_background_rect_only_when_opaque() {
    let stats = Statistics::new(0.0, 1.0, 0.5);
    let plain = String::from_utf8(SvgSurface::new(10, 10).render_points(&[], &stats).unwrap()).unwrap();
    assert!(!plain.contains("<rect"));

    let filled = SvgSurface::new(10, 10)
        .with_background(Color::rgb(0, 0, 0))
        .render_points(&[], &stats)
        .unwrap();
    assert!(String::from_utf8(filled).unwrap().contains("<rect width=\"100%\""));
}

#[test]
fn test_svg_raster_runs() {
    let grid = TemperatureGrid::new(
        vec![5.0],
        vec![2.5, 7.5],
        vec![vec![Some(-1.0), Some(1.0)]],
    );
    let stats = Statistics::new(-1.0, 1.0, 0.0);
    let raster = AnomalyProjector::new(ProjectorConfig {
        region: RegionOfInterest::new(0.0, 10.0, 0.0, 10.0),
        width: 10,
        height: 2,
        mode: RenderMode::Raster,
        ..Default::default()
    })
    .unwrap()
    .rasterize(&grid, &stats)
    .unwrap();

    let svg = String::from_utf8(SvgSurface::new(10, 2).render_raster(&raster, &stats).unwrap()).unwrap();
    // Two rows, each split into a cold run and a warm run
    assert_eq!(svg.matches("<rect").count(), 4);
    assert!(svg.contains(r#"width="5""#));
}

// ============================================================================
// PNG
// ============================================================================

#[test]
fn test_png_points_structure() {
    let (grid, stats) = scenario_inputs();
    let points = AnomalyProjector::new(ProjectorConfig::default())
        .unwrap()
        .project_points(&grid, &stats)
        .unwrap();

    let png = PngSurface::new(800, 600).render_points(&points, &stats).unwrap();
    let chunks = parse_chunks(&png);
    let kinds: Vec<&[u8; 4]> = chunks.iter().map(|c| &c.kind).collect();

    assert_eq!(kinds.first(), Some(&b"IHDR"));
    assert_eq!(kinds.last(), Some(&b"IEND"));
    assert!(kinds.contains(&b"IDAT"));

    let ihdr = &chunks[0].data;
    assert_eq!(u32::from_be_bytes(ihdr[0..4].try_into().unwrap()), 800);
    assert_eq!(u32::from_be_bytes(ihdr[4..8].try_into().unwrap()), 600);
    // Few colors, so indexed with a transparent background
    assert_eq!(ihdr[9], 3);
    assert!(kinds.contains(&b"tRNS"));
}

#[test]
fn test_png_raster_pixels_roundtrip() {
    let grid = TemperatureGrid::new(
        vec![5.0],
        vec![2.5, 7.5],
        vec![vec![Some(-1.0), Some(1.0)]],
    );
    let stats = Statistics::new(-1.0, 1.0, 0.0);
    let raster = AnomalyProjector::new(ProjectorConfig {
        region: RegionOfInterest::new(0.0, 10.0, 0.0, 10.0),
        width: 10,
        height: 2,
        mode: RenderMode::Raster,
        background: Color::rgb(0, 0, 0),
        ..Default::default()
    })
    .unwrap()
    .rasterize(&grid, &stats)
    .unwrap();

    let png = PngSurface::new(10, 2).render_raster(&raster, &stats).unwrap();
    let chunks = parse_chunks(&png);
    let idat: Vec<u8> = chunks
        .iter()
        .filter(|c| &c.kind == b"IDAT")
        .flat_map(|c| c.data.clone())
        .collect();
    let scanlines = inflate(&idat);

    // Filter byte plus ten palette indices per row
    assert_eq!(scanlines.len(), 2 * 11);
    assert_eq!(scanlines[0], 0);
    // Palette index = bucket + 1; coldest bucket 0, warmest bucket 4
    assert_eq!(&scanlines[1..6], &[1, 1, 1, 1, 1]);
    assert_eq!(&scanlines[6..11], &[5, 5, 5, 5, 5]);
    // Opaque background: no tRNS chunk
    assert!(!chunks.iter().any(|c| &c.kind == b"tRNS"));
}

#[test]
fn test_png_rgba_fallback() {
    let pixels: Vec<u8> = (0..300u32)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
        .collect();
    let png = renderer::png::encode_png(&pixels, 300, 1).unwrap();
    let chunks = parse_chunks(&png);
    assert_eq!(chunks[0].data[9], 6);
    assert_eq!(inflate(&chunks[1].data).len(), 1 + 300 * 4);
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_json_points_document() {
    let (grid, stats) = scenario_inputs();
    let points = AnomalyProjector::new(ProjectorConfig::default())
        .unwrap()
        .project_points(&grid, &stats)
        .unwrap();

    let bytes = JsonSurface::new().render_points(&points, &stats).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["count"], 3);
    assert_eq!(doc["points"][1]["bucket"], 0);
    assert_eq!(doc["points"][2]["value"], 5.0);
    assert_eq!(doc["statistics"]["min_anomaly"], -3.0);
}

#[test]
fn test_surface_extensions() {
    assert_eq!(SvgSurface::new(1, 1).extension(), "svg");
    assert_eq!(PngSurface::new(1, 1).extension(), "png");
    assert_eq!(JsonSurface::new().extension(), "json");
}
