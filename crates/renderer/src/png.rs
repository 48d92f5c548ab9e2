//! Minimal PNG encoder.
//!
//! Two color types are written:
//! - **Indexed (color type 3)** when the image has at most 256 distinct
//!   colors. Anomaly maps almost always qualify since every pixel is a
//!   bucket color or the background.
//! - **RGBA (color type 6)** otherwise.
//!
//! Scanlines use filter type 0 and are compressed with zlib.

use std::collections::HashMap;
use std::io::Write;

use anomaly_common::{AnomalyError, AnomalyResult, Color};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Encode RGBA bytes, choosing indexed output when the colors fit.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> AnomalyResult<Vec<u8>> {
    check_len(pixels.len(), width * height * 4)?;
    match extract_palette(pixels) {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

/// Split RGBA bytes into a palette and one index per pixel.
///
/// Returns `None` as soon as a 257th color shows up.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<Color>, Vec<u8>)> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<Color> = Vec::new();
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = [px[0], px[1], px[2], px[3]];
        let index = match lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(Color::new(px[0], px[1], px[2], px[3]));
                lookup.insert(key, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Encode an indexed PNG from a palette and one index per pixel.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[Color],
    indices: &[u8],
) -> AnomalyResult<Vec<u8>> {
    check_len(indices.len(), width * height)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(AnomalyError::render(format!(
            "palette must hold 1 to {} colors, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
        return Err(AnomalyError::render(format!(
            "palette index {} out of range for {} colors",
            bad,
            palette.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3)?);

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some entry is not fully opaque
    if palette.iter().any(|c| c.a < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c.a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode a truecolor-with-alpha PNG.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> AnomalyResult<Vec<u8>> {
    check_len(pixels.len(), width * height * 4)?;

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6)?);
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(actual: usize, expected: usize) -> AnomalyResult<()> {
    if actual != expected {
        return Err(AnomalyError::render(format!(
            "expected {} bytes of image data, got {}",
            expected, actual
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> AnomalyResult<Vec<u8>> {
    let w = u32::try_from(width).map_err(|_| AnomalyError::render("image too wide"))?;
    let h = u32::try_from(height).map_err(|_| AnomalyError::render("image too tall"))?;
    if w == 0 || h == 0 {
        return Err(AnomalyError::render("image must be non-empty"));
    }
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&w.to_be_bytes());
    data.extend_from_slice(&h.to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    Ok(data)
}

/// Prefix each `row_bytes` scanline with filter type 0 and zlib it.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> AnomalyResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| AnomalyError::render(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
