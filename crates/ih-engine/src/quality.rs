//! JPEG quality estimation from quantisation tables.
//!
//! Encoders following the IJG reference scale the Annex K luminance table by
//! `S = 5000 / q` (q < 50) or `S = 200 - 2q` (q >= 50), in percent. Summing
//! the stored table against the reference sum recovers `S`, and inverting the
//! scaling gives back the quality setting.

/// Annex K luminance quantisation table (natural order).
const STD_LUMINANCE: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

const MARKER_SOI: u8 = 0xD8;
const MARKER_EOI: u8 = 0xD9;
const MARKER_SOS: u8 = 0xDA;
const MARKER_DQT: u8 = 0xDB;

/// Estimate the quality (1-100) a JPEG was encoded with.
///
/// Returns `None` if the bytes are not a JPEG or carry no luminance table.
pub fn estimate_jpeg_quality(data: &[u8]) -> Option<u8> {
    let table = luminance_table(data)?;
    Some(quality_from_table(&table))
}

fn quality_from_table(table: &[u16; 64]) -> u8 {
    let sum: u32 = table.iter().map(|&v| u32::from(v)).sum();
    let std_sum: u32 = STD_LUMINANCE.iter().map(|&v| u32::from(v)).sum();
    let scale = 100.0 * f64::from(sum) / f64::from(std_sum);

    let quality = if scale <= 100.0 {
        (200.0 - scale) / 2.0
    } else {
        5000.0 / scale
    };
    quality.round().clamp(1.0, 100.0) as u8
}

/// Walk the marker segments up to the first scan and return table 0.
fn luminance_table(data: &[u8]) -> Option<[u16; 64]> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != MARKER_SOI {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == MARKER_SOS || marker == MARKER_EOI {
            return None;
        }
        // Standalone markers carry no length.
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let len = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));
        if len < 2 {
            return None;
        }
        let end = (pos + 2 + len).min(data.len());
        let segment = &data[pos + 4..end];

        if marker == MARKER_DQT {
            if let Some(table) = find_table_zero(segment) {
                return Some(table);
            }
        }
        pos = pos + 2 + len;
    }
    None
}

/// A DQT segment may hold several tables, each `Pq|Tq` followed by 64
/// entries of 8 or 16 bits.
fn find_table_zero(segment: &[u8]) -> Option<[u16; 64]> {
    let mut off = 0;
    while off < segment.len() {
        let precision = segment[off] >> 4;
        let id = segment[off] & 0x0F;
        off += 1;

        let width = if precision == 0 { 1 } else { 2 };
        let bytes = segment.get(off..off + 64 * width)?;
        off += 64 * width;

        if id != 0 {
            continue;
        }
        let mut table = [0u16; 64];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = if width == 1 {
                u16::from(bytes[i])
            } else {
                u16::from_be_bytes([bytes[2 * i], bytes[2 * i + 1]])
            };
        }
        return Some(table);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, Rgb, RgbImage};

    fn jpeg_at(quality: u8) -> Vec<u8> {
        let img = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 7) as u8, (y * 9) as u8, 128]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
            .unwrap();
        buf
    }

    #[test]
    fn exact_at_fifty() {
        assert_eq!(estimate_jpeg_quality(&jpeg_at(50)), Some(50));
    }

    #[test]
    fn close_to_encoder_setting() {
        for q in [30u8, 72, 82, 90] {
            let est = estimate_jpeg_quality(&jpeg_at(q)).unwrap();
            assert!(
                (i16::from(est) - i16::from(q)).abs() <= 1,
                "encoded at {q}, estimated {est}"
            );
        }
    }

    #[test]
    fn reference_table_is_fifty() {
        assert_eq!(quality_from_table(&STD_LUMINANCE), 50);
    }

    #[test]
    fn all_ones_is_near_maximum() {
        // The 1..255 clamp makes q=100 and q=99 indistinguishable.
        assert_eq!(quality_from_table(&[1; 64]), 99);
    }

    #[test]
    fn sixteen_bit_tables() {
        let mut segment = vec![0x10];
        for v in STD_LUMINANCE {
            segment.extend_from_slice(&(v * 2).to_be_bytes());
        }
        let table = find_table_zero(&segment).unwrap();
        // S = 200% -> 5000 / 200
        assert_eq!(quality_from_table(&table), 25);
    }

    #[test]
    fn not_a_jpeg() {
        assert_eq!(estimate_jpeg_quality(b"\x89PNG\r\n\x1a\n"), None);
        assert_eq!(estimate_jpeg_quality(b""), None);
        // SOI then straight to EOI.
        assert_eq!(estimate_jpeg_quality(&[0xFF, 0xD8, 0xFF, 0xD9]), None);
    }
}
