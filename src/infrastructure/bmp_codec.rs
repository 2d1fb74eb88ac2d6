// BMP writers: 1-bit plane files for the refresh program, RGB preview
use crate::domain::bit_plane::BitPlane;
use bytes::{BufMut, Bytes, BytesMut};
use image::{ImageFormat, ImageResult, Rgb, RgbImage};
use std::io::Cursor;

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
// 72 DPI
const PIXELS_PER_METER: i32 = 2835;

/// Palette for the 1-bit plane files: index 0 marks, index 1 is background.
const MONO_PALETTE: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

const PREVIEW_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const PREVIEW_BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const PREVIEW_ACCENT: Rgb<u8> = Rgb([255, 0, 0]);

fn padded_row_len(unpadded: usize) -> usize {
    unpadded.div_ceil(4) * 4
}

fn write_headers(buf: &mut BytesMut, width: u32, height: u32, palette: &[[u8; 3]], image_len: u32) {
    let palette_len = palette.len() as u32 * 4;
    let data_offset = FILE_HEADER_LEN + INFO_HEADER_LEN + palette_len;

    // BITMAPFILEHEADER
    buf.put_slice(b"BM");
    buf.put_u32_le(data_offset + image_len);
    buf.put_u32_le(0);
    buf.put_u32_le(data_offset);

    // BITMAPINFOHEADER, positive height = bottom-up rows
    buf.put_u32_le(INFO_HEADER_LEN);
    buf.put_i32_le(width as i32);
    buf.put_i32_le(height as i32);
    buf.put_u16_le(1);
    buf.put_u16_le(1);
    buf.put_u32_le(0);
    buf.put_u32_le(image_len);
    buf.put_i32_le(PIXELS_PER_METER);
    buf.put_i32_le(PIXELS_PER_METER);
    buf.put_u32_le(palette.len() as u32);
    buf.put_u32_le(0);

    for [r, g, b] in palette {
        buf.put_slice(&[*b, *g, *r, 0]);
    }
}

/// Encode one plane as an uncompressed 1-bit-per-pixel BMP.
pub fn encode_plane(plane: &BitPlane) -> Bytes {
    let row_len = plane.row(0).len();
    let padded = padded_row_len(row_len);
    let image_len = (padded * plane.height() as usize) as u32;

    let mut buf = BytesMut::with_capacity(
        (FILE_HEADER_LEN + INFO_HEADER_LEN) as usize + MONO_PALETTE.len() * 4 + image_len as usize,
    );
    write_headers(&mut buf, plane.width(), plane.height(), &MONO_PALETTE, image_len);

    for y in (0..plane.height()).rev() {
        buf.put_slice(plane.row(y));
        buf.put_bytes(0, padded - row_len);
    }

    buf.freeze()
}

/// Combine both planes into one white, black and red BMP.
/// Where both planes mark a pixel, black wins.
pub fn encode_preview(black: &BitPlane, accent: &BitPlane) -> ImageResult<Bytes> {
    let width = black.width().max(accent.width());
    let height = black.height().max(accent.height());
    let preview = RgbImage::from_fn(width, height, |x, y| {
        if black.is_marked(x, y) {
            PREVIEW_BLACK
        } else if accent.is_marked(x, y) {
            PREVIEW_ACCENT
        } else {
            PREVIEW_BACKGROUND
        }
    });

    let mut out = Cursor::new(Vec::new());
    preview.write_to(&mut out, ImageFormat::Bmp)?;
    Ok(Bytes::from(out.into_inner()))
}
