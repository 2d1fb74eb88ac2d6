// Monochrome bit plane
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

/// Drawing colour for anything that should show up on the panel.
pub const MARK: BinaryColor = BinaryColor::On;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Black,
    Accent,
}

/// A width × height canvas, one bit per pixel, rows packed MSB first.
///
/// A cleared bit is a mark and a set bit is background, which is the
/// polarity the panel's refresh program expects in its raster files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPlane {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
}

impl BitPlane {
    /// A plane filled with background.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            bits: vec![0xFF; stride * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed bytes of one row, including trailing pad bits (always background).
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.bits[start..start + self.stride]
    }

    pub fn is_marked(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.bits[y as usize * self.stride + x as usize / 8];
        byte & (0x80 >> (x % 8)) == 0
    }

    #[cfg(test)]
    pub fn mark_count(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_marked(x, y))
            .count()
    }

    fn set(&mut self, x: u32, y: u32, marked: bool) {
        let idx = y as usize * self.stride + x as usize / 8;
        let mask = 0x80 >> (x % 8);
        if marked {
            self.bits[idx] &= !mask;
        } else {
            self.bits[idx] |= mask;
        }
    }
}

impl OriginDimensions for BitPlane {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for BitPlane {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Off-panel pixels are clipped
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= self.width || y >= self.height {
                continue;
            }
            self.set(x, y, color == MARK);
        }
        Ok(())
    }
}
