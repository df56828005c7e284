/// Owned RGBA8 pixel buffer, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.pixels.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub(crate) fn write_pixel_clipped(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let x = x as usize;
        let y = y as usize;
        let Some(pixel_offset) = y
            .checked_mul(self.width as usize)
            .and_then(|row| row.checked_add(x))
        else {
            return;
        };
        let Some(byte_offset) = pixel_offset.checked_mul(4) else {
            return;
        };
        let Some(end) = byte_offset.checked_add(4) else {
            return;
        };
        if end > self.pixels.len() {
            return;
        }
        self.pixels[byte_offset..end].copy_from_slice(&color);
    }

    /// Alpha-blends `color` over the existing pixel.
    pub(crate) fn blend_pixel_clipped(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let Some(existing) = self.pixel_i32(x, y) else {
            return;
        };
        let alpha = color[3] as u32;
        let inverse = 255 - alpha;
        let mut blended = [0u8; 4];
        for channel in 0..3 {
            blended[channel] =
                ((color[channel] as u32 * alpha + existing[channel] as u32 * inverse) / 255) as u8;
        }
        blended[3] = existing[3].max(color[3]);
        self.write_pixel_clipped(x, y, blended);
    }

    fn pixel_i32(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 {
            return None;
        }
        self.pixel(x as u32, y as u32)
    }

    pub(crate) fn draw_vertical_line_clipped(&mut self, x: i32, top: i32, bottom: i32, color: [u8; 4]) {
        if x < 0 || x >= self.width as i32 {
            return;
        }
        let top = top.max(0);
        let bottom = bottom.min(self.height as i32 - 1);
        for y in top..=bottom {
            self.write_pixel_clipped(x, y, color);
        }
    }

    pub(crate) fn draw_horizontal_line_clipped(
        &mut self,
        y: i32,
        left: i32,
        right: i32,
        color: [u8; 4],
    ) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let left = left.max(0);
        let right = right.min(self.width as i32 - 1);
        for x in left..=right {
            self.write_pixel_clipped(x, y, color);
        }
    }

    /// Blends a filled rectangle covering `[left, right) x [top, bottom)`.
    pub(crate) fn fill_rect_blended(
        &mut self,
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        color: [u8; 4],
    ) {
        let left = left.max(0);
        let top = top.max(0);
        let right = right.min(self.width as i32);
        let bottom = bottom.min(self.height as i32);
        for y in top..bottom {
            for x in left..right {
                self.blend_pixel_clipped(x, y, color);
            }
        }
    }

    pub(crate) fn draw_rect_outline(
        &mut self,
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        thickness: i32,
        color: [u8; 4],
    ) {
        for inset in 0..thickness.max(1) {
            let (l, t, r, b) = (left + inset, top + inset, right - inset, bottom - inset);
            if l > r || t > b {
                break;
            }
            self.draw_horizontal_line_clipped(t, l, r, color);
            self.draw_horizontal_line_clipped(b, l, r, color);
            self.draw_vertical_line_clipped(l, t, b, color);
            self.draw_vertical_line_clipped(r, t, b, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn writes_outside_the_frame_are_ignored() {
        let mut zero = RgbaFrame::new(0, 0);
        zero.write_pixel_clipped(0, 0, RED);
        zero.draw_vertical_line_clipped(0, 0, 10, RED);
        zero.draw_horizontal_line_clipped(0, 0, 10, RED);
        assert!(zero.as_bytes().is_empty());

        let mut tiny = RgbaFrame::new(1, 1);
        tiny.write_pixel_clipped(-1, 0, RED);
        tiny.write_pixel_clipped(99, 99, RED);
        assert_eq!(tiny.pixel(0, 0), Some([0, 0, 0, 0]));
        tiny.draw_vertical_line_clipped(0, -5, 5, RED);
        assert_eq!(tiny.pixel(0, 0), Some(RED));
        assert_eq!(tiny.as_bytes().len(), 4);
    }

    #[test]
    fn blending_mixes_with_existing_color() {
        let mut frame = RgbaFrame::new(2, 1);
        frame.clear([0, 0, 255, 255]);
        frame.blend_pixel_clipped(0, 0, [255, 0, 0, 128]);
        let mixed = frame.pixel(0, 0).expect("pixel");
        assert!(mixed[0] > 100 && mixed[2] > 100, "{mixed:?}");
        assert_eq!(frame.pixel(1, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn rect_outline_leaves_interior_untouched() {
        let mut frame = RgbaFrame::new(5, 5);
        frame.draw_rect_outline(0, 0, 4, 4, 1, RED);
        assert_eq!(frame.pixel(0, 0), Some(RED));
        assert_eq!(frame.pixel(4, 2), Some(RED));
        assert_eq!(frame.pixel(2, 2), Some([0, 0, 0, 0]));
    }
}
