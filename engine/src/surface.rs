//! The software framebuffer applications draw into each tick.
//!
//! A [`Framebuffer`] is a fixed-size, row-major grid of [`Color`]s. Drawing
//! happens either through the one-shot [`Framebuffer::fill`] or through the
//! [`Graphics`] context, whose pen color survives between calls.

/// A packed `0x00RRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);
    pub const RED: Color = Color(0xFF0000);
    pub const GREEN: Color = Color(0x00FF00);
    pub const BLUE: Color = Color(0x0000FF);
    pub const GRAY: Color = Color(0x808080);
    pub const YELLOW: Color = Color(0xFFFF00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), 0xFF]
    }
}

#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    pen: Color,
}

impl Framebuffer {
    /// Allocates a black buffer. The size is fixed for the buffer's lifetime.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
            pen: Color::WHITE,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Fills the `w`×`h` rectangle whose top-left corner is `(x, y)`.
    ///
    /// The rectangle is clipped to the buffer; a non-positive width or height
    /// draws nothing. The pen color of [`graphics`](Self::graphics) is left as is.
    pub fn fill(&mut self, x: i32, y: i32, h: i32, w: i32, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color);
        }
    }

    /// Returns the drawing context for this buffer.
    pub fn graphics(&mut self) -> Graphics<'_> {
        Graphics { target: self }
    }

    /// Copies the buffer into an RGBA8 frame of the same dimensions.
    pub fn write_rgba(&self, frame: &mut [u8]) {
        for (dst, src) in frame.chunks_exact_mut(4).zip(&self.pixels) {
            dst.copy_from_slice(&src.to_rgba());
        }
    }

    /// Overwrites this buffer with `other` when both have the same size.
    pub fn copy_from(&mut self, other: &Framebuffer) {
        if self.width == other.width && self.height == other.height {
            self.pixels.copy_from_slice(&other.pixels);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
        if w <= 0 || h <= 0 {
            return None;
        }
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(w)).min(i64::from(self.width));
        let y1 = (i64::from(y) + i64::from(h)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

/// A drawing context borrowed from a [`Framebuffer`].
///
/// The current color lives in the framebuffer itself, so a color set through
/// one `Graphics` is still active the next time `graphics()` is called.
pub struct Graphics<'a> {
    target: &'a mut Framebuffer,
}

impl Graphics<'_> {
    pub fn color(&self) -> Color {
        self.target.pen
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.target.pen = color;
        self
    }

    pub fn plot(&mut self, x: i32, y: i32) -> &mut Self {
        let pen = self.target.pen;
        self.target.set_pixel(x, y, pen);
        self
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) -> &mut Self {
        let pen = self.target.pen;
        self.target.fill(x, y, h, w, pen);
        self
    }

    /// Outlines the rectangle spanning `x..=x + w` and `y..=y + h`.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32) -> &mut Self {
        if w < 0 || h < 0 {
            return self;
        }
        self.draw_line(x, y, x + w, y)
            .draw_line(x + w, y, x + w, y + h)
            .draw_line(x + w, y + h, x, y + h)
            .draw_line(x, y + h, x, y)
    }

    /// Bresenham line between both endpoints, inclusive, clipped per pixel.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> &mut Self {
        let (mut x, mut y) = (i64::from(x0), i64::from(y0));
        let (x1, y1) = (i64::from(x1), i64::from(y1));
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let pen = self.target.pen;

        loop {
            if let (Ok(px), Ok(py)) = (i32::try_from(x), i32::try_from(y)) {
                self.target.set_pixel(px, py, pen);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        self
    }

    /// Outlines the closed polygon through `points`.
    pub fn draw_polygon(&mut self, points: &[(i32, i32)]) -> &mut Self {
        match points {
            [] => {}
            [(x, y)] => {
                self.plot(*x, *y);
            }
            _ => {
                for pair in points.windows(2) {
                    self.draw_line(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
                }
                let (first, last) = (points[0], points[points.len() - 1]);
                self.draw_line(last.0, last.1, first.0, first.1);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(fb: &Framebuffer, color: Color) -> usize {
        fb.pixels().iter().filter(|&&c| c == color).count()
    }

    #[test]
    fn test_new_buffer_is_black() {
        let fb = Framebuffer::new(7, 3);
        assert_eq!(fb.pixels().len(), 21);
        assert_eq!(count(&fb, Color::BLACK), 21);
    }

    #[test]
    fn test_fill_touches_exactly_the_rectangle() {
        let mut fb = Framebuffer::new(16, 12);
        fb.clear(Color::BLUE);
        let before = fb.clone();

        fb.fill(3, 2, 4, 5, Color::RED);

        for y in 0..12 {
            for x in 0..16 {
                let inside = (3..8).contains(&x) && (2..6).contains(&y);
                let expected = if inside { Color::RED } else { before.pixel(x, y).unwrap() };
                assert_eq!(fb.pixel(x, y), Some(expected), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_fill_is_clipped() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill(-2, -2, 4, 4, Color::GREEN);
        assert_eq!(count(&fb, Color::GREEN), 4);

        fb.fill(3, 3, 100, 100, Color::RED);
        assert_eq!(fb.pixel(3, 3), Some(Color::RED));
        assert_eq!(count(&fb, Color::RED), 1);

        fb.fill(10, 10, 2, 2, Color::WHITE);
        fb.fill(0, 0, 0, 3, Color::WHITE);
        fb.fill(0, 0, 3, -1, Color::WHITE);
        assert_eq!(count(&fb, Color::WHITE), 0);
    }

    #[test]
    fn test_fill_keeps_pen_color() {
        let mut fb = Framebuffer::new(4, 4);
        fb.graphics().set_color(Color::YELLOW);
        fb.fill(0, 0, 1, 1, Color::RED);
        assert_eq!(fb.graphics().color(), Color::YELLOW);
    }

    #[test]
    fn test_pen_color_persists_between_contexts() {
        let mut fb = Framebuffer::new(4, 4);
        fb.graphics().set_color(Color::GREEN);
        fb.graphics().fill_rect(0, 0, 2, 2);
        assert_eq!(count(&fb, Color::GREEN), 4);
    }

    #[test]
    fn test_draw_line_endpoints_and_clipping() {
        let mut fb = Framebuffer::new(5, 5);
        fb.graphics().set_color(Color::WHITE).draw_line(0, 0, 4, 4);
        for i in 0..5 {
            assert_eq!(fb.pixel(i, i), Some(Color::WHITE));
        }
        assert_eq!(count(&fb, Color::WHITE), 5);

        let mut fb = Framebuffer::new(5, 5);
        fb.graphics().draw_line(-3, 2, 8, 2);
        assert_eq!(count(&fb, Color::WHITE), 5);
    }

    #[test]
    fn test_draw_rect_outline() {
        let mut fb = Framebuffer::new(6, 6);
        fb.graphics().draw_rect(1, 1, 3, 3);
        assert_eq!(count(&fb, Color::WHITE), 12);
        assert_eq!(fb.pixel(2, 2), Some(Color::BLACK));
    }

    #[test]
    fn test_draw_polygon_closes_outline() {
        let mut fb = Framebuffer::new(8, 8);
        fb.graphics().draw_polygon(&[(0, 0), (4, 0), (0, 4)]);
        assert_eq!(fb.pixel(4, 0), Some(Color::WHITE));
        assert_eq!(fb.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(fb.pixel(0, 2), Some(Color::WHITE));
        assert_eq!(fb.pixel(3, 3), Some(Color::BLACK));
    }

    #[test]
    fn test_write_rgba() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set_pixel(1, 0, Color::rgb(1, 2, 3));
        let mut frame = [0u8; 8];
        fb.write_rgba(&mut frame);
        assert_eq!(frame, [0, 0, 0, 255, 1, 2, 3, 255]);
    }
}
