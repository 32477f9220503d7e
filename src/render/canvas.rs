use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use image::{Rgb, RgbImage};

/// RGB888 raster the dashboard is drawn into
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb888) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, to_rgb(background)),
        }
    }

    /// Filled rectangle with inclusive corners
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb888) {
        let _ = Rectangle::with_corners(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self);
    }

    pub fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb888) {
        let _ = Line::new(Point::new(from.0, from.1), Point::new(to.0, to.1))
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self);
    }

    pub fn dot(&mut self, x: i32, y: i32, diameter: u32, color: Rgb888) {
        let _ = Circle::new(Point::new(x, y), diameter)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self);
    }

    /// Draw `text` with its top-left at `(x, y)`; returns the x after the last glyph
    pub fn text(&mut self, text: &str, x: i32, y: i32, font: &MonoFont<'_>, color: Rgb888) -> i32 {
        let style = MonoTextStyle::new(font, color);
        match Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(self) {
            Ok(next) => next.x,
            Err(never) => match never {},
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let p = self.image.get_pixel(x, y);
        Some(Rgb888::new(p[0], p[1], p[2]))
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

fn to_rgb(color: Rgb888) -> Rgb<u8> {
    Rgb([color.r(), color.g(), color.b()])
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.image.dimensions();
        for Pixel(coord, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(coord.x), u32::try_from(coord.y)) else {
                continue;
            };
            if x < w && y < h {
                self.image.put_pixel(x, y, to_rgb(color));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_inclusive_and_clipped() {
        let mut c = Canvas::new(10, 10, Rgb888::BLACK);
        c.fill_rect(8, 8, 12, 12, Rgb888::RED);
        assert_eq!(c.pixel(8, 8), Some(Rgb888::RED));
        assert_eq!(c.pixel(9, 9), Some(Rgb888::RED));
        assert_eq!(c.pixel(7, 7), Some(Rgb888::BLACK));
        assert_eq!(c.pixel(10, 10), None);
    }

    #[test]
    fn text_advances_by_glyph_width() {
        let mut c = Canvas::new(100, 20, Rgb888::BLACK);
        let end = c.text("abc", 5, 0, &embedded_graphics::mono_font::ascii::FONT_6X10, Rgb888::WHITE);
        assert_eq!(end, 5 + 3 * 6);
    }
}
