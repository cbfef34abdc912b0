//! Guideline overlay for visual inspection.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::guideline::Guidelines;
use crate::types::Point;

/// Where the tolerance scale bar starts.
const SCALE_BAR_ORIGIN: Point = Point::new(10.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub line_color: Rgba<u8>,
    pub thickness: u32,
    /// Length of a horizontal reference bar drawn near the top-left corner,
    /// usually the classifier tolerance. `None` skips it.
    pub scale_bar: Option<f32>,
    pub scale_bar_color: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_color: Rgba([0, 255, 0, 255]),
            thickness: 4,
            scale_bar: Some(40.0),
            scale_bar_color: Rgba([0, 0, 255, 255]),
        }
    }
}

/// Draw a segment `thickness` pixels wide by stacking parallel one-pixel lines.
fn draw_thick_line(canvas: &mut RgbaImage, start: Point, end: Point, thickness: u32, color: Rgba<u8>) {
    let dir = end - start;
    let len = (dir.x * dir.x + dir.y * dir.y).sqrt();
    let normal = if len > 0.0 {
        Point::new(-dir.y / len, dir.x / len)
    } else {
        Point::new(0.0, 1.0)
    };

    let thickness = thickness.max(1);
    let half = (thickness - 1) as f32 / 2.0;
    for i in 0..thickness {
        let shift = normal * (i as f32 - half);
        let a = start + shift;
        let b = end + shift;
        draw_line_segment_mut(canvas, (a.x, a.y), (b.x, b.y), color);
    }
}

/// Paint the four guidelines (and the scale bar) onto `canvas`.
pub fn draw_guidelines(canvas: &mut RgbaImage, guidelines: &Guidelines, style: &OverlayStyle) {
    for line in guidelines.iter() {
        draw_thick_line(canvas, line.start, line.end, style.thickness, style.line_color);
    }

    if let Some(length) = style.scale_bar {
        let end = SCALE_BAR_ORIGIN + Point::new(length, 0.0);
        draw_thick_line(
            canvas,
            SCALE_BAR_ORIGIN,
            end,
            style.thickness,
            style.scale_bar_color,
        );
    }
}

/// Copy `image` to RGBA and draw the guidelines on the copy.
pub fn render_overlay(image: &DynamicImage, guidelines: &Guidelines, style: &OverlayStyle) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    draw_guidelines(&mut canvas, guidelines, style);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::ChinContour;

    fn guidelines() -> Guidelines {
        let mut points = vec![Point::zero(); 17];
        points[2] = Point::new(40.0, 100.0);
        points[14] = Point::new(160.0, 100.0);
        points[4] = Point::new(60.0, 150.0);
        points[12] = Point::new(140.0, 150.0);
        points[8] = Point::new(100.0, 190.0);
        Guidelines::extract(&ChinContour::new(&points).unwrap(), 50.0)
    }

    #[test]
    fn lines_and_scale_bar_are_painted() {
        let style = OverlayStyle::default();
        let image = DynamicImage::new_rgba8(200, 200);
        let canvas = render_overlay(&image, &guidelines(), &style);

        // forehead, ear, jaw and face length midpoints
        assert_eq!(*canvas.get_pixel(100, 50), style.line_color);
        assert_eq!(*canvas.get_pixel(70, 100), style.line_color);
        assert_eq!(*canvas.get_pixel(100, 150), style.line_color);
        assert_eq!(*canvas.get_pixel(100, 120), style.line_color);
        // scale bar
        assert_eq!(*canvas.get_pixel(30, 10), style.scale_bar_color);
        // untouched background
        assert_eq!(*canvas.get_pixel(5, 195), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn thickness_spreads_across_the_line() {
        let style = OverlayStyle {
            thickness: 3,
            scale_bar: None,
            ..Default::default()
        };
        let mut canvas = RgbaImage::new(200, 200);
        draw_guidelines(&mut canvas, &guidelines(), &style);

        // forehead line at y = 50 covers y = 49..=51
        assert_eq!(*canvas.get_pixel(120, 49), style.line_color);
        assert_eq!(*canvas.get_pixel(120, 51), style.line_color);
        assert_eq!(*canvas.get_pixel(120, 53), Rgba([0, 0, 0, 0]));
        // no scale bar
        assert_eq!(*canvas.get_pixel(30, 10), Rgba([0, 0, 0, 0]));
    }
}
