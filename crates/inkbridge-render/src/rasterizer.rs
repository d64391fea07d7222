//! tiny-skia implementation of the cutout rasterizer.
//!
//! Objects are painted back to front into a pixmap covering the requested
//! bounds, then the eraser stroke is cleared out of it and the result is
//! encoded as PNG.

use inkbridge_core::input::Stroke as EraserStroke;
use inkbridge_core::services::{CutoutRequest, RasterError, RasterImage, Rasterizer};
use inkbridge_core::shapes::{Image, Shape};
use kurbo::{BezPath, PathEl};
use peniko::Color;
use thiserror::Error;
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};

/// Errors raised while producing a raster.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate a {0}x{1} pixmap")]
    Allocation(u32, u32),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("image source is not embedded")]
    NotEmbedded,
}

impl From<RenderError> for RasterError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Allocation(width, height) => RasterError::EmptyArea(width, height),
            other => RasterError::Encode(other.to_string()),
        }
    }
}

/// CPU rasterizer backed by tiny-skia.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkiaRasterizer;

impl SkiaRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Paint the request into a pixmap without encoding it.
    pub fn render(&self, request: &CutoutRequest<'_>) -> Result<Pixmap, RenderError> {
        let width = request.bounds.width().ceil().max(0.0) as u32;
        let height = request.bounds.height().ceil().max(0.0) as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation(width, height))?;

        let origin = request.bounds.origin();
        let transform = Transform::from_translate(-origin.x as f32, -origin.y as f32);
        for shape in request.objects {
            draw_shape(&mut pixmap, shape, transform);
        }
        erase(&mut pixmap, request.eraser, transform);
        Ok(pixmap)
    }
}

impl Rasterizer for SkiaRasterizer {
    /// Text needs a font stack and linked images need fetching; neither is
    /// available here.
    fn can_paint(&self, shape: &Shape) -> bool {
        match shape {
            Shape::Textbox(_) | Shape::Glyph(_) => false,
            Shape::Image(image) => image.data().is_some(),
            _ => true,
        }
    }

    fn rasterize_cutout(&self, request: &CutoutRequest<'_>) -> Result<RasterImage, RasterError> {
        let pixmap = self.render(request)?;
        let png = encode_png(&pixmap)?;
        log::debug!(
            "rasterized {} objects into {}x{} ({} bytes)",
            request.objects.len(),
            pixmap.width(),
            pixmap.height(),
            png.len()
        );
        Ok(RasterImage {
            png,
            width: pixmap.width(),
            height: pixmap.height(),
        })
    }
}

fn draw_shape(pixmap: &mut Pixmap, shape: &Shape, transform: Transform) {
    match shape {
        Shape::Image(image) => {
            if let Err(err) = draw_image(pixmap, image, transform) {
                log::warn!("skipping image {} in raster: {err}", shape.id());
            }
        }
        // No font stack on this side; text never reaches the pixmap.
        Shape::Textbox(_) | Shape::Glyph(_) => {
            log::debug!("{} {} left out of raster", shape.kind_name(), shape.id());
        }
        _ => draw_vector(pixmap, shape, transform),
    }
}

fn draw_vector(pixmap: &mut Pixmap, shape: &Shape, transform: Transform) {
    let Some(path) = to_skia_path(&shape.to_path()) else {
        return;
    };
    let style = shape.style();
    if let Some(fill) = style.fill_with_opacity() {
        pixmap.fill_path(&path, &solid(fill), FillRule::Winding, transform, None);
    }
    if style.stroke_width > 0.0 {
        let stroke = round_stroke(style.stroke_width);
        pixmap.stroke_path(&path, &solid(style.stroke_with_opacity()), &stroke, transform, None);
    }
}

fn draw_image(pixmap: &mut Pixmap, image: &Image, transform: Transform) -> Result<(), RenderError> {
    let bytes = image.data().ok_or(RenderError::NotEmbedded)?;
    let source = decode_pixmap(&bytes)?;
    let scale_x = image.width * image.scale_x / f64::from(source.width());
    let scale_y = image.height * image.scale_y / f64::from(source.height());
    let placement = transform
        .pre_translate(image.position.x as f32, image.position.y as f32)
        .pre_scale(scale_x as f32, scale_y as f32);
    let paint = PixmapPaint {
        opacity: image.style.opacity.clamp(0.0, 1.0) as f32,
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, placement, None);
    Ok(())
}

/// Clear everything under the eraser stroke.
fn erase(pixmap: &mut Pixmap, eraser: &EraserStroke, transform: Transform) {
    let Some((first, rest)) = eraser.points.split_first() else {
        return;
    };
    let mut paint = Paint::default();
    paint.blend_mode = BlendMode::Clear;
    paint.anti_alias = true;

    if rest.is_empty() {
        let radius = (eraser.width / 2.0) as f32;
        if let Some(dot) = PathBuilder::from_circle(first.x as f32, first.y as f32, radius) {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
        }
        return;
    }

    let mut builder = PathBuilder::new();
    builder.move_to(first.x as f32, first.y as f32);
    for point in rest {
        builder.line_to(point.x as f32, point.y as f32);
    }
    if let Some(path) = builder.finish() {
        pixmap.stroke_path(&path, &paint, &round_stroke(eraser.width), transform, None);
    }
}

fn round_stroke(width: f64) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn solid(color: Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = true;
    paint
}

fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Decode any supported image format into a premultiplied pixmap.
fn decode_pixmap(bytes: &[u8]) -> Result<Pixmap, RenderError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation(width, height))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Encode a pixmap as an 8-bit RGBA PNG.
pub(crate) fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut png = Vec::new();
    let mut encoder = png::Encoder::new(&mut png, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkbridge_core::shapes::{Rectangle, SerializableColor, ShapeStyle};
    use kurbo::{Point, Rect};

    fn red() -> SerializableColor {
        SerializableColor::new(255, 0, 0, 255)
    }

    fn eraser(points: Vec<Point>, width: f64) -> EraserStroke {
        EraserStroke {
            points,
            width,
            color: SerializableColor::white(),
        }
    }

    fn decode(raster: &RasterImage) -> image::RgbaImage {
        image::load_from_memory(&raster.png).unwrap().to_rgba8()
    }

    #[test]
    fn test_cutout_clears_eraser_path() {
        let rect = Shape::Rect(
            Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0)
                .with_style(ShapeStyle::new(red(), 2.0).with_fill(Some(red()))),
        );
        let bounds = rect.painted_bounds();
        let stroke = eraser(vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)], 10.0);
        let objects = [rect];
        let raster = SkiaRasterizer::new()
            .rasterize_cutout(&CutoutRequest {
                objects: &objects,
                eraser: &stroke,
                bounds,
            })
            .unwrap();

        assert_eq!((raster.width, raster.height), (102, 102));
        let pixels = decode(&raster);
        assert_eq!(pixels.dimensions(), (102, 102));
        // Canvas (50, 50) is under the eraser.
        assert_eq!(pixels.get_pixel(51, 51).0[3], 0);
        // Canvas (50, 20) keeps the fill.
        assert_eq!(pixels.get_pixel(51, 21).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_fractional_bounds_round_up() {
        let stroke = eraser(Vec::new(), 10.0);
        let raster = SkiaRasterizer
            .rasterize_cutout(&CutoutRequest {
                objects: &[],
                eraser: &stroke,
                bounds: Rect::new(0.0, 0.0, 10.2, 4.5),
            })
            .unwrap();
        assert_eq!((raster.width, raster.height), (11, 5));
        assert!(raster.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_empty_area_is_an_error() {
        let stroke = eraser(vec![Point::new(5.0, 5.0)], 4.0);
        let err = SkiaRasterizer
            .rasterize_cutout(&CutoutRequest {
                objects: &[],
                eraser: &stroke,
                bounds: Rect::new(5.0, 5.0, 5.0, 20.0),
            })
            .unwrap_err();
        assert_eq!(err, RasterError::EmptyArea(0, 15));
    }

    #[test]
    fn test_embedded_image_is_scaled_into_place() {
        let mut blue = image::RgbaImage::new(2, 2);
        for pixel in blue.pixels_mut() {
            pixel.0 = [0, 0, 255, 255];
        }
        let mut bytes = Vec::new();
        blue.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let mut img = Image::new(Point::new(10.0, 10.0), Image::data_url("image/png", &bytes), 2, 2);
        img.scale_x = 5.0;
        img.scale_y = 5.0;
        let shape = Shape::Image(img);
        let stroke = eraser(vec![Point::new(200.0, 200.0)], 2.0);
        let objects = [shape];
        let raster = SkiaRasterizer
            .rasterize_cutout(&CutoutRequest {
                objects: &objects,
                eraser: &stroke,
                bounds: Rect::new(10.0, 10.0, 20.0, 20.0),
            })
            .unwrap();

        let pixels = decode(&raster);
        assert_eq!(pixels.dimensions(), (10, 10));
        assert_eq!(pixels.get_pixel(5, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_can_paint_vector_and_embedded_only() {
        let raster = SkiaRasterizer::new();
        let rect = Shape::Rect(Rectangle::new(Point::ZERO, 10.0, 10.0));
        let text = Shape::Textbox(inkbridge_core::shapes::Text::new(Point::ZERO, "serif", 12.0));
        let glyph = Shape::Glyph(inkbridge_core::shapes::Glyph::new(Point::ZERO, "*", 12.0));
        let linked = Shape::Image(Image::new(Point::ZERO, "https://example.com/a.png", 4, 4));
        let embedded = Shape::Image(Image::new(Point::ZERO, Image::data_url("image/png", &[1, 2]), 4, 4));

        assert!(raster.can_paint(&rect));
        assert!(raster.can_paint(&embedded));
        assert!(!raster.can_paint(&text));
        assert!(!raster.can_paint(&glyph));
        assert!(!raster.can_paint(&linked));
    }

    #[test]
    fn test_linked_image_is_skipped() {
        let shape = Shape::Image(Image::new(Point::ZERO, "https://example.com/a.png", 4, 4));
        let stroke = eraser(Vec::new(), 2.0);
        let objects = [shape];
        let raster = SkiaRasterizer
            .rasterize_cutout(&CutoutRequest {
                objects: &objects,
                eraser: &stroke,
                bounds: Rect::new(0.0, 0.0, 4.0, 4.0),
            })
            .unwrap();
        assert!(decode(&raster).pixels().all(|p| p.0[3] == 0));
    }
}
