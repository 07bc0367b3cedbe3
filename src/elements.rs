//! Custom `genpdf` elements used by the report builder.

use std::path::Path;

use image::GenericImageView;

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const CAPTION_SPACING_MM: f64 = 2.0;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Natural size of a chart image at the DPI `genpdf` assumes.
fn natural_size(image: &image::DynamicImage) -> Size {
    let (px_width, px_height) = image.dimensions();
    Size::new(
        mm_from_f64(MM_PER_INCH * f64::from(px_width) / IMAGE_DPI),
        mm_from_f64(MM_PER_INCH * f64::from(px_height) / IMAGE_DPI),
    )
}

fn load_chart_image(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    image::open(path).with_context(|| format!("Failed to decode chart image {}", path.display()))
}

/// A centred chart image with its caption stacked underneath.
///
/// The figure is placed as a unit: when the image and the first caption line do not fit in
/// the remaining area, nothing is drawn and the whole figure moves to the next page.
pub struct ChartFigure {
    image: Image,
    caption: Option<Paragraph>,
    natural_size: Size,
    target_width: Option<Mm>,
    spacing: Mm,
}

impl ChartFigure {
    pub fn from_dynamic_image(
        image: image::DynamicImage,
        caption: Option<Paragraph>,
    ) -> Result<Self, Error> {
        let natural_size = natural_size(&image);
        let image = Image::from_dynamic_image(image)?;
        Ok(Self {
            image,
            caption,
            natural_size,
            target_width: None,
            spacing: mm_from_f64(CAPTION_SPACING_MM),
        })
    }

    pub fn from_path(path: impl AsRef<Path>, caption: Option<Paragraph>) -> Result<Self, Error> {
        Self::from_dynamic_image(load_chart_image(path)?, caption)
    }

    /// Scales the image to `width` while keeping the aspect ratio.
    pub fn with_width(mut self, width: impl Into<Option<Mm>>) -> Self {
        self.target_width = width.into();
        self
    }

    fn scale(&self) -> f64 {
        let natural_width = mm_to_f64(self.natural_size.width);
        match self.target_width {
            Some(width) if natural_width > f64::EPSILON => mm_to_f64(width) / natural_width,
            _ => 1.0,
        }
    }

    /// Height the image and the first caption line need before anything is drawn.
    fn required_height(&self, caption_line: Mm) -> Mm {
        let image_height = mm_to_f64(self.natural_size.height) * self.scale();
        let caption_height = match self.caption {
            Some(_) => mm_to_f64(self.spacing) + mm_to_f64(caption_line),
            None => 0.0,
        };
        mm_from_f64(image_height + caption_height)
    }
}

impl Element for ChartFigure {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let caption_line = style.line_height(&context.font_cache);
        if self.required_height(caption_line) > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let scale = self.scale();
        self.image.set_scale(Scale::new(scale, scale));
        self.image.set_alignment(Alignment::Center);

        let image_result = self.image.render(context, area.clone(), style)?;
        result.size = result.size.stack_vertical(image_result.size);
        result.has_more |= image_result.has_more;
        if result.has_more {
            return Ok(result);
        }

        if let Some(caption) = self.caption.as_mut() {
            caption.set_alignment(Alignment::Center);
            area.add_offset(Position::new(0, image_result.size.height + self.spacing));
            result.size = result.size.stack_vertical(Size::new(0, self.spacing));

            let caption_result = caption.render(context, area, style)?;
            result.size = result.size.stack_vertical(caption_result.size);
            result.has_more |= caption_result.has_more;
        }

        Ok(result)
    }
}
