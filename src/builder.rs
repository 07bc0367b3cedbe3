//! Flushes a [`ReportDocument`] into PDF bytes with `genpdf`.

use std::fs;
use std::path::{Path, PathBuf};

use genpdf::elements::{Break, BulletPoint, Paragraph};
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{self, Style};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, PaperSize, Position};
use log::info;

use crate::elements::ChartFigure;
use crate::error::{PdfBuildError, ReportError};
use crate::fonts;
use crate::model::{Block, ChartBlock, ReportDocument, RichParagraph};
use crate::richtext::MUTED;

const BODY_FONT_SIZE: u8 = 11;
const FOOTER_FONT_SIZE: u8 = 8;
const FOOTER_HEIGHT_MM: f64 = 10.0;
const PAGE_MARGIN_MM: f64 = 15.0;

/// Rendered PDF bytes.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
}

impl RenderedPdf {
    /// Writes the bytes to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let path = path.as_ref();
        fs::write(path, &self.bytes).map_err(|source| ReportError::io(path, source))?;
        info!("Saved report to {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path.to_path_buf())
    }
}

/// Turns report content into an A4 `genpdf::Document`.
#[derive(Debug, Default)]
pub struct PdfBuilder {
    fonts_dir: Option<PathBuf>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory searched for the font family before the default locations.
    pub fn with_fonts_dir(mut self, dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = dir.into();
        self
    }

    /// Lays out every block of `report` in order and returns the PDF bytes.
    pub fn render(self, report: &ReportDocument) -> Result<RenderedPdf, PdfBuildError> {
        let font_family =
            fonts::default_font_family(self.fonts_dir.as_deref()).map_err(PdfBuildError::FontLoad)?;
        let mut document = genpdf::Document::new(font_family);
        document.set_title(report.title());
        document.set_font_size(BODY_FONT_SIZE);
        document.set_paper_size(PaperSize::A4);
        document.set_page_decorator(FooterDecorator::new(
            Margins::all(mm(PAGE_MARGIN_MM)),
            report.footer().to_string(),
        ));

        document.push(
            Paragraph::new(report.title())
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(20)),
        );
        document.push(Break::new(1));

        for block in report.blocks() {
            push_block(&mut document, block)?;
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;
        Ok(RenderedPdf { bytes })
    }
}

fn mm(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn paragraph(source: &RichParagraph) -> Paragraph {
    let mut paragraph = Paragraph::default();
    for span in source.spans() {
        paragraph.push(span.to_styled_string());
    }
    paragraph
}

fn caption(source: &RichParagraph) -> Paragraph {
    let base = Style::new().italic().with_color(MUTED);
    let mut caption = Paragraph::default();
    for span in source.spans() {
        let mut string = span.to_styled_string();
        string.style = base.and(string.style);
        caption.push(string);
    }
    caption
}

fn chart_figure(chart: &ChartBlock) -> Result<ChartFigure, PdfBuildError> {
    let figure = ChartFigure::from_path(chart.path(), chart.caption().map(caption)).map_err(
        |source| PdfBuildError::Image {
            path: chart.path().to_path_buf(),
            source,
        },
    )?;
    Ok(figure.with_width(chart.width_mm().map(mm)))
}

fn push_block(document: &mut genpdf::Document, block: &Block) -> Result<(), PdfBuildError> {
    match block {
        Block::Heading { text, level } => {
            let size = match level {
                1 => 16,
                2 => 13,
                _ => 12,
            };
            document.push(Break::new(0.5));
            document.push(Paragraph::new(text.as_str()).styled(Style::new().bold().with_font_size(size)));
        }
        Block::Paragraph(p) => document.push(paragraph(p)),
        Block::Bullet(p) => document.push(BulletPoint::new(paragraph(p)).with_bullet("•")),
        Block::Chart(chart) => {
            document.push(chart_figure(chart)?);
            document.push(Break::new(1));
        }
    }
    Ok(())
}

/// Applies the page margins and draws the running footer with the page number.
struct FooterDecorator {
    page: usize,
    margins: Margins,
    text: String,
}

impl FooterDecorator {
    fn new(margins: Margins, text: String) -> Self {
        Self {
            page: 0,
            margins,
            text,
        }
    }

    fn footer_line(&self) -> String {
        if self.text.is_empty() {
            format!("Page {}", self.page)
        } else {
            format!("{} · Page {}", self.text, self.page)
        }
    }
}

impl PageDecorator for FooterDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        area.add_margins(self.margins);

        let height = mm(FOOTER_HEIGHT_MM);
        let available = area.size().height;
        if height > available {
            return Err(Error::new(
                "Footer height exceeds available space",
                ErrorKind::InvalidData,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - height));
        let mut footer = Paragraph::new(self.footer_line())
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(FOOTER_FONT_SIZE).with_color(MUTED));
        let result = footer.render(context, footer_area, style)?;
        if result.has_more {
            return Err(Error::new(
                "Footer does not fit into the reserved space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - height);
        Ok(area)
    }
}
