//! Logical content of a report document.
//!
//! A [`ReportDocument`] is an ordered list of [`Block`]s plus the title and footer text. It
//! knows nothing about fonts, pages or cursor positions; [`crate::builder::PdfBuilder`] walks
//! the blocks once and hands them to `genpdf`. Keeping the content as plain data makes the
//! assembly order something tests can compare directly.

use std::path::{Path, PathBuf};

use crate::richtext::{plain_text, Span};

/// Paragraph made of styled spans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
}

impl RichParagraph {
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn text(&self) -> String {
        plain_text(&self.spans)
    }
}

/// A chart image embedded from disk, with an optional caption underneath.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartBlock {
    path: PathBuf,
    caption: Option<RichParagraph>,
    width_mm: Option<f64>,
}

impl ChartBlock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            caption: None,
            width_mm: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn caption(&self) -> Option<&RichParagraph> {
        self.caption.as_ref()
    }

    /// Rendered width in millimetres; the image keeps its aspect ratio.
    pub fn width_mm(&self) -> Option<f64> {
        self.width_mm
    }

    pub fn with_caption(mut self, caption: impl Into<Option<RichParagraph>>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_width_mm(mut self, width_mm: impl Into<Option<f64>>) -> Self {
        self.width_mm = width_mm.into();
        self
    }
}

/// One unit of report content.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Section heading; level 1 is the largest.
    Heading { text: String, level: u8 },
    Paragraph(RichParagraph),
    /// A bulleted line.
    Bullet(RichParagraph),
    Chart(ChartBlock),
}

impl Block {
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::Heading {
            text: text.into(),
            level,
        }
    }

    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }

    pub fn bullet(spans: impl Into<Vec<Span>>) -> Self {
        Self::Bullet(RichParagraph::new(spans))
    }

    /// Unstyled text of the block, if it has any.
    pub fn text(&self) -> Option<String> {
        match self {
            Block::Heading { text, .. } => Some(text.clone()),
            Block::Paragraph(p) | Block::Bullet(p) => Some(p.text()),
            Block::Chart(chart) => chart.caption().map(RichParagraph::text),
        }
    }
}

/// Ordered report content plus the text repeated on every page.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportDocument {
    title: String,
    footer: String,
    blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            footer: String::new(),
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Footer text; the page number is appended when rendered.
    pub fn footer(&self) -> &str {
        &self.footer
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn heading(&mut self, text: impl Into<String>, level: u8) -> &mut Self {
        self.push(Block::heading(text, level))
    }

    pub fn paragraph(&mut self, spans: impl Into<Vec<Span>>) -> &mut Self {
        self.push(Block::paragraph(spans))
    }

    pub fn bullet(&mut self, spans: impl Into<Vec<Span>>) -> &mut Self {
        self.push(Block::bullet(spans))
    }

    pub fn chart(&mut self, chart: ChartBlock) -> &mut Self {
        self.push(Block::Chart(chart))
    }

    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Chart(chart) => Some(chart),
            _ => None,
        })
    }

    /// Every line of text in document order.
    pub fn text_lines(&self) -> Vec<String> {
        self.blocks.iter().filter_map(Block::text).collect()
    }
}
