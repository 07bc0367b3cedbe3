//! Styled text fragments for report paragraphs.
//!
//! A [`Span`] records the inline attributes the reports use (bold and a color) and
//! converts into a `genpdf` [`StyledString`] when the document is flushed.

use genpdf::style::{Color, Style, StyledString};

/// Accent used for growth figures.
pub const POSITIVE: Color = Color::Rgb(40, 120, 90);
/// Accent used for decline figures.
pub const NEGATIVE: Color = Color::Rgb(190, 60, 50);
/// Muted text for captions and legends.
pub const MUTED: Color = Color::Greyscale(100);

/// A run of text with inline styling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Span {
    text: String,
    bold: bool,
    color: Option<Color>,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Builds the `genpdf` representation of this span.
    pub fn to_styled_string(&self) -> StyledString {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        StyledString::new(self.text.clone(), style)
    }
}

/// Concatenates the text of `spans`, dropping styling.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}
