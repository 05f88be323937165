use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;
use text_size::TextSize;

/// A recovered syntax error: what went wrong and the offending bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    /// Moves the range by a signed byte delta, after an edit earlier in the text.
    pub fn shifted(&self, delta: i64) -> Self {
        let shift = |offset: TextSize| TextSize::new((i64::from(u32::from(offset)) + delta) as u32);
        let range = TextRange::new(shift(self.range.start()), shift(self.range.end()));
        Self { message: self.message.clone(), range }
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}
