use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Renders its child when `display` is set, nothing otherwise.
///
/// `display` defaults to `true`.
#[derive(Debug, Clone)]
pub struct ConditionalDisplay<T> {
    display: bool,
    child: T,
}

impl<T> ConditionalDisplay<T> {
    pub fn new(child: T) -> Self {
        Self { display: true, child }
    }

    pub fn display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    pub fn is_displayed(&self) -> bool {
        self.display
    }

    pub fn into_option(self) -> Option<T> {
        self.display.then_some(self.child)
    }
}

impl<T> From<ConditionalDisplay<T>> for Option<T> {
    fn from(c: ConditionalDisplay<T>) -> Self {
        c.into_option()
    }
}

impl<T: Widget> Widget for ConditionalDisplay<T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.display {
            self.child.render(area, buf);
        }
    }
}
