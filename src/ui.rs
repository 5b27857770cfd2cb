use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
};

use crate::app::App;
use crate::conditional::ConditionalDisplay;
use crate::focus::{FocusId, Part, WidgetId};
use crate::multiselect::{ItemRow, MultiSelectView};
use crate::theme::Theme;

/// Rows taken by the toggle surface: two text lines plus borders. The menu
/// below it has no top border and takes one row per item plus one.
const TOGGLE_HEIGHT: u16 = 4;

/// One row per item plus the bottom border, clamped to the terminal range.
fn menu_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(1)
}

/// Screen regions of the last render, used to route pointer events.
#[derive(Debug, Clone, Default)]
pub struct HitRegions {
    regions: Vec<(Rect, FocusId)>,
}

impl HitRegions {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, rect: Rect, target: FocusId) {
        if rect.area() > 0 {
            self.regions.push((rect, target));
        }
    }

    /// Topmost region under the cell at `column`, `row`.
    pub fn hit(&self, column: u16, row: u16) -> Option<FocusId> {
        self.regions
            .iter()
            .rev()
            .find(|(rect, _)| {
                column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
            })
            .map(|(_, target)| *target)
    }
}

/// Draws a multi-select from its view model and records its hit regions.
pub struct MultiSelectWidget<'a> {
    id: WidgetId,
    view: &'a MultiSelectView,
    theme: &'a Theme,
    focused: Option<Part>,
}

impl<'a> MultiSelectWidget<'a> {
    pub fn new(id: WidgetId, view: &'a MultiSelectView, theme: &'a Theme) -> Self {
        Self {
            id,
            view,
            theme,
            focused: None,
        }
    }

    /// Part of this widget holding focus, if any.
    pub fn focused(mut self, part: Option<Part>) -> Self {
        self.focused = part;
        self
    }

    /// Rows needed to draw everything without clipping.
    pub fn height(&self) -> u16 {
        let menu = self.view.menu.as_ref().map(|rows| menu_height(rows.len())).unwrap_or(0);
        (1 + TOGGLE_HEIGHT).saturating_add(menu)
    }

    fn target(&self, part: Part) -> FocusId {
        FocusId::new(self.id, part)
    }

    fn button_style(&self, part: Part, base: Style) -> Style {
        if self.focused == Some(part) {
            base.patch(self.theme.button_focused)
        } else {
            base
        }
    }

    fn render_toggle(&self, area: Rect, buf: &mut Buffer, hits: &mut HitRegions) {
        let view = self.view;
        let theme = self.theme;

        let border = if self.focused == Some(Part::Toggle) {
            theme.focus_border
        } else if view.is_open {
            theme.open_border
        } else {
            theme.blurred_border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        block.render(area, buf);
        hits.push(area, self.target(Part::Toggle));

        let buttons = view.actions.as_ref().map(|row| {
            (
                Span::raw(format!("[ {} ]", row.primary.label())),
                row.primary.part(),
                Span::raw(format!("[ {} ]", row.done_text)),
            )
        });
        let controls_width = match &buttons {
            Some((primary, _, done)) => (primary.width() + 1 + done.width()) as u16,
            None => 1,
        };

        let [text_area, controls_area] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(controls_width)]).areas(inner);
        let [count_area, summary_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(text_area);

        Paragraph::new(view.count_text.as_str())
            .style(theme.count)
            .render(count_area, buf);
        ConditionalDisplay::new(
            Paragraph::new(view.summary.clone().unwrap_or_default()).style(theme.summary),
        )
        .display(view.summary.is_some())
        .render(summary_area, buf);

        match buttons {
            Some((primary, primary_part, done)) => {
                let primary_rect = Rect {
                    width: (primary.width() as u16).min(controls_area.width),
                    height: 1,
                    ..controls_area
                };
                let done_x = primary_rect.right() + 1;
                let done_rect = Rect {
                    x: done_x,
                    y: controls_area.y,
                    width: (done.width() as u16).min(controls_area.right().saturating_sub(done_x)),
                    height: 1,
                };
                Paragraph::new(primary)
                    .style(self.button_style(primary_part, theme.button))
                    .render(primary_rect, buf);
                Paragraph::new(done)
                    .style(self.button_style(Part::Done, theme.button_primary))
                    .render(done_rect, buf);
                hits.push(primary_rect, self.target(primary_part));
                hits.push(done_rect, self.target(Part::Done));
            }
            None => {
                let disclosure = Rect { height: 1, ..controls_area };
                ConditionalDisplay::new(Paragraph::new("▾").style(theme.disclosure))
                    .display(view.disclosure)
                    .render(disclosure, buf);
                if view.disclosure {
                    hits.push(disclosure, self.target(Part::Disclosure));
                }
            }
        }
    }

    fn render_menu(&self, rows: &[ItemRow], area: Rect, buf: &mut Buffer, hits: &mut HitRegions) {
        let theme = self.theme;
        let height = menu_height(rows.len()).min(area.height);
        let menu_area = Rect { height, ..area };
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_style(theme.menu_border);
        let inner = block.inner(menu_area);
        block.render(menu_area, buf);
        hits.push(menu_area, self.target(Part::Menu));

        let visible = inner.height as usize;
        if visible == 0 {
            return;
        }
        // Keep the focused row, or failing that the highlighted one, on screen.
        let anchor = match self.focused {
            Some(Part::Item(index)) => Some(index),
            _ => rows.iter().position(|r| r.highlighted),
        };
        let offset = anchor
            .filter(|a| *a >= visible)
            .map(|a| a + 1 - visible)
            .unwrap_or(0);

        for (slot, row) in rows.iter().skip(offset).take(visible).enumerate() {
            let row_area = Rect {
                y: inner.y + slot as u16,
                height: 1,
                ..inner
            };
            let focused = self.focused == Some(Part::Item(row.index));
            let mut style = if row.active { theme.item_active } else { theme.item };
            if row.highlighted {
                style = style.patch(theme.item_highlight);
            }
            if focused {
                style = style.patch(theme.item_focused);
            }
            let line = Line::from(vec![
                Span::raw(if focused { "› " } else { "  " }),
                Span::raw(if row.active { "[x] " } else { "[ ] " }),
                Span::raw(row.content.as_str()),
            ]);
            Paragraph::new(line).style(style).render(row_area, buf);
            hits.push(row_area, self.target(Part::Item(row.index)));
        }
    }
}

impl StatefulWidget for MultiSelectWidget<'_> {
    type State = HitRegions;

    fn render(self, area: Rect, buf: &mut Buffer, hits: &mut HitRegions) {
        let [label_area, toggle_area, menu_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(TOGGLE_HEIGHT),
            Constraint::Min(0),
        ])
        .areas(area);

        Paragraph::new(self.view.label.as_str())
            .style(self.theme.label)
            .render(label_area, buf);
        self.render_toggle(toggle_area, buf, hits);

        if let Some(rows) = &self.view.menu {
            self.render_menu(rows, menu_area, buf, hits);
        }
    }
}

/// Renders the demo screen: the multi-select, the submit control, the status
/// line and the footer.
pub fn render_app(f: &mut Frame, app: &mut App) {
    let area = centered_rect(70, 100, f.area());
    let view = app.handle.lock().view();
    let focus = app.focus.active();
    let widget_id = app.widget_id();
    let widget_focus = focus.filter(|fid| fid.widget == widget_id).map(|fid| fid.part);

    let widget = MultiSelectWidget::new(widget_id, &view, &app.theme).focused(widget_focus);
    let widget_height = widget.height();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(widget_height),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);

    app.hits.clear();
    f.render_stateful_widget(widget, chunks[0], &mut app.hits);

    let submit_id = app.submit_id();
    let submit_focused = focus == Some(submit_id);
    let submit_rect = Rect { width: 12.min(chunks[2].width), ..chunks[2] };
    let submit = Paragraph::new("Submit")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .style(if submit_focused { app.theme.control_focused } else { app.theme.control });
    f.render_widget(submit, submit_rect);
    app.hits.push(submit_rect, submit_id);

    let status = Paragraph::new(app.status())
        .wrap(Wrap { trim: true })
        .style(app.theme.status);
    f.render_widget(status, chunks[3]);

    let footer = Paragraph::new(
        "Tab/Shift+Tab Focus | Enter/Space Toggle | ↑/↓ Highlight | Esc Close | s Save selection (on Submit) | q Quit (on Submit) | Ctrl+C Quit",
    )
    .block(Block::default().borders(Borders::ALL))
    .style(app.theme.footer);
    f.render_widget(footer, chunks[4]);
}

/// Centers a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Percentage((100-percent_y)/2), Constraint::Percentage(percent_y), Constraint::Percentage((100-percent_y)/2)]).split(r)[1];
    Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Percentage((100-percent_x)/2), Constraint::Percentage(percent_x), Constraint::Percentage((100-percent_x)/2)]).split(vertical)[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdRecord, SelectableItem};
    use crate::multiselect::{MultiSelect, MultiSelectProps};

    fn rows(buf: &Buffer) -> Vec<String> {
        buf.content
            .chunks(buf.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn widget(initial: &[i64]) -> MultiSelect {
        let items = vec![
            SelectableItem::new("1", "Apple"),
            SelectableItem::new("2", "Banana"),
        ];
        let mut props = MultiSelectProps::new("Fruit");
        props.initial_selected_item_list = initial.iter().map(|id| IdRecord::new(*id)).collect();
        MultiSelect::builder(props, items).mount(|_| {})
    }

    fn draw(widget: &MultiSelect, focused: Option<Part>) -> (Vec<String>, HitRegions) {
        let view = widget.view();
        let theme = Theme::default();
        let ui = MultiSelectWidget::new(widget.id(), &view, &theme).focused(focused);
        let area = Rect::new(0, 0, 40, ui.height());
        let mut buf = Buffer::empty(area);
        let mut hits = HitRegions::default();
        ui.render(area, &mut buf, &mut hits);
        (rows(&buf), hits)
    }

    #[test]
    fn closed_toggle_shows_count_summary_and_disclosure() {
        let ms = widget(&[1]);
        let (lines, hits) = draw(&ms, None);

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Fruit"));
        assert!(lines[2].contains("1 selected"));
        assert!(lines[2].contains('▾'));
        assert!(lines[3].contains("Apple"));
        assert!(!lines.iter().any(|l| l.contains("Done")));

        let toggle = hits.hit(5, 2).expect("toggle region");
        assert_eq!(toggle.part, Part::Toggle);
    }

    #[test]
    fn empty_selection_reads_zero_selected() {
        let ms = widget(&[]);
        let (lines, _) = draw(&ms, None);
        assert!(lines[2].contains("0 selected"));
        assert!(lines[3].trim_matches(|c| c == '│' || c == ' ').is_empty());
    }

    #[test]
    fn open_menu_shows_actions_and_rows() {
        let mut ms = widget(&[]);
        ms.open_menu();
        let (lines, hits) = draw(&ms, Some(Part::Item(1)));

        assert_eq!(lines.len(), 5 + 3);
        assert!(lines[2].contains("[ Select All ]"));
        assert!(lines[2].contains("[ Done ]"));
        assert!(lines[5].contains("[ ] Apple"));
        assert!(lines[6].contains("› [ ] Banana"));

        let item = hits.hit(10, 6).expect("item region");
        assert_eq!(item.part, Part::Item(1));
        let done_column = lines[2].find("[ Done ]").map(|byte| lines[2][..byte].chars().count()).unwrap();
        assert_eq!(hits.hit(done_column as u16 + 2, 2).map(|t| t.part), Some(Part::Done));
    }

    #[test]
    fn huge_menus_clamp_their_height() {
        let items = (0..u16::MAX as usize + 10)
            .map(|n| SelectableItem::new(n.to_string(), format!("Row {n}")))
            .collect();
        let mut ms = MultiSelect::builder(MultiSelectProps::new("Many"), items).mount(|_| {});
        ms.open_menu();
        let view = ms.view();
        let theme = Theme::default();
        let ui = MultiSelectWidget::new(ms.id(), &view, &theme);
        assert_eq!(ui.height(), u16::MAX);

        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        let mut hits = HitRegions::default();
        ui.render(area, &mut buf, &mut hits);
        assert!(rows(&buf)[5].contains("Row 0"));
        assert_eq!(hits.hit(5, 10).map(|t| t.part), Some(Part::Item(5)));
    }

    #[test]
    fn clear_all_replaces_select_all_once_something_is_selected() {
        let mut ms = widget(&[2]);
        ms.open_menu();
        let (lines, _) = draw(&ms, None);
        assert!(lines[2].contains("[ Clear All ]"));
        assert!(lines[6].contains("[x] Banana"));
    }
}
