use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub focus_border: Color,
    pub open_border: Color,
    pub blurred_border: Color,

    // Specific parts
    pub label: Style,
    pub count: Style,
    pub summary: Style,
    pub button: Style,
    pub button_primary: Style,
    pub button_focused: Style,
    pub disclosure: Style,
    pub menu_border: Style,
    pub item: Style,
    pub item_active: Style,
    pub item_highlight: Style,
    pub item_focused: Style,
    pub control: Style,
    pub control_focused: Style,
    pub status: Style,
    pub footer: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            open_border: Color::Blue,
            blurred_border: Color::DarkGray,

            label: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            count: Style::default().fg(Color::White),
            summary: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            button: Style::default().fg(Color::Yellow),
            button_primary: Style::default().fg(Color::Black).bg(Color::Cyan),
            button_focused: Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            disclosure: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            menu_border: Style::default().fg(Color::Blue),
            item: Style::default().fg(Color::White),
            item_active: Style::default().fg(Color::White).bg(Color::Rgb(0, 172, 202)),
            item_highlight: Style::default().bg(Color::Rgb(40, 70, 76)),
            item_focused: Style::default().add_modifier(Modifier::BOLD),
            control: Style::default().fg(Color::Green),
            control_focused: Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
            status: Style::default().fg(Color::Gray),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        }
    }
}
