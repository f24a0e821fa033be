use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::menu::{SceneItem, StepEntry};

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    }
}

pub struct HeaderBar<'a> {
    pub name: &'a str,
    pub progress: &'a str,
    pub finished: bool,
}

impl HeaderBar<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.name),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(self.progress, Style::default().fg(Color::White)),
        ];
        if self.finished {
            spans.push(Span::styled(
                "  finished",
                Style::default().fg(Color::Green),
            ));
        }

        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, area);
    }
}

/// The active step's text and what it is waiting on
pub struct StepPanel<'a> {
    pub description: &'a str,
    pub waiting_on: &'a [String],
}

impl StepPanel<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            self.description,
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        if !self.waiting_on.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Waiting on:",
                Style::default().fg(Color::Gray),
            )));
            for kind in self.waiting_on {
                lines.push(Line::from(vec![
                    Span::styled("  • ", Style::default().fg(Color::Yellow)),
                    Span::raw(kind.as_str()),
                ]));
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title(" Step ").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

/// Quick navigation list, one row per step
pub struct NavPanel {
    pub entries: Vec<StepEntry>,
    pub state: ListState,
}

impl NavPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            state: ListState::default(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let (marker, color) = if entry.current {
                    ("▶", Color::Cyan)
                } else if entry.completed {
                    ("✓", Color::Green)
                } else {
                    ("·", Color::Gray)
                };
                let label_style = if entry.completed {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };

                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", marker), Style::default().fg(color)),
                    Span::styled(format!("{:>2}. ", entry.index), Style::default().fg(Color::Gray)),
                    Span::styled(entry.label.clone(), label_style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" Steps ({}) ", self.entries.len()))
                    .borders(Borders::ALL)
                    .border_style(border_style(focused)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

/// Scene objects the user can poke to satisfy triggers
pub struct ScenePanel {
    pub items: Vec<SceneItem>,
    pub state: ListState,
}

impl ScenePanel {
    pub fn new(items: Vec<SceneItem>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self { items, state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<9} ", item.kind_label()),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(item.name().to_string(), Style::default().fg(Color::White)),
                    Span::raw("  "),
                    Span::styled(item.status(), Style::default().fg(item.status_color())),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Scene ")
                    .borders(Borders::ALL)
                    .border_style(border_style(focused)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

pub struct StatusBar {
    pub previous_available: bool,
    pub next_available: bool,
}

impl StatusBar {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let nav = |label: &'static str, available: bool| {
            if available {
                Span::styled(label, Style::default().fg(Color::Yellow))
            } else {
                Span::styled(label, Style::default().fg(Color::DarkGray))
            }
        };

        let line = Line::from(vec![
            nav("[p] ← prev", self.previous_available),
            Span::raw("  "),
            nav("[n] next →", self.next_available),
            Span::raw("  "),
            Span::styled("[?] help  [q] quit", Style::default().fg(Color::Gray)),
        ]);

        let bar = Paragraph::new(line).block(Block::default().borders(Borders::TOP));
        frame.render_widget(bar, area);
    }
}
