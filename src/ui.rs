pub mod panel;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::checklist::ConfirmMode;
use crate::trainer::Status;
use crate::util::{format_countdown, hotspot_key};
use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const PANEL_MAP_HEIGHT: u16 = 10;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let trainer = &self.trainer;
        let checklist = trainer.checklist();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let yellow_bold_style = Style::default().patch(bold_style).fg(Color::Yellow);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let hint_style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC);

        let step_rows = checklist.len() as u16 + 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // title
                    Constraint::Length(PANEL_MAP_HEIGHT),
                    Constraint::Length(step_rows),
                    Constraint::Length(1), // status banner
                    Constraint::Min(1),    // hints
                ]
                .as_ref(),
            )
            .split(area);

        let title = Paragraph::new(Span::styled(
            format!("{} Checklist Trainer", checklist.name),
            bold_style,
        ))
        .alignment(Alignment::Center);
        title.render(chunks[0], buf);

        // Panel map: a bordered stand-in for the overhead panel image with
        // the hotspots placed by their percentage coordinates.
        let map_block = Block::default().borders(Borders::ALL).title("overhead panel");
        let map_inner = map_block.inner(chunks[1]);
        map_block.render(chunks[1], buf);

        if map_inner.width > 0 && map_inner.height > 0 {
            for (i, hotspot) in checklist.hotspots.iter().enumerate() {
                let key = hotspot_key(i).map(|k| k.to_string()).unwrap_or_default();
                let text = format!("[{}] {}", key, hotspot.label);
                let rect = panel::hotspot_rect(
                    map_inner,
                    hotspot.top,
                    hotspot.left,
                    text.width() as u16,
                );
                let style = if trainer.is_verified(hotspot.step_index) {
                    green_bold_style
                } else {
                    Style::default().patch(bold_style).fg(Color::Blue)
                };
                Paragraph::new(Span::styled(text, style)).render(rect, buf);
            }
        }

        // Step list with per-step confirm controls.
        let mut rows: Vec<Line> = Vec::with_capacity(checklist.len());
        for (index, step) in checklist.steps.iter().enumerate() {
            let is_current = !trainer.is_complete() && index == trainer.current_step();
            let verified = trainer.is_verified(index);

            let marker = if verified {
                Span::styled(" ✓ ", green_bold_style)
            } else if is_current {
                Span::styled(" ▶ ", yellow_bold_style)
            } else {
                Span::raw("   ")
            };

            let label_style = if verified {
                green_bold_style
            } else if is_current {
                yellow_bold_style
            } else {
                dim_style
            };

            let control = match step.mode {
                ConfirmMode::Manual if verified => Span::styled("  verified", dim_style),
                ConfirmMode::Manual => Span::styled("  [enter] verify", hint_style),
                ConfirmMode::Panel => {
                    let key = checklist
                        .hotspots
                        .iter()
                        .position(|h| h.step_index == index)
                        .and_then(hotspot_key);
                    match key {
                        Some(k) => Span::styled(format!("  [{}] panel", k), hint_style),
                        None => Span::styled("  panel", hint_style),
                    }
                }
            };

            let mut line = Line::from(vec![
                marker,
                Span::styled(format!("{}. ", index), dim_style),
                Span::styled(step.label.clone(), label_style),
                control,
            ]);
            if index == self.selected {
                line = line.style(Style::default().bg(Color::DarkGray));
            }
            rows.push(line);
        }

        let steps_widget = Paragraph::new(rows)
            .block(Block::default().borders(Borders::ALL).title("checklist"));
        steps_widget.render(chunks[2], buf);

        // Status banner mirrors the trainer status: failed red, listening
        // yellow, correct green.
        let banner = match trainer.status() {
            Status::Awaiting => Span::styled("Ready.", dim_style),
            Status::Listening => {
                let remaining = trainer
                    .seconds_remaining()
                    .map(format_countdown)
                    .unwrap_or_default();
                Span::styled(
                    format!("Waiting for input... {}s", remaining),
                    yellow_bold_style,
                )
            }
            Status::Failed => Span::styled("Checklist failed. Restarting...", red_bold_style),
            Status::Correct if trainer.is_complete() => {
                let order = trainer.verified().iter().sorted().join(", ");
                Span::styled(
                    format!("Checklist complete. Steps verified: {}", order),
                    green_bold_style,
                )
            }
            Status::Correct => Span::styled("Correct, proceed...", green_bold_style),
        };
        Paragraph::new(banner)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let hints = if trainer.is_complete() {
            "(r) run again  (esc) quit"
        } else {
            "↑/↓ select step  (enter) verify manual step  (1-9) panel hotspot  (esc) quit"
        };
        Paragraph::new(Span::styled(hints, hint_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);
    }
}
