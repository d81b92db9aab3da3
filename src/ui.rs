use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Page, SettingsRow};
use crate::diff::CharacterState;
use crate::session::{SessionSnapshot, SessionStatus, TimerReading};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        render_tabs(self.page, chunks[0], buf);
        match self.page {
            Page::Test => render_test(self, chunks[1], buf),
            Page::Stats => render_stats(self, chunks[1], buf),
            Page::Settings => render_settings(self, chunks[1], buf),
        }
    }
}

fn render_tabs(page: Page, area: Rect, buf: &mut Buffer) {
    let tab = |label: &'static str, this: Page| {
        let style = if this == page {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        Span::styled(label, style)
    };

    Paragraph::new(Line::from(vec![
        tab("test", Page::Test),
        Span::raw("   "),
        tab("stats", Page::Stats),
        Span::raw("   "),
        tab("settings", Page::Settings),
    ]))
    .alignment(Alignment::Center)
    .render(area, buf);
}

/// Styled spans for the passage, one per character
fn passage_spans(snapshot: &SessionSnapshot) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    snapshot
        .passage
        .chars()
        .zip(snapshot.states.iter())
        .map(|(c, state)| match state {
            CharacterState::Correct => Span::styled(c.to_string(), green_bold_style),
            CharacterState::Incorrect => Span::styled(
                match c {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            CharacterState::Cursor => Span::styled(c.to_string(), underlined_dim_bold_style),
            CharacterState::Pending => Span::styled(c.to_string(), dim_bold_style),
        })
        .collect()
}

fn timer_label(timer: TimerReading) -> String {
    match timer {
        TimerReading::Remaining(secs) => format!("{secs}s left"),
        TimerReading::Elapsed(secs) => format!("{secs:.1}s"),
    }
}

fn render_test(app: &App, area: Rect, buf: &mut Buffer) {
    let snapshot = app.engine.snapshot();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    if snapshot.status == SessionStatus::Unavailable {
        let notice = snapshot
            .notice
            .unwrap_or_else(|| "no passage available".to_string());
        Paragraph::new(vec![
            Line::from(Span::styled(
                notice,
                Style::default().fg(Color::Yellow).patch(bold_style),
            )),
            Line::from(Span::styled(
                "(tab) settings / (esc) retry / (ctrl+c) quit",
                italic_style,
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
        return;
    }

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let passage_width = snapshot.passage.width();
    let prompt_occupied_lines = if passage_width <= max_chars_per_line as usize {
        1
    } else {
        ((passage_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2), // live stats
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1),
            Constraint::Min(1), // result + legend
        ])
        .split(area);

    let stats_style = match snapshot.status {
        SessionStatus::Active => Style::default().fg(Color::Cyan).patch(bold_style),
        _ => Style::default().add_modifier(Modifier::DIM),
    };
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {}",
            snapshot.live_wpm,
            snapshot.live_accuracy,
            timer_label(snapshot.timer)
        ),
        stats_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Line::from(passage_spans(&snapshot)))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    let mut footer = Vec::new();
    if let Some(result) = &snapshot.result {
        footer.push(Line::from(Span::styled(
            format!(
                "done: {} wpm   {}% acc   {:.1}s",
                result.wpm, result.accuracy, result.elapsed_secs
            ),
            Style::default().fg(Color::Green).patch(bold_style),
        )));
    } else if snapshot.status == SessionStatus::Idle {
        footer.push(Line::from(Span::styled(
            "start typing to begin",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    footer.push(Line::from(Span::styled(
        "(esc) restart / (tab) stats / (ctrl+c) quit",
        italic_style,
    )));
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_stats(app: &App, area: Rect, buf: &mut Buffer) {
    let history = app.engine.history();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // summary
            Constraint::Min(0),    // table
            Constraint::Length(1), // legend
        ])
        .split(area);

    let Some(summary) = history.summary() else {
        Paragraph::new(Span::styled(
            "no tests yet",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
        return;
    };

    Paragraph::new(format!(
        "avg {} wpm   avg {}% acc   {} tests",
        summary.mean_wpm, summary.mean_accuracy, summary.count
    ))
    .block(Block::default().borders(Borders::ALL).title("Summary"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let header = Row::new(vec!["Date", "WPM", "Acc", "Time", "Mode", "Level", "Lang"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = history
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.date.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(r.wpm.to_string()).style(Style::default().fg(Color::Green)),
                Cell::from(format!("{}%", r.accuracy)),
                Cell::from(format!("{:.1}s", r.elapsed_secs)),
                Cell::from(r.mode.to_string()),
                Cell::from(r.difficulty.to_string()),
                Cell::from(r.language.code()),
            ])
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(4),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Recent"))
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "(tab) settings / (esc) back",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[2], buf);
}

fn render_settings(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let config = &app.config;
    let selected = app.selected_row();
    let lines: Vec<Line> = SettingsRow::ALL
        .iter()
        .map(|row| {
            let value = match row {
                SettingsRow::Mode if config.timed => "timed".to_string(),
                SettingsRow::Mode => "free".to_string(),
                SettingsRow::Duration => format!("{}s", config.duration_secs),
                SettingsRow::Difficulty => format!(
                    "{} ({} chars)",
                    config.difficulty,
                    config.difficulty.max_length()
                ),
                SettingsRow::Language => config.language.native_name().to_string(),
                SettingsRow::ClearHistory => format!("{} entries", app.engine.history().len()),
            };
            let style = if *row == selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if *row == selected { "> " } else { "  " };
            Line::from(Span::styled(
                format!("{marker}{:<14}{value}", row.label()),
                style,
            ))
        })
        .collect();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        "(up/down) select / (left/right) change / (enter) clear history / (esc) back",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .wrap(Wrap { trim: true })
    .render(chunks[1], buf);
}
