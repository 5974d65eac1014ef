//! Layout and rendering: the blob fills the frame, the interface panels are
//! drawn over it.

use crate::core::state::{AetherState, Sender};
use crate::tui::app::App;
use crate::tui::blob_widget::BlobWidget;
use crate::visual::params::visual_params;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn mood_color(state: &AetherState) -> Color {
    let rgb = visual_params(state.mood).primary_color;
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let state = app.handle.state_rx.borrow().clone();

    // Background visualizer first; the affective state is re-read on every
    // frame so a mood swap shows up immediately.
    frame.render_widget(BlobWidget::new(&state, app.phase), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(4),     // Blob stays visible here
            Constraint::Length(9),  // Chat transcript
            Constraint::Length(3),  // Input
            Constraint::Length(1),  // Footer shortcuts
        ])
        .split(area);

    render_header(frame, app, &state, chunks[0]);
    render_thought(frame, &state, chunks[1]);
    render_chat(frame, app, &state, chunks[2]);
    render_input(frame, app, chunks[3]);
    render_footer(frame, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, state: &AetherState, area: Rect) {
    frame.render_widget(Clear, area);

    let (dot, status) = if app.processing() {
        (Span::styled("●", Style::default().fg(Color::Yellow)), "PROCESSING")
    } else {
        (Span::styled("●", Style::default().fg(Color::Green)), "SYSTEM ONLINE")
    };

    let weather = app.handle.weather_rx.borrow().clone();
    let readout = match &weather {
        Some(w) => format!(
            "{} │ {}°C • {} │ ",
            w.location_label, w.temperature, w.condition
        ),
        None => "Scanning... │ -- │ ".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                " AETHER ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            dot,
            Span::styled(format!(" {status}"), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(format!(" {readout}"), Style::default().fg(Color::Gray)),
            Span::styled(
                state.mood.as_str().to_uppercase(),
                Style::default()
                    .fg(mood_color(state))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn render_thought(frame: &mut Frame, state: &AetherState, area: Rect) {
    let width = area.width.min(46);
    let thought_area = Rect::new(area.x + 1, area.y, width.saturating_sub(1), area.height.min(4));
    if thought_area.width < 10 || thought_area.height < 3 {
        return;
    }

    frame.render_widget(Clear, thought_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Internal Process ");
    frame.render_widget(
        Paragraph::new(format!("\"{}\"", state.thought))
            .style(Style::default().fg(Color::White).add_modifier(Modifier::ITALIC))
            .wrap(Wrap { trim: true })
            .block(block),
        thought_area,
    );
}

fn render_chat(frame: &mut Frame, app: &App, state: &AetherState, area: Rect) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");
    let inner_height = area.height.saturating_sub(2) as usize;

    let transcript = app.handle.transcript_rx.borrow().clone();
    let lines: Vec<Line> = if transcript.is_empty() {
        vec![Line::from(Span::styled(
            "Aether is listening. Say hello.",
            Style::default().fg(Color::DarkGray),
        ))
        .centered()]
    } else {
        transcript
            .iter()
            .rev()
            .take(inner_height)
            .rev()
            .map(|msg| match msg.sender {
                Sender::User => Line::from(vec![
                    Span::styled(msg.text.clone(), Style::default().fg(Color::White)),
                    Span::styled(" ◂ you", Style::default().fg(Color::Cyan)),
                ])
                .right_aligned(),
                Sender::Aether => Line::from(vec![
                    Span::styled("aether ▸ ", Style::default().fg(mood_color(state))),
                    Span::styled(msg.text.clone(), Style::default().fg(Color::Gray)),
                ]),
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    frame.render_widget(Clear, area);
    let (text, style) = if app.processing() {
        (
            "…".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else if app.input.is_empty() {
        (
            "Interact with Aether...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (format!("{}▏", app.input), Style::default().fg(Color::White))
    };

    frame.render_widget(
        Paragraph::new(text).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        ),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(" Enter send · F2 good news · F3 bad news · Esc quit")
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
