use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use crate::app::{App, PendingAction};
use crate::ui::theme::Theme;

pub fn render_busy(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .split(area);

    let spinner = Line::from(vec![
        Span::styled(format!(" {} ", app.spinner_char()), Theme::spinner()),
        Span::styled(app.last_message().to_string(), Theme::value()),
    ]);
    f.render_widget(
        Paragraph::new(spinner).block(
            Block::default()
                .title(" Working ")
                .borders(Borders::ALL)
                .style(Theme::border()),
        ),
        chunks[0],
    );

    // Only a fetch run has per-item progress to show.
    if app.pending() == Some(PendingAction::FetchReadmes) {
        let progress = app.progress();
        if progress.total > 0 {
            let ratio = (progress.done() as f64 / progress.total as f64).clamp(0.0, 1.0);
            let label = format!(
                "{}/{} ({} failed)",
                progress.done(),
                progress.total,
                progress.failed
            );
            f.render_widget(
                Gauge::default()
                    .block(Block::default().borders(Borders::ALL).style(Theme::border()))
                    .gauge_style(Theme::spinner())
                    .ratio(ratio)
                    .label(label),
                chunks[1],
            );
        }
    }

    f.render_widget(
        Paragraph::new(Span::styled(" q:quit", Theme::footer())),
        chunks[2],
    );
}
