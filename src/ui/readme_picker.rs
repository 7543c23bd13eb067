use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::ui::file_browser::render_status;
use crate::ui::theme::Theme;

pub fn render_readme_picker(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .split(area);

    let lines: Vec<Line> = if app.readme_names().is_empty() {
        vec![Line::from(Span::styled(
            "No READMEs fetched.",
            Theme::label(),
        ))]
    } else {
        app.readme_names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cursor = if i == app.cursor() { ">" } else { " " };
                let selected = if app.is_picked(name) { "[x]" } else { "[ ]" };
                let mut line = Line::from(vec![
                    Span::styled(format!("{} ", cursor), Theme::marker()),
                    Span::styled(format!("{} ", selected), Theme::label()),
                    Span::styled(name.clone(), Theme::value()),
                ]);
                if i == app.cursor() {
                    line = line.style(Theme::selected());
                }
                line
            })
            .collect()
    };

    let inner_height = chunks[0].height.saturating_sub(2) as usize;
    let scroll = app.cursor().saturating_sub(inner_height.saturating_sub(1));

    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Select READMEs for your resume/cover letter ")
                    .borders(Borders::ALL)
                    .style(Theme::border()),
            )
            .scroll((scroll as u16, 0)),
        chunks[0],
    );

    render_status(f, app, chunks[1]);

    f.render_widget(
        Paragraph::new(Span::styled(
            " j/k:move  Space:select  Enter:confirm  l:logs  q:quit",
            Theme::footer(),
        )),
        chunks[2],
    );
}
