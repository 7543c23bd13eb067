use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::ui::file_browser::render_status;
use crate::ui::theme::Theme;

pub fn render_main_menu(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Min(8),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .split(area);

    let mut lines = vec![Line::from(Span::styled("Files Imported:", Theme::title()))];
    if app.browse_selected().is_empty() {
        lines.push(Line::from(Span::styled("- None", Theme::label())));
    } else {
        for path in app.browse_selected() {
            lines.push(Line::from(Span::styled(
                format!("- {}", path.display()),
                Theme::value(),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "AI-Powered Actions:",
        Theme::title(),
    )));
    for (key, label) in [
        ("1", "Generate Resume"),
        ("2", "Generate Cover Letter"),
        ("3", "Fetch GitHub READMEs"),
        ("4", "View Logs"),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", key), Theme::marker()),
            Span::styled(label, Theme::value()),
        ]));
    }

    if !app.readme_names().is_empty() {
        let picked = app
            .readme_names()
            .iter()
            .filter(|n| app.is_picked(n))
            .count();
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "{} of {} fetched READMEs selected for prompts.",
                picked,
                app.readme_names().len()
            ),
            Theme::label(),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Main Menu ")
                .borders(Borders::ALL)
                .style(Theme::border()),
        ),
        chunks[0],
    );

    render_status(f, app, chunks[1]);

    f.render_widget(
        Paragraph::new(Span::styled(
            " 1-4:action  q:quit",
            Theme::footer(),
        )),
        chunks[2],
    );
}
