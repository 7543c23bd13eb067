mod app;
mod browse;
mod config;
mod event;
mod generate;
mod github;
mod input;
mod log;
mod openai;
mod ui;

use anyhow::Result;
use app::{App, PendingAction, Screen};
use config::Settings;
use crossterm::event as term_event;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use event::{AppEvent, EventTx};
use github::GithubClient;
use input::{handle_event, Action};
use log::LogSink;
use openai::OpenAiClient;
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use std::io::{stdout, IsTerminal};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "version" | "--version" | "-v" => {
                println!("cvgen {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "help" | "--help" | "-h" => {
                println!("cvgen - resume and cover letter generator");
                println!();
                println!("Usage:");
                println!("  cvgen           Launch the TUI");
                println!("  cvgen version   Show version");
                println!();
                println!("Requires GITHUB_TOKEN and OPENAI_API_KEY in the environment.");
                return Ok(());
            }
            other => {
                eprintln!("Unknown command: {}", other);
                eprintln!("Run 'cvgen help' for usage.");
                std::process::exit(1);
            }
        }
    }

    if !stdout().is_terminal() {
        eprintln!("Error: cvgen requires an interactive terminal (TTY).");
        std::process::exit(1);
    }

    // Missing credentials are fatal before any screen is shown.
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let log = LogSink::new(&settings.log_file);
    log.info("Application started.");

    let (tx, rx) = event::channel();
    spawn_ticker(tx.clone());

    let cwd = std::env::current_dir()?;
    let mut app = App::new(cwd, log)?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &settings, tx, rx);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

// Busy-indicator heartbeat; dies with the receiver at shutdown.
fn spawn_ticker(tx: EventTx) {
    std::thread::spawn(move || loop {
        std::thread::sleep(TICK_INTERVAL);
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    });
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    settings: &Settings,
    tx: EventTx,
    rx: Receiver<AppEvent>,
) -> Result<()> {
    let github = Arc::new(GithubClient::new(settings, app.log().clone()));
    let openai = Arc::new(OpenAiClient::new(settings, app.log().clone()));
    let mut needs_draw = true;

    loop {
        // The run loop is the single consumer: every async outcome is applied
        // here, one message at a time, before the next frame.
        while let Ok(ev) = rx.try_recv() {
            if app.apply_event(ev) {
                needs_draw = true;
            }
        }

        if app.screen() == Screen::LogView && app.log().take_dirty() {
            needs_draw = true;
        }

        if needs_draw {
            terminal.draw(|f| {
                let area = f.area();
                match app.screen() {
                    Screen::FileBrowse => ui::render_file_browser(f, app, area),
                    Screen::MainMenu => ui::render_main_menu(f, app, area),
                    Screen::Busy => ui::render_busy(f, app, area),
                    Screen::DocumentPick => ui::render_readme_picker(f, app, area),
                    Screen::LogView => {
                        let entries = app.log().entries();
                        ui::render_log_panel(f, &entries, app.log_scroll(), area);
                    }
                }
            })?;
            needs_draw = false;
        }

        if term_event::poll(Duration::from_millis(16))? {
            let ev = term_event::read()?;
            if matches!(ev, term_event::Event::Resize(..)) {
                needs_draw = true;
            }
            let action = handle_event(&ev, app.screen());
            if action != Action::None {
                process_action(app, action, &github, &openai, settings, &tx);
                needs_draw = true;
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn process_action(
    app: &mut App,
    action: Action,
    github: &Arc<GithubClient>,
    openai: &Arc<OpenAiClient>,
    settings: &Settings,
    tx: &EventTx,
) {
    match action {
        Action::Quit => app.quit(),
        Action::MoveUp => app.move_up(),
        Action::MoveDown => app.move_down(),
        Action::MoveToTop => app.move_to_top(),
        Action::MoveToBottom => app.move_to_bottom(),
        Action::ToggleSelect => app.toggle_current(),
        Action::Confirm => app.confirm(),
        Action::EnterDir => app.enter_dir(),
        Action::ParentDir => app.parent_dir(),
        Action::FetchReadmes => {
            app.begin_action(PendingAction::FetchReadmes);
            github::spawn_fetch_run(
                github.clone(),
                settings.readme_dir.clone(),
                settings.fetch_deadline,
                tx.clone(),
                app.log().clone(),
            );
        }
        Action::GenerateResume | Action::GenerateCoverLetter => {
            let pending = if action == Action::GenerateResume {
                PendingAction::GenerateResume
            } else {
                PendingAction::GenerateCoverLetter
            };
            let inputs = app.prompt_inputs();
            app.begin_action(pending);
            if let Some(gen_action) = pending.gen_action() {
                // Artifacts land in the launch directory, not the browsed one.
                generate::spawn_generation(
                    openai.clone(),
                    gen_action,
                    inputs,
                    PathBuf::from("."),
                    tx.clone(),
                    app.log().clone(),
                );
            }
        }
        Action::ShowLogs => app.open_logs(),
        Action::Back => app.close_logs(),
        Action::ClearLog => app.clear_log(),
        Action::None => {}
    }
}
