use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    ToggleSelect,
    Confirm,
    EnterDir,
    ParentDir,
    GenerateResume,
    GenerateCoverLetter,
    FetchReadmes,
    ShowLogs,
    Back,
    ClearLog,
    None,
}

pub fn handle_event(event: &Event, screen: Screen) -> Action {
    match event {
        Event::Key(key) => handle_key(key, screen),
        _ => Action::None,
    }
}

fn handle_key(key: &KeyEvent, screen: Screen) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match screen {
        Screen::FileBrowse => handle_browse_key(key),
        Screen::MainMenu => handle_menu_key(key),
        Screen::Busy => handle_busy_key(key),
        Screen::DocumentPick => handle_picker_key(key),
        Screen::LogView => handle_log_key(key),
    }
}

fn handle_browse_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') => Action::MoveToTop,
        KeyCode::Char('G') => Action::MoveToBottom,
        KeyCode::Char(' ') => Action::ToggleSelect,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char('o') | KeyCode::Right => Action::EnterDir,
        KeyCode::Backspace | KeyCode::Left => Action::ParentDir,
        KeyCode::Char('l') => Action::ShowLogs,
        _ => Action::None,
    }
}

fn handle_menu_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('1') => Action::GenerateResume,
        KeyCode::Char('2') => Action::GenerateCoverLetter,
        KeyCode::Char('3') => Action::FetchReadmes,
        KeyCode::Char('4') | KeyCode::Char('l') => Action::ShowLogs,
        _ => Action::None,
    }
}

// While a job is outstanding only quitting is allowed; everything else waits
// for the completion event.
fn handle_busy_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}

fn handle_picker_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') => Action::MoveToTop,
        KeyCode::Char('G') => Action::MoveToBottom,
        KeyCode::Char(' ') => Action::ToggleSelect,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char('l') => Action::ShowLogs,
        _ => Action::None,
    }
}

fn handle_log_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('b') | KeyCode::Esc => Action::Back,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') => Action::MoveToTop,
        KeyCode::Char('G') => Action::MoveToBottom,
        KeyCode::Char('c') => Action::ClearLog,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for screen in [
            Screen::FileBrowse,
            Screen::MainMenu,
            Screen::Busy,
            Screen::DocumentPick,
            Screen::LogView,
        ] {
            assert_eq!(handle_key(&ev, screen), Action::Quit);
        }
    }

    #[test]
    fn test_menu_digits_map_to_actions() {
        assert_eq!(
            handle_key(&key(KeyCode::Char('1')), Screen::MainMenu),
            Action::GenerateResume
        );
        assert_eq!(
            handle_key(&key(KeyCode::Char('2')), Screen::MainMenu),
            Action::GenerateCoverLetter
        );
        assert_eq!(
            handle_key(&key(KeyCode::Char('3')), Screen::MainMenu),
            Action::FetchReadmes
        );
        assert_eq!(
            handle_key(&key(KeyCode::Char('4')), Screen::MainMenu),
            Action::ShowLogs
        );
    }

    #[test]
    fn test_busy_ignores_navigation() {
        assert_eq!(handle_key(&key(KeyCode::Down), Screen::Busy), Action::None);
        assert_eq!(handle_key(&key(KeyCode::Enter), Screen::Busy), Action::None);
        assert_eq!(
            handle_key(&key(KeyCode::Char('q')), Screen::Busy),
            Action::Quit
        );
    }

    #[test]
    fn test_space_toggles_in_browse_and_picker() {
        assert_eq!(
            handle_key(&key(KeyCode::Char(' ')), Screen::FileBrowse),
            Action::ToggleSelect
        );
        assert_eq!(
            handle_key(&key(KeyCode::Char(' ')), Screen::DocumentPick),
            Action::ToggleSelect
        );
    }
}
