use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::browse::{self, DirEntry};
use crate::event::AppEvent;
use crate::generate::{GenAction, PromptInputs};
use crate::github::FetchSnapshot;
use crate::log::LogSink;

pub const MAX_IMPORTED_FILES: usize = 2;

const SPINNER_FRAMES: &[char] = &['|', '/', '-', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    FileBrowse,
    MainMenu,
    Busy,
    DocumentPick,
    LogView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    GenerateResume,
    GenerateCoverLetter,
    FetchReadmes,
}

impl PendingAction {
    pub fn busy_message(self) -> &'static str {
        match self {
            Self::GenerateResume => "Generating resume using OpenAI...",
            Self::GenerateCoverLetter => "Generating cover letter using OpenAI...",
            Self::FetchReadmes => "Fetching README files from GitHub...",
        }
    }

    fn log_label(self) -> &'static str {
        match self {
            Self::GenerateResume => "resume generation",
            Self::GenerateCoverLetter => "cover letter generation",
            Self::FetchReadmes => "fetching GitHub READMEs",
        }
    }

    pub fn gen_action(self) -> Option<GenAction> {
        match self {
            Self::GenerateResume => Some(GenAction::Resume),
            Self::GenerateCoverLetter => Some(GenAction::CoverLetter),
            Self::FetchReadmes => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchProgress {
    pub fetched: usize,
    pub failed: usize,
    pub total: usize,
}

impl FetchProgress {
    pub fn done(&self) -> usize {
        self.fetched + self.failed
    }
}

/// The whole mutable workflow state. Owned by the run loop; background
/// producers only ever reach it through `apply_event`.
pub struct App {
    screen: Screen,
    cursor: usize,
    browse_dir: PathBuf,
    browse_entries: Vec<DirEntry>,
    browse_selected: Vec<PathBuf>,
    readme_names: Vec<String>,
    readmes: HashMap<String, String>,
    picked: HashMap<String, bool>,
    pending: Option<PendingAction>,
    progress: FetchProgress,
    spinner_phase: usize,
    last_message: String,
    last_error: Option<String>,
    log_scroll: usize,
    prev_screen: Screen,
    should_quit: bool,
    log: LogSink,
}

impl App {
    pub fn new(start_dir: PathBuf, log: LogSink) -> Result<Self> {
        let browse_entries = browse::list_dir(&start_dir)?;
        Ok(Self {
            screen: Screen::FileBrowse,
            cursor: 0,
            browse_dir: start_dir,
            browse_entries,
            browse_selected: Vec::new(),
            readme_names: Vec::new(),
            readmes: HashMap::new(),
            picked: HashMap::new(),
            pending: None,
            progress: FetchProgress::default(),
            spinner_phase: 0,
            last_message: String::new(),
            last_error: None,
            log_scroll: 0,
            prev_screen: Screen::FileBrowse,
            should_quit: false,
            log,
        })
    }

    // --- accessors -------------------------------------------------------

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn browse_dir(&self) -> &PathBuf {
        &self.browse_dir
    }

    pub fn browse_entries(&self) -> &[DirEntry] {
        &self.browse_entries
    }

    pub fn browse_selected(&self) -> &[PathBuf] {
        &self.browse_selected
    }

    pub fn readme_names(&self) -> &[String] {
        &self.readme_names
    }

    pub fn is_picked(&self, name: &str) -> bool {
        self.picked.get(name).copied().unwrap_or(false)
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn progress(&self) -> FetchProgress {
        self.progress
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_phase % SPINNER_FRAMES.len()]
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }

    pub fn log_scroll(&self) -> usize {
        self.log_scroll
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Snapshot of everything prompt assembly needs.
    pub fn prompt_inputs(&self) -> PromptInputs {
        PromptInputs {
            files: self.browse_selected.clone(),
            readme_names: self.readme_names.clone(),
            readmes: self.readmes.clone(),
            picked: self.picked.clone(),
        }
    }

    // --- navigation ------------------------------------------------------

    fn active_list_len(&self) -> usize {
        match self.screen {
            Screen::FileBrowse => self.browse_entries.len(),
            Screen::DocumentPick => self.readme_names.len(),
            _ => 0,
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.active_list_len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.screen == Screen::LogView {
            self.log_scroll = self.log_scroll.saturating_sub(1);
            return;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.screen == Screen::LogView {
            // Bounded by the ring size; the renderer clamps to the last page.
            self.log_scroll = self.log_scroll.saturating_add(1).min(self.log.entry_count());
            return;
        }
        if self.cursor + 1 < self.active_list_len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        if self.screen == Screen::LogView {
            self.log_scroll = 0;
        } else {
            self.cursor = 0;
        }
    }

    pub fn move_to_bottom(&mut self) {
        if self.screen == Screen::LogView {
            self.log_scroll = self.log.entry_count();
        } else {
            let len = self.active_list_len();
            if len > 0 {
                self.cursor = len - 1;
            }
        }
    }

    // --- file browser ----------------------------------------------------

    pub fn toggle_current(&mut self) {
        match self.screen {
            Screen::FileBrowse => self.toggle_browse_entry(),
            Screen::DocumentPick => self.toggle_picked(),
            _ => {}
        }
    }

    fn toggle_browse_entry(&mut self) {
        let Some(entry) = self.browse_entries.get(self.cursor) else {
            return;
        };
        if entry.is_dir {
            self.last_message = "Directories cannot be imported.".to_string();
            return;
        }
        let path = self.browse_dir.join(&entry.name);
        if let Some(pos) = self.browse_selected.iter().position(|p| p == &path) {
            self.browse_selected.remove(pos);
            self.last_message = format!("Deselected: {}", entry.name);
            self.log.info(format!("Deselected file: {}", path.display()));
        } else if self.browse_selected.len() >= MAX_IMPORTED_FILES {
            // Third toggle is a no-op beyond the status line.
            self.last_message =
                format!("You can import at most {} files.", MAX_IMPORTED_FILES);
            self.log.warn(format!(
                "Refused selection beyond {} files: {}",
                MAX_IMPORTED_FILES,
                path.display()
            ));
        } else {
            self.browse_selected.push(path.clone());
            self.last_message = format!("Selected: {}", entry.name);
            self.log.info(format!("Selected file: {}", path.display()));
        }
    }

    pub fn enter_dir(&mut self) {
        let Some(entry) = self.browse_entries.get(self.cursor) else {
            return;
        };
        if !entry.is_dir {
            return;
        }
        let target = self.browse_dir.join(&entry.name);
        self.change_dir(target);
    }

    pub fn parent_dir(&mut self) {
        let Some(parent) = self.browse_dir.parent().map(|p| p.to_path_buf()) else {
            return;
        };
        self.change_dir(parent);
    }

    fn change_dir(&mut self, target: PathBuf) {
        match browse::list_dir(&target) {
            Ok(entries) => {
                self.log
                    .info(format!("Navigated to directory: {}", target.display()));
                self.browse_dir = target;
                self.browse_entries = entries;
                self.cursor = 0;
                self.last_message.clear();
                self.last_error = None;
            }
            Err(e) => {
                // Stay on the current listing; the failure is only a status.
                self.last_error = Some(e.to_string());
                self.log
                    .error(format!("Error listing {}: {}", target.display(), e));
            }
        }
    }

    // --- document picker -------------------------------------------------

    fn toggle_picked(&mut self) {
        let Some(name) = self.readme_names.get(self.cursor).cloned() else {
            return;
        };
        let flag = self.picked.entry(name.clone()).or_insert(false);
        *flag = !*flag;
        if *flag {
            self.last_message = format!("Selected: {}", name);
            self.log.info(format!("Selected README: {}", name));
        } else {
            self.last_message = format!("Deselected: {}", name);
            self.log.info(format!("Deselected README: {}", name));
        }
    }

    // --- screen transitions ----------------------------------------------

    pub fn confirm(&mut self) {
        match self.screen {
            Screen::FileBrowse => {
                self.screen = Screen::MainMenu;
                self.cursor = 0;
                self.last_message = "Proceeding to main menu.".to_string();
                self.log.info("Navigated to main menu.");
            }
            Screen::DocumentPick => {
                self.screen = Screen::MainMenu;
                self.cursor = 0;
                self.log.info("Returned to main menu from README selection.");
            }
            _ => {}
        }
    }

    pub fn open_logs(&mut self) {
        if self.screen == Screen::LogView {
            return;
        }
        self.prev_screen = self.screen;
        self.screen = Screen::LogView;
        self.log.info("Opened log view.");
        // Start tailed: the renderer clamps this to the last page.
        self.log_scroll = self.log.entry_count();
    }

    pub fn close_logs(&mut self) {
        if self.screen != Screen::LogView {
            return;
        }
        self.screen = self.prev_screen;
        self.clamp_cursor();
        self.log.info("Closed log view.");
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
        self.log_scroll = 0;
    }

    pub fn quit(&mut self) {
        self.log.info("Application terminated by user.");
        self.should_quit = true;
    }

    /// Enter the busy screen for exactly one asynchronous job. The caller is
    /// responsible for actually launching it right after.
    pub fn begin_action(&mut self, action: PendingAction) {
        debug_assert_eq!(self.screen, Screen::MainMenu);
        debug_assert!(self.pending.is_none());
        self.pending = Some(action);
        self.screen = Screen::Busy;
        self.spinner_phase = 0;
        self.progress = FetchProgress::default();
        self.last_message = action.busy_message().to_string();
        self.last_error = None;
        self.log.info(format!("Initiated {}.", action.log_label()));
    }

    // --- event dispatch ---------------------------------------------------

    /// Apply one bus message. Returns whether the frame needs a redraw.
    pub fn apply_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Tick => {
                if self.screen == Screen::Busy {
                    self.spinner_phase = self.spinner_phase.wrapping_add(1);
                    true
                } else {
                    false
                }
            }
            AppEvent::FetchProgress(update) => {
                if self.pending != Some(PendingAction::FetchReadmes) {
                    return false;
                }
                // Workers record under the arena lock but enqueue outside it,
                // so updates can arrive out of order. Merge element-wise so
                // the counters shown never move backwards within a run.
                self.progress = FetchProgress {
                    fetched: self.progress.fetched.max(update.fetched),
                    failed: self.progress.failed.max(update.failed),
                    total: self.progress.total.max(update.total),
                };
                true
            }
            AppEvent::FetchComplete(snapshot) => {
                if self.pending != Some(PendingAction::FetchReadmes) {
                    return false;
                }
                self.install_fetch_results(snapshot);
                true
            }
            AppEvent::FetchFailed(msg) => {
                if self.pending != Some(PendingAction::FetchReadmes) {
                    return false;
                }
                self.pending = None;
                self.screen = Screen::MainMenu;
                self.cursor = 0;
                self.last_error = Some(msg);
                true
            }
            AppEvent::Generation(result) => {
                let Some(action) = self.pending else {
                    return false;
                };
                if action == PendingAction::FetchReadmes {
                    return false;
                }
                self.pending = None;
                self.screen = Screen::MainMenu;
                self.cursor = 0;
                match result {
                    Ok(outcome) => {
                        self.last_message = format!(
                            "{}\nOperation took: {:.1}s",
                            outcome.message,
                            outcome.elapsed.as_secs_f64()
                        );
                        self.last_error = None;
                        self.log.info(format!(
                            "Completed {} generation in {:.1}s.",
                            outcome.action.label(),
                            outcome.elapsed.as_secs_f64()
                        ));
                    }
                    Err(e) => {
                        self.last_error = Some(e.to_string());
                        self.log
                            .error(format!("Error during {}: {}", action.log_label(), e));
                    }
                }
                true
            }
        }
    }

    /// Install one fetch run's results wholesale and move to curation. An
    /// empty run still lands on the picker so the user sees it explicitly.
    fn install_fetch_results(&mut self, snapshot: FetchSnapshot) {
        self.progress = FetchProgress {
            fetched: snapshot.fetched,
            failed: snapshot.failed,
            total: self.progress.total.max(snapshot.fetched + snapshot.failed),
        };
        self.picked = snapshot
            .names
            .iter()
            .map(|n| (n.clone(), true))
            .collect();
        self.readme_names = snapshot.names;
        self.readmes = snapshot.docs;
        self.pending = None;
        self.screen = Screen::DocumentPick;
        self.cursor = 0;
        self.last_message = format!(
            "README fetching complete: {} fetched, {} failed.",
            self.progress.fetched, self.progress.failed
        );
        self.log.info("Received fetch completion.");
    }
}
