mod busy;
mod file_browser;
mod log_panel;
mod main_menu;
mod readme_picker;
pub mod theme;

pub use busy::render_busy;
pub use file_browser::render_file_browser;
pub use log_panel::render_log_panel;
pub use main_menu::render_main_menu;
pub use readme_picker::render_readme_picker;
