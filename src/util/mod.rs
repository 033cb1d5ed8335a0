use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};

/// A stderr spinner for blocking calls to the library service. Draws nothing unless stderr is
/// a terminal.
pub fn new_progress_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_finish(ProgressFinish::AndClear);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {elapsed_precise} {wide_msg}") {
        spinner.set_style(style.tick_strings(&[
            // Idea from https://github.com/FGRibreau/spinners/blob/master/src/lib.rs
            "🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘",
        ]));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
