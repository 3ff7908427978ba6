/// Width of the textual progress bar, in cells.
pub const PROGRESS_BAR_WIDTH: usize = 30;
pub const BAR_FILLED: char = '#';
pub const BAR_EMPTY: char = '-';
/// Clears the terminal and homes the cursor before a full redraw.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
pub const FINISHED_STAMP: &str = "[ENDED]";
