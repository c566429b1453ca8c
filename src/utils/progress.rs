const BAR_WIDTH: usize = 30;

/// Percentage of work done after finishing item `index` (zero-based) of `total`.
pub fn percent_done(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = (index + 1).min(total);
    ((done * 100) / total) as u8
}

/// Renders `[███▒▒▒] 42%` with a fixed 30-cell bar.
pub fn render_bar(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "▒".repeat(BAR_WIDTH - filled),
        percent
    )
}
