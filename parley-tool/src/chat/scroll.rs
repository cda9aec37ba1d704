/// Keeps the transcript view pinned to the newest line.
///
/// The offset counts lines up from the bottom. Scrolling up pauses follow
/// mode; any session change or scrolling back to the bottom resumes it.
#[derive(Debug, Clone, Default)]
pub struct ScrollFollow {
    offset_from_bottom: u16,
}

impl ScrollFollow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_following_bottom(&self) -> bool {
        self.offset_from_bottom == 0
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset_from_bottom = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(lines);
    }

    /// Top line to show for `total_lines` of content in a view `visible_height` tall.
    pub fn top_line(&mut self, total_lines: usize, visible_height: usize) -> u16 {
        let max_top = total_lines.saturating_sub(visible_height);
        // Don't let the offset run past the first line.
        let offset = (self.offset_from_bottom as usize).min(max_top);
        self.offset_from_bottom = offset as u16;
        u16::try_from(max_top - offset).unwrap_or(u16::MAX)
    }
}
