use crate::surface::Surface;

pub const PANEL_HEIGHT: u16 = 5;

/// Screen split: a scrolling log on top, then one panel per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub cols: u16,
    pub rows: u16,
    pub log_height: u16,
    pub target_count: usize,
}

impl Layout {
    pub fn new(cols: u16, rows: u16, target_count: usize) -> Self {
        let panels = u16::try_from(target_count)
            .unwrap_or(u16::MAX)
            .saturating_mul(PANEL_HEIGHT);
        Self {
            cols,
            rows,
            log_height: rows.saturating_sub(panels),
            target_count,
        }
    }

    pub fn panel_top(&self, index: usize) -> u16 {
        let offset = u16::try_from(index)
            .unwrap_or(u16::MAX)
            .saturating_mul(PANEL_HEIGHT);
        self.log_height.saturating_add(offset)
    }

    pub fn panel_surface(&self, index: usize) -> Surface {
        Surface::new(self.panel_top(index), self.cols, PANEL_HEIGHT)
    }
}
