use crate::surface::{Style, Surface};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogLine {
    spans: Vec<(String, Style)>,
}

impl LogLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, text: impl Into<String>, style: Style) -> Self {
        self.spans.push((text.into(), style));
        self
    }

    pub fn spans(&self) -> &[(String, Style)] {
        &self.spans
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|(text, _)| text.as_str()).collect()
    }
}

/// Scrollback for the top of the screen; the newest line sits on the bottom row.
#[derive(Debug, Clone, Default)]
pub struct LogRegion {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl LogRegion {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn push(&mut self, line: LogLine) {
        self.lines.push_back(line);
        self.trim();
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    fn trim(&mut self) {
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn to_surface(&self, width: u16) -> Surface {
        let height = u16::try_from(self.capacity).unwrap_or(u16::MAX);
        let mut surface = Surface::new(0, width, height);
        let first_row = self.capacity - self.lines.len();
        for (offset, line) in self.lines.iter().enumerate() {
            let y = (first_row + offset) as u16;
            let mut x = 0;
            for (text, style) in line.spans() {
                x = surface.put_str(y, x, text, *style);
            }
        }
        surface
    }
}
