use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub reverse: bool,
}

impl Style {
    pub const PLAIN: Style = Style {
        fg: None,
        bg: None,
        bold: false,
        reverse: false,
    };

    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::PLAIN
        }
    }

    pub fn reverse() -> Self {
        Self {
            reverse: true,
            ..Self::PLAIN
        }
    }

    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::PLAIN
        }
    }

    pub fn with_bg(self, color: Color) -> Self {
        Self {
            bg: Some(color),
            ..self
        }
    }

    pub fn with_bold(self) -> Self {
        Self { bold: true, ..self }
    }

    fn apply<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        if let Some(fg) = self.fg {
            queue!(out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = self.bg {
            queue!(out, SetBackgroundColor(bg))?;
        }
        if self.bold {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        if self.reverse {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        style: Style::PLAIN,
    };

    pub fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }
}

/// A rectangular, full-width slice of the screen starting at row `top`.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    top: u16,
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Surface {
    pub fn new(top: u16, width: u16, height: u16) -> Self {
        Self {
            top,
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn clear_row(&mut self, y: u16) {
        for x in 0..self.width {
            self.put(y, x, Cell::BLANK);
        }
    }

    pub fn cell(&self, y: u16, x: u16) -> Option<&Cell> {
        if y < self.height && x < self.width {
            self.cells.get(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Writes one cell; out-of-bounds writes are dropped.
    pub fn put(&mut self, y: u16, x: u16, cell: Cell) {
        if y < self.height && x < self.width {
            let idx = y as usize * self.width as usize + x as usize;
            self.cells[idx] = cell;
        }
    }

    /// Writes `text` from `(y, x)` and returns the column after it.
    pub fn put_str(&mut self, y: u16, x: u16, text: &str, style: Style) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            self.put(y, col, Cell::new(ch, style));
            col += 1;
        }
        col
    }

    pub fn draw_box(&mut self, unicode: bool) {
        if self.width < 2 || self.height < 2 {
            return;
        }
        let (h, v, tl, tr, bl, br) = if unicode {
            ('─', '│', '┌', '┐', '└', '┘')
        } else {
            ('-', '|', '+', '+', '+', '+')
        };
        let right = self.width - 1;
        let bottom = self.height - 1;

        for x in 1..right {
            self.put(0, x, Cell::new(h, Style::PLAIN));
            self.put(bottom, x, Cell::new(h, Style::PLAIN));
        }
        for y in 1..bottom {
            self.put(y, 0, Cell::new(v, Style::PLAIN));
            self.put(y, right, Cell::new(v, Style::PLAIN));
        }
        self.put(0, 0, Cell::new(tl, Style::PLAIN));
        self.put(0, right, Cell::new(tr, Style::PLAIN));
        self.put(bottom, 0, Cell::new(bl, Style::PLAIN));
        self.put(bottom, right, Cell::new(br, Style::PLAIN));
    }

    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.cell(y, x))
            .map(|cell| cell.ch)
            .collect()
    }

    /// Queues the surface onto `out`, skipping rows at or below `screen_rows`.
    pub fn present<W: Write>(&self, out: &mut W, screen_rows: u16) -> io::Result<()> {
        for y in 0..self.height {
            let row = self.top.saturating_add(y);
            if row >= screen_rows {
                break;
            }
            queue!(out, MoveTo(0, row))?;

            let mut run = String::new();
            let mut run_style: Option<Style> = None;
            for x in 0..self.width {
                let Some(cell) = self.cell(y, x) else { break };
                if run_style != Some(cell.style) {
                    if let Some(style) = run_style {
                        style.apply(out)?;
                        queue!(out, Print(&run))?;
                        run.clear();
                    }
                    run_style = Some(cell.style);
                }
                run.push(cell.ch);
            }
            if let Some(style) = run_style {
                style.apply(out)?;
                queue!(out, Print(&run))?;
            }
        }
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_clipped() {
        let mut surface = Surface::new(3, 6, 2);
        let end = surface.put_str(0, 2, "abcdef", Style::PLAIN);
        assert_eq!(end, 6);
        assert_eq!(surface.row_text(0), "  abcd");
        surface.put(5, 5, Cell::new('x', Style::PLAIN));
        assert!(surface.cell(5, 5).is_none());
    }

    #[test]
    fn box_outline() {
        let mut surface = Surface::new(0, 5, 3);
        surface.draw_box(false);
        assert_eq!(surface.row_text(0), "+---+");
        assert_eq!(surface.row_text(1), "|   |");
        assert_eq!(surface.row_text(2), "+---+");
    }

    #[test]
    fn present_skips_offscreen_rows() {
        let mut surface = Surface::new(1, 4, 3);
        surface.put_str(0, 0, "top", Style::PLAIN);
        surface.put_str(2, 0, "low", Style::PLAIN);
        let mut out = Vec::new();
        surface.present(&mut out, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("top"));
        assert!(!text.contains("low"));
    }
}
