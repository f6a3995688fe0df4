use crate::boxplot::boxplot_cells;
use crate::glyphs::{BoxGlyphs, GlyphSet};
use crate::layout::Layout;
use crate::log::{LogLine, LogRegion};
use crate::panel::{draw_panel_text, PanelView, GRAPH_ROW};
use crate::sparkline::{graph_width, sparkline_cell, sparkline_slot, GRAPH_MARGIN};
use crate::surface::{Cell, Surface};
use crossterm::cursor::{Hide, Show};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use pinglens_model::{GraphMode, Sample, TermCaps};
use pinglens_stats::Histogram;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("panel is too narrow for a graph ({width} columns)")]
    TooNarrow { width: u16 },
    #[error("terminal write failed: {0}")]
    Io(#[from] io::Error),
}

/// Owns the screen: the log region plus panel geometry for every target.
pub struct TerminalRenderer<W: Write> {
    out: W,
    caps: TermCaps,
    mode: GraphMode,
    interval_secs: f64,
    glyphs: GlyphSet,
    box_glyphs: BoxGlyphs,
    layout: Layout,
    log: LogRegion,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(
        out: W,
        caps: TermCaps,
        mode: GraphMode,
        interval_secs: f64,
        target_count: usize,
        (cols, rows): (u16, u16),
    ) -> Self {
        let layout = Layout::new(cols, rows, target_count);
        Self {
            out,
            caps,
            mode,
            interval_secs,
            glyphs: GlyphSet::for_caps(caps),
            box_glyphs: BoxGlyphs::for_caps(caps),
            layout,
            log: LogRegion::new(layout.log_height as usize),
        }
    }

    pub fn caps(&self) -> TermCaps {
        self.caps
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn log_region(&self) -> &LogRegion {
        &self.log
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn enter(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.out.flush()
    }

    pub fn leave(&mut self) -> io::Result<()> {
        queue!(self.out, Show, LeaveAlternateScreen)?;
        self.out.flush()
    }

    /// Recomputes the geometry. Callers must replace every panel surface with
    /// a fresh one from `panel_surface`.
    pub fn resize(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        self.layout = Layout::new(cols, rows, self.layout.target_count);
        self.log.set_capacity(self.layout.log_height as usize);
        queue!(self.out, Clear(ClearType::All))?;
        self.present_log()
    }

    pub fn panel_surface(&self, index: usize) -> Surface {
        self.layout.panel_surface(index)
    }

    pub fn log(&mut self, line: LogLine) -> io::Result<()> {
        self.log.push(line);
        self.present_log()
    }

    fn present_log(&mut self) -> io::Result<()> {
        let surface = self.log.to_surface(self.layout.cols);
        surface.present(&mut self.out, self.layout.rows)?;
        self.out.flush()
    }

    /// Draws border, title and text rows of a panel without touching its graph row.
    pub fn draw_panel_frame(&mut self, surface: &mut Surface, view: &PanelView<'_>) -> io::Result<()> {
        draw_panel_text(surface, view, self.caps.unicode);
        surface.present(&mut self.out, self.layout.rows)?;
        self.out.flush()
    }

    /// Redraws one panel. Text is always updated; a graph that does not fit
    /// is skipped and reported through the returned error.
    pub fn draw_panel(
        &mut self,
        surface: &mut Surface,
        view: &PanelView<'_>,
        sample: &Sample,
        histogram: Option<&Histogram>,
    ) -> Result<(), RenderError> {
        draw_panel_text(surface, view, self.caps.unicode);
        let graph = self.draw_graph(surface, sample, histogram);
        surface.present(&mut self.out, self.layout.rows)?;
        self.out.flush()?;
        graph
    }

    fn draw_graph(
        &self,
        surface: &mut Surface,
        sample: &Sample,
        histogram: Option<&Histogram>,
    ) -> Result<(), RenderError> {
        let usable = graph_width(surface.width())?;

        match self.mode {
            GraphMode::Sparkline => {
                let x = sparkline_slot(sample.sequence, usable);
                let cell = sparkline_cell(sample.latency_ms, self.interval_secs, &self.glyphs);
                surface.put(GRAPH_ROW, x, cell);
                // Blank the following slot so the write position stays visible.
                if x + 1 < GRAPH_MARGIN + usable {
                    surface.put(GRAPH_ROW, x + 1, Cell::BLANK);
                }
            }
            GraphMode::Boxplot => {
                if let Some(histogram) = histogram {
                    let cells = boxplot_cells(histogram.buckets(), usable as usize, &self.box_glyphs);
                    for (offset, cell) in cells.into_iter().enumerate() {
                        surface.put(GRAPH_ROW, GRAPH_MARGIN + offset as u16, cell);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
