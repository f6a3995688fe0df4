//! Terminal rendering: per-target panels, latency graphs and the scrolling log.

pub mod boxplot;
pub mod glyphs;
pub mod layout;
pub mod log;
pub mod panel;
pub mod renderer;
pub mod sparkline;
pub mod surface;
pub mod text;

pub use boxplot::{boxplot_cells, classify, BoxMark};
pub use glyphs::{BoxGlyphs, GlyphSet};
pub use layout::{Layout, PANEL_HEIGHT};
pub use log::{LogLine, LogRegion};
pub use panel::{draw_panel_text, PanelView};
pub use renderer::{RenderError, TerminalRenderer};
pub use sparkline::{graph_width, intensity, sparkline_cell, sparkline_slot, GRAPH_MARGIN};
pub use surface::{Cell, Style, Surface};
pub use text::{deviation_tier, format_rtt_line, format_stats_line, reply_line, timeout_line};
