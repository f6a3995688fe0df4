use crate::surface::{Style, Surface};
use crate::text::{format_rtt_line, format_stats_line};
use pinglens_model::RttSummary;

pub const TITLE_COLUMN: u16 = 5;
pub const TEXT_COLUMN: u16 = 2;
pub const STATS_ROW: u16 = 1;
pub const RTT_ROW: u16 = 2;
pub const GRAPH_ROW: u16 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView<'a> {
    pub host: &'a str,
    pub sent: u32,
    pub received: u32,
    pub loss_pct: f64,
    pub latency_total_ms: f64,
    pub rtt: Option<RttSummary>,
}

/// Draws border, title and the two text rows. The graph row is left alone so
/// a sparkline keeps its history between frames.
pub fn draw_panel_text(surface: &mut Surface, view: &PanelView<'_>, unicode: bool) {
    surface.draw_box(unicode);

    let x = surface.put_str(0, TITLE_COLUMN, &format!(" {} ", view.host), Style::bold());
    surface.put_str(0, x, "ping statistics ", Style::PLAIN);

    let inner = surface.width().saturating_sub(1);
    for row in [STATS_ROW, RTT_ROW] {
        for col in 1..inner {
            surface.put(row, col, crate::surface::Cell::BLANK);
        }
    }

    let stats = format_stats_line(view.sent, view.received, view.loss_pct, view.latency_total_ms);
    surface.put_str(STATS_ROW, TEXT_COLUMN, &stats, Style::PLAIN);

    if view.received > 0 {
        if let Some(rtt) = &view.rtt {
            surface.put_str(RTT_ROW, TEXT_COLUMN, &format_rtt_line(rtt), Style::PLAIN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PANEL_HEIGHT;

    #[test]
    fn rtt_row_waits_for_first_reply() {
        let mut surface = Surface::new(0, 100, PANEL_HEIGHT);
        let mut view = PanelView {
            host: "a.example",
            sent: 2,
            received: 0,
            loss_pct: 100.0,
            latency_total_ms: 0.0,
            rtt: None,
        };
        draw_panel_text(&mut surface, &view, false);
        assert!(surface.row_text(0).starts_with("+---- a.example ping statistics -"));
        assert!(surface.row_text(1).contains("2 packets transmitted, 0 received"));
        assert_eq!(surface.row_text(2).trim_matches(|c| c == '|' || c == ' '), "");

        view.received = 1;
        view.rtt = Some(RttSummary {
            min_ms: 3.0,
            avg_ms: 3.0,
            percentile: 95.0,
            percentile_ms: 4.0,
            max_ms: 3.0,
            stddev_ms: 0.0,
        });
        draw_panel_text(&mut surface, &view, false);
        assert!(surface.row_text(2).contains("rtt min/avg/95%/max/sdev = 3.000/3.000/4/3.000/0.000 ms"));
    }
}
