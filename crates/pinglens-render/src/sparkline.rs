use crate::glyphs::{GlyphSet, ALERT_GLYPH};
use crate::renderer::RenderError;
use crate::surface::{Cell, Style};

/// Columns kept free on each side of a graph row (border plus padding).
pub const GRAPH_MARGIN: u16 = 2;

/// Number of graph columns a panel of `panel_width` can hold.
pub fn graph_width(panel_width: u16) -> Result<u16, RenderError> {
    if panel_width <= 2 * GRAPH_MARGIN {
        return Err(RenderError::TooNarrow { width: panel_width });
    }
    Ok(panel_width - 2 * GRAPH_MARGIN)
}

/// Column of the glyph for `sequence`; the row wraps around instead of scrolling.
pub fn sparkline_slot(sequence: u32, usable_width: u16) -> u16 {
    let usable = u32::from(usable_width.max(1));
    (sequence.saturating_sub(1) % usable) as u16 + GRAPH_MARGIN
}

/// Splits a latency into `(glyph_index, tier_index)`.
pub fn intensity(latency_ms: f64, interval_secs: f64, levels: usize, tiers: usize) -> (usize, usize) {
    let steps = (levels * tiers).max(1);
    let ratio = ((latency_ms / 1000.0) / interval_secs).min(1.0);
    let raw = (ratio * steps as f64) as usize;
    let level = raw.min(steps - 1);
    (level % levels.max(1), level / levels.max(1))
}

pub fn sparkline_cell(latency_ms: Option<f64>, interval_secs: f64, glyphs: &GlyphSet) -> Cell {
    let Some(latency) = latency_ms else {
        let mut style = Style::bold();
        if glyphs.caps.color {
            style.fg = Some(glyphs.tier_color(usize::MAX));
        }
        return Cell::new(ALERT_GLYPH, style);
    };

    let (glyph, tier) = intensity(latency, interval_secs, glyphs.levels(), glyphs.tiers());
    let style = if !glyphs.caps.color {
        Style::PLAIN
    } else if glyphs.caps.unicode {
        let (fg, bg) = glyphs.tier_fill(tier);
        Style::fg(fg).with_bg(bg)
    } else {
        Style::fg(glyphs.tier_color(tier))
    };
    Cell::new(glyphs.shades[glyph], style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinglens_model::TermCaps;

    #[test]
    fn slot_wraps_inside_margins() {
        assert_eq!(sparkline_slot(1, 10), 2);
        assert_eq!(sparkline_slot(10, 10), 11);
        assert_eq!(sparkline_slot(11, 10), 2);
        assert_eq!(sparkline_slot(0, 10), 2);
    }

    #[test]
    fn narrow_panels_have_no_graph() {
        assert!(graph_width(4).is_err());
        assert_eq!(graph_width(5).unwrap(), 1);
        assert_eq!(graph_width(80).unwrap(), 76);
    }

    #[test]
    fn intensity_spans_levels_and_tiers() {
        assert_eq!(intensity(0.0, 1.0, 8, 3), (0, 0));
        assert_eq!(intensity(500.0, 1.0, 8, 3), (4, 1));
        assert_eq!(intensity(999.0, 1.0, 8, 3), (7, 2));
        assert_eq!(intensity(1000.0, 1.0, 8, 3), (7, 2));
        assert_eq!(intensity(30_000.0, 1.0, 8, 3), (7, 2));
        assert_eq!(intensity(100.0, 0.5, 5, 1), (1, 0));
    }

    #[test]
    fn timeout_is_bold_alert() {
        let glyphs = GlyphSet::for_caps(TermCaps {
            color: false,
            unicode: true,
        });
        let cell = sparkline_cell(None, 1.0, &glyphs);
        assert_eq!(cell.ch, '!');
        assert!(cell.style.bold);
        assert_eq!(cell.style.fg, None);
    }
}
