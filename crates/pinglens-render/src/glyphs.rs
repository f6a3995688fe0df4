use crossterm::style::Color;
use pinglens_model::TermCaps;

const SHADES_UNICODE: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SHADES_ASCII: [char; 5] = ['_', '.', '-', '~', '^'];

const TIER_COLORS: [Color; 3] = [Color::Green, Color::Yellow, Color::Red];
// Filled variant: the background continues the previous tier so partial
// blocks read as one growing bar.
const TIER_FILL: [(Color, Color); 3] = [
    (Color::Green, Color::Black),
    (Color::Yellow, Color::Green),
    (Color::Red, Color::Yellow),
];

pub const ALERT_GLYPH: char = '!';

/// Shade and color tables for the sparkline, chosen from terminal capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSet {
    pub shades: &'static [char],
    pub caps: TermCaps,
}

impl GlyphSet {
    pub fn for_caps(caps: TermCaps) -> Self {
        let shades: &'static [char] = if caps.unicode {
            &SHADES_UNICODE
        } else {
            &SHADES_ASCII
        };
        Self { shades, caps }
    }

    pub fn levels(&self) -> usize {
        self.shades.len()
    }

    pub fn tiers(&self) -> usize {
        if self.caps.color {
            TIER_COLORS.len()
        } else {
            1
        }
    }

    pub fn tier_color(&self, tier: usize) -> Color {
        TIER_COLORS[tier.min(TIER_COLORS.len() - 1)]
    }

    /// Foreground and background for the filled variant of `tier`.
    pub fn tier_fill(&self, tier: usize) -> (Color, Color) {
        TIER_FILL[tier.min(TIER_FILL.len() - 1)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxGlyphs {
    pub bar: char,
    pub left_end: char,
    pub right_end: char,
    pub fill: char,
    pub median: char,
}

impl BoxGlyphs {
    pub fn for_caps(caps: TermCaps) -> Self {
        if caps.unicode {
            Self {
                bar: '─',
                left_end: '├',
                right_end: '┤',
                fill: ' ',
                median: '│',
            }
        } else {
            Self {
                bar: '-',
                left_end: '|',
                right_end: '|',
                fill: ' ',
                median: '#',
            }
        }
    }
}
