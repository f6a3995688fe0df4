use crate::glyphs::BoxGlyphs;
use crate::surface::{Cell, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxMark {
    Blank,
    Median,
    Box,
    Whisker,
    LeftCap,
    RightCap,
}

/// Classifies one column from the cumulative share up to the previous column
/// and up to this one.
pub fn classify(prev: Option<f64>, ratio: f64) -> BoxMark {
    let Some(prev) = prev else {
        return if ratio >= 0.5 {
            BoxMark::Median
        } else if ratio > 0.25 {
            BoxMark::Box
        } else if ratio > 0.025 {
            BoxMark::Whisker
        } else {
            BoxMark::Blank
        };
    };

    if prev < 0.5 && ratio >= 0.5 {
        BoxMark::Median
    } else if (0.25..=0.75).contains(&ratio) || (prev < 0.75 && ratio > 0.75) {
        BoxMark::Box
    } else if ratio < 0.5 && ratio >= 0.025 {
        if prev < 0.025 {
            BoxMark::LeftCap
        } else {
            BoxMark::Whisker
        }
    } else if ratio > 0.5 && ratio < 0.975 {
        BoxMark::Whisker
    } else if ratio >= 0.975 && prev < 0.975 {
        BoxMark::RightCap
    } else {
        BoxMark::Blank
    }
}

/// Downsamples `buckets` into `width` columns and draws a box-and-whisker row.
pub fn boxplot_cells(buckets: &[u32], width: usize, glyphs: &BoxGlyphs) -> Vec<Cell> {
    if width == 0 {
        return Vec::new();
    }

    let mut accumulated = vec![0u64; width];
    for (i, &count) in buckets.iter().enumerate() {
        let x = i * width / buckets.len();
        accumulated[x] += u64::from(count);
    }
    for x in 1..width {
        accumulated[x] += accumulated[x - 1];
    }

    let total = accumulated[width - 1] as f64;
    let ratios: Vec<f64> = accumulated.iter().map(|&acc| acc as f64 / total).collect();

    (0..width)
        .map(|x| {
            let prev = if x == 0 { None } else { Some(ratios[x - 1]) };
            match classify(prev, ratios[x]) {
                BoxMark::Blank => Cell::BLANK,
                BoxMark::Median => Cell::new(glyphs.median, Style::reverse()),
                BoxMark::Box => Cell::new(glyphs.fill, Style::reverse()),
                BoxMark::Whisker => Cell::new(glyphs.bar, Style::PLAIN),
                BoxMark::LeftCap => Cell::new(glyphs.left_end, Style::PLAIN),
                BoxMark::RightCap => Cell::new(glyphs.right_end, Style::PLAIN),
            }
        })
        .collect()
}
