use pinglens_model::{GraphMode, Sample, TermCaps};
use pinglens_render::{PanelView, RenderError, Style, TerminalRenderer, PANEL_HEIGHT};
use pinglens_render::log::LogLine;
use pinglens_stats::Histogram;

const ASCII_MONO: TermCaps = TermCaps {
    color: false,
    unicode: false,
};

fn sample(sequence: u32, latency_ms: Option<f64>) -> Sample {
    Sample {
        target_index: 0,
        latency_ms,
        sequence,
        ttl: Some(60),
        qos: 0,
        payload_len: 56,
    }
}

fn view(host: &str) -> PanelView<'_> {
    PanelView {
        host,
        sent: 1,
        received: 1,
        loss_pct: 0.0,
        latency_total_ms: 1.0,
        rtt: None,
    }
}

#[test]
fn sparkline_fills_slots_and_wraps() {
    let mut renderer =
        TerminalRenderer::new(Vec::new(), ASCII_MONO, GraphMode::Sparkline, 1.0, 1, (10, 12));
    let mut surface = renderer.panel_surface(0);
    assert_eq!(surface.top(), 7);

    // 6 usable columns between the margins.
    let latencies = [Some(0.0), Some(250.0), None, Some(999.0), Some(500.0)];
    for (i, latency) in latencies.iter().enumerate() {
        renderer
            .draw_panel(&mut surface, &view("h"), &sample(i as u32 + 1, *latency), None)
            .unwrap();
    }
    assert_eq!(&surface.row_text(3)[2..8], "_.!^- ");

    renderer
        .draw_panel(&mut surface, &view("h"), &sample(7, Some(0.0)), None)
        .unwrap();
    assert_eq!(&surface.row_text(3)[2..8], "_ !^- ");
}

#[test]
fn unicode_color_sparkline_uses_fill_variant() {
    let caps = TermCaps {
        color: true,
        unicode: true,
    };
    let mut renderer = TerminalRenderer::new(Vec::new(), caps, GraphMode::Sparkline, 1.0, 1, (20, 5));
    let mut surface = renderer.panel_surface(0);
    renderer
        .draw_panel(&mut surface, &view("h"), &sample(1, Some(400.0)), None)
        .unwrap();

    let cell = surface.cell(3, 2).unwrap();
    // 0.4 * 24 = 9.6 -> level 9 -> second shade of the yellow tier.
    assert_eq!(cell.ch, '▂');
    assert_eq!(
        cell.style,
        Style::fg(crossterm::style::Color::Yellow).with_bg(crossterm::style::Color::Green)
    );
}

#[test]
fn narrow_panel_skips_graph_but_keeps_text() {
    let mut renderer =
        TerminalRenderer::new(Vec::new(), ASCII_MONO, GraphMode::Sparkline, 1.0, 1, (4, 10));
    let mut surface = renderer.panel_surface(0);
    let result = renderer.draw_panel(&mut surface, &view("h"), &sample(1, Some(5.0)), None);
    assert!(matches!(result, Err(RenderError::TooNarrow { width: 4 })));
    assert_eq!(surface.row_text(0), "+--+");
}

#[test]
fn boxplot_row_from_uniform_distribution() {
    let mut histogram = Histogram::new(1.0).unwrap();
    for latency in 0..=1000 {
        histogram.record(f64::from(latency));
    }

    let mut renderer =
        TerminalRenderer::new(Vec::new(), ASCII_MONO, GraphMode::Boxplot, 1.0, 1, (14, 5));
    let mut surface = renderer.panel_surface(0);
    renderer
        .draw_panel(&mut surface, &view("h"), &sample(1, Some(1.0)), Some(&histogram))
        .unwrap();

    assert_eq!(&surface.row_text(3)[2..12], "--  #   -|");
    let reversed: Vec<bool> = (2..12)
        .map(|x| surface.cell(3, x).unwrap().style.reverse)
        .collect();
    assert_eq!(
        reversed,
        vec![false, false, true, true, true, true, true, true, false, false]
    );
}

#[test]
fn resize_moves_panels_and_shrinks_log() {
    let mut renderer =
        TerminalRenderer::new(Vec::new(), ASCII_MONO, GraphMode::Sparkline, 1.0, 2, (80, 24));
    for n in 0..20 {
        renderer
            .log(LogLine::new().push(format!("reply {n}"), Style::PLAIN))
            .unwrap();
    }
    assert_eq!(renderer.log_region().lines().count(), 14);

    renderer.resize(60, 15).unwrap();
    assert_eq!(renderer.layout().log_height, 5);
    assert_eq!(renderer.log_region().lines().count(), 5);
    let surface = renderer.panel_surface(1);
    assert_eq!(surface.top(), 10);
    assert_eq!(surface.width(), 60);
    assert_eq!(surface.height(), PANEL_HEIGHT);
}

#[test]
fn enter_and_leave_emit_escape_sequences() {
    let mut renderer =
        TerminalRenderer::new(Vec::new(), ASCII_MONO, GraphMode::Sparkline, 1.0, 1, (20, 10));
    renderer.enter().unwrap();
    renderer.leave().unwrap();
    let written = String::from_utf8_lossy(renderer.writer()).to_string();
    assert!(written.contains("\x1b[?1049h"));
    assert!(written.contains("\x1b[?1049l"));
}
