use crate::live::context::TargetContext;
use crate::live::signal::StopFlag;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Color;
use crossterm::terminal;
use pinglens_model::{RunConfig, Sample};
use pinglens_render::{deviation_tier, reply_line, timeout_line, LogLine, RenderError, TerminalRenderer};
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::{debug, warn};

const TIER_COLORS: [Color; 3] = [Color::Green, Color::Yellow, Color::Red];

/// Presentation side of a run, driven by the scheduler.
pub trait Frontend {
    fn begin(&mut self, contexts: &mut [TargetContext]) -> Result<()>;
    fn on_sample(&mut self, ctx: &mut TargetContext, sample: &Sample) -> Result<()>;
    /// Applies a pending terminal geometry change, if any. Must not block.
    fn poll_resize(&mut self, contexts: &mut [TargetContext]) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

fn log_line(ctx: &TargetContext, sample: &Sample, configured_qos: u8, color: bool) -> LogLine {
    match sample.latency_ms {
        Some(latency_ms) => {
            let show_qos = sample.qos != 0 || configured_qos != 0;
            let time_color = color.then(|| {
                TIER_COLORS[deviation_tier(latency_ms, ctx.stats.average(), ctx.stats.stddev())]
            });
            // Engines that cannot observe the received byte report 0.
            let shown = Sample {
                qos: if sample.qos != 0 { sample.qos } else { configured_qos },
                ..sample.clone()
            };
            reply_line(&ctx.host, &ctx.address, &shown, show_qos, time_color)
        }
        None => timeout_line(&ctx.host, &ctx.address, sample, color),
    }
}

/// Line-oriented output for pipes and `--plain`.
pub struct PlainFrontend<W: Write> {
    out: W,
    configured_qos: u8,
    payload_len: usize,
}

impl<W: Write> PlainFrontend<W> {
    pub fn new(out: W, configured_qos: u8, payload_len: usize) -> Self {
        Self {
            out,
            configured_qos,
            payload_len,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Frontend for PlainFrontend<W> {
    fn begin(&mut self, contexts: &mut [TargetContext]) -> Result<()> {
        for ctx in contexts.iter() {
            writeln!(
                self.out,
                "PING {} ({}) {} bytes of data.",
                ctx.host, ctx.address, self.payload_len
            )?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn on_sample(&mut self, ctx: &mut TargetContext, sample: &Sample) -> Result<()> {
        let line = log_line(ctx, sample, self.configured_qos, false);
        writeln!(self.out, "{}", line.plain_text())?;
        self.out.flush()?;
        Ok(())
    }

    fn poll_resize(&mut self, _contexts: &mut [TargetContext]) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Terminal events gathered since the last poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingEvents {
    pub resize: Option<(u16, u16)>,
    pub interrupt: bool,
}

pub trait TerminalEvents {
    fn drain(&mut self) -> io::Result<PendingEvents>;
}

fn is_interrupt_key(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL)
    )
}

fn collect_events(events: impl IntoIterator<Item = Event>) -> PendingEvents {
    let mut pending = PendingEvents::default();
    for event in events {
        match event {
            Event::Resize(cols, rows) => pending.resize = Some((cols, rows)),
            ref key if is_interrupt_key(key) => pending.interrupt = true,
            _ => {}
        }
    }
    pending
}

/// Terminal input for the full-screen view.
///
/// The terminal is switched to raw mode so typed keys are not echoed over the
/// panels. Raw mode also stops Ctrl-C from raising SIGINT, so a reader thread
/// raises the stop flag itself and forwards everything else to `drain`.
pub struct CrosstermEvents {
    events: Receiver<Event>,
}

impl CrosstermEvents {
    pub fn spawn(stop: StopFlag) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let (tx, events) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("pinglens-input".to_string())
            .spawn(move || {
                while let Ok(event) = event::read() {
                    if is_interrupt_key(&event) {
                        stop.raise();
                    }
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            });
        if let Err(err) = reader {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { events })
    }
}

impl TerminalEvents for CrosstermEvents {
    fn drain(&mut self) -> io::Result<PendingEvents> {
        Ok(collect_events(self.events.try_iter()))
    }
}

impl Drop for CrosstermEvents {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {err}");
        }
    }
}

/// Full-screen panels plus the scrolling log.
pub struct TerminalFrontend<W: Write, V: TerminalEvents> {
    renderer: TerminalRenderer<W>,
    events: V,
    stop: StopFlag,
    percentile: f64,
    configured_qos: u8,
}

impl<W: Write, V: TerminalEvents> TerminalFrontend<W, V> {
    pub fn new(
        out: W,
        events: V,
        config: &RunConfig,
        target_count: usize,
        size: (u16, u16),
        stop: StopFlag,
    ) -> Self {
        Self {
            renderer: TerminalRenderer::new(
                out,
                config.caps,
                config.graph,
                config.interval_secs,
                target_count,
                size,
            ),
            events,
            stop,
            percentile: config.percentile,
            configured_qos: config.qos,
        }
    }

    pub fn renderer(&self) -> &TerminalRenderer<W> {
        &self.renderer
    }

    /// Relayouts and hands every target a fresh panel surface.
    pub fn apply_resize(
        &mut self,
        contexts: &mut [TargetContext],
        cols: u16,
        rows: u16,
    ) -> Result<()> {
        debug!(cols, rows, "terminal resized");
        self.renderer.resize(cols, rows)?;
        self.assign_panels(contexts)
    }

    /// Gives every target a new surface with its box and current text drawn.
    fn assign_panels(&mut self, contexts: &mut [TargetContext]) -> Result<()> {
        for ctx in contexts.iter_mut() {
            let mut surface = self.renderer.panel_surface(ctx.index);
            self.renderer
                .draw_panel_frame(&mut surface, &ctx.panel_view(self.percentile))?;
            ctx.panel = Some(surface);
        }
        Ok(())
    }
}

impl<W: Write, V: TerminalEvents> Frontend for TerminalFrontend<W, V> {
    fn begin(&mut self, contexts: &mut [TargetContext]) -> Result<()> {
        self.renderer.enter()?;
        // Discard input typed before the screen came up.
        let pending = self.events.drain()?;
        if pending.interrupt {
            self.stop.raise();
        }
        match pending.resize {
            Some((cols, rows)) => self.apply_resize(contexts, cols, rows),
            None => self.assign_panels(contexts),
        }
    }

    fn on_sample(&mut self, ctx: &mut TargetContext, sample: &Sample) -> Result<()> {
        let color = self.renderer.caps().color;
        self.renderer
            .log(log_line(ctx, sample, self.configured_qos, color))?;

        let Some(mut surface) = ctx.panel.take() else {
            return Ok(());
        };
        let view = ctx.panel_view(self.percentile);
        let drawn = self
            .renderer
            .draw_panel(&mut surface, &view, sample, ctx.stats.histogram());
        ctx.panel = Some(surface);

        match drawn {
            Ok(()) => Ok(()),
            Err(RenderError::TooNarrow { width }) => {
                warn!(host = %ctx.host, width, "panel too narrow for a graph");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn poll_resize(&mut self, contexts: &mut [TargetContext]) -> Result<()> {
        let pending = self.events.drain()?;
        if pending.interrupt {
            self.stop.raise();
        }
        if let Some((cols, rows)) = pending.resize {
            self.apply_resize(contexts, cols, rows)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.renderer.leave()?;
        Ok(())
    }
}
