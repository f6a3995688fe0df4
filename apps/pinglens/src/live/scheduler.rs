use crate::live::context::TargetContext;
use crate::live::frontend::Frontend;
use crate::live::signal::StopFlag;
use anyhow::Result;
use pinglens_model::{RoundLimit, RunConfig};
use pinglens_probe::{ProbeEngine, RoundError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Source of time for the round loop.
pub trait Pacer {
    fn now(&self) -> Instant;
    /// Sleeps until `deadline` or until `stop` is raised, whichever is first.
    fn sleep_until(&mut self, deadline: Instant, stop: &StopFlag);
}

pub struct SystemPacer;

impl Pacer for SystemPacer {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant, stop: &StopFlag) {
        // Early wakeups re-wait for the remainder only.
        while !stop.is_raised() {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            stop.wait_timeout(deadline - now);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Draining,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct ScheduleState {
    pub phase: Phase,
    pub round_begin: Option<Instant>,
    pub round_end: Option<Instant>,
    pub remaining: RoundLimit,
    pub rounds_completed: u64,
    /// Rounds whose work took at least a full interval.
    pub overruns: u64,
}

/// Drift-corrected round loop: round k+1 starts `interval` after round k
/// started, or immediately when round k overran.
pub struct Scheduler<E, F, P> {
    interval: Duration,
    engine: E,
    frontend: F,
    pacer: P,
    stop: StopFlag,
    state: ScheduleState,
}

impl<E: ProbeEngine, F: Frontend, P: Pacer> Scheduler<E, F, P> {
    pub fn new(config: &RunConfig, engine: E, frontend: F, pacer: P, stop: StopFlag) -> Self {
        Self {
            interval: config.interval(),
            engine,
            frontend,
            pacer,
            stop,
            state: ScheduleState {
                phase: Phase::Idle,
                round_begin: None,
                round_end: None,
                remaining: config.rounds,
                rounds_completed: 0,
                overruns: 0,
            },
        }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs rounds until the count is exhausted or a stop is requested. The
    /// frontend is always finished, even when a round fails.
    pub fn run(&mut self, contexts: &mut [TargetContext]) -> Result<()> {
        self.state.phase = Phase::Running;
        let result = self
            .frontend
            .begin(contexts)
            .and_then(|()| self.run_rounds(contexts));

        self.state.phase = Phase::Draining;
        let finished = self.frontend.finish();
        self.state.phase = Phase::Stopped;
        info!(
            rounds = self.state.rounds_completed,
            overruns = self.state.overruns,
            "probe loop stopped"
        );

        result?;
        finished
    }

    fn run_rounds(&mut self, contexts: &mut [TargetContext]) -> Result<()> {
        while !self.stop.is_raised() && !self.state.remaining.is_exhausted() {
            let begin = self.pacer.now();
            self.state.round_begin = Some(begin);

            match self.engine.issue_round() {
                Ok(()) => {}
                Err(RoundError::Retryable(reason)) => {
                    debug!(%reason, "reissuing probe round");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            self.dispatch(contexts)?;
            self.state.rounds_completed += 1;
            self.frontend.poll_resize(contexts)?;

            if self.state.remaining.is_last() {
                self.state.remaining.decrement();
                break;
            }

            let now = self.pacer.now();
            self.state.round_end = Some(now);
            let wake = begin + self.interval;
            if wake > now {
                self.pacer.sleep_until(wake, &self.stop);
            } else {
                self.state.overruns += 1;
                debug!(late_by = ?(now - wake), "round overran its interval");
            }

            self.frontend.poll_resize(contexts)?;
            self.state.remaining.decrement();
        }
        Ok(())
    }

    fn dispatch(&mut self, contexts: &mut [TargetContext]) -> Result<()> {
        for (index, reply) in self.engine.replies().iter().enumerate() {
            let Some(ctx) = contexts.get_mut(index) else {
                warn!(index, host = %reply.hostname, "reply for unknown target");
                continue;
            };
            let sample = reply.to_sample(index);
            ctx.apply(&sample);
            self.frontend.on_sample(ctx, &sample)?;
        }
        Ok(())
    }
}
