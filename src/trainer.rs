use crate::checklist::{Checklist, ConfirmMode};
use crate::runtime::TICK_RATE_MS;
use crate::voice::VoiceSink;
use std::collections::HashSet;
use std::time::SystemTime;

/// Window after a step is narrated during which input is accepted.
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 15_000;

/// How long the failed banner holds before the checklist restarts.
pub const FAILURE_PAUSE_MS: u64 = 2_000;

pub const INCORRECT_STEP_MESSAGE: &str = "Incorrect step. Restarting checklist.";
pub const TIMEOUT_MESSAGE: &str = "Failed. Restarting checklist.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    Awaiting,
    Listening,
    Correct,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// The single live countdown. Owned as an `Option` by the trainer so
/// invalidation on every transition is explicit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    remaining_ms: f64,
}

impl Countdown {
    fn new(ms: u64) -> Self {
        Self {
            remaining_ms: ms as f64,
        }
    }

    /// Advance by one tick; true once the countdown has elapsed.
    fn on_tick(&mut self) -> bool {
        self.remaining_ms -= TICK_RATE_MS as f64;
        self.remaining_ms <= 0.0
    }

    pub fn seconds_remaining(&self) -> f64 {
        (self.remaining_ms / 1000.0).max(0.0)
    }
}

/// The checklist state machine: tracks progress through the ordered step
/// list, validates every confirmation against the current expected step,
/// drives the per-step countdown, and narrates through the voice sink.
///
/// Any wrong or untimely confirmation, and any elapsed countdown, is a full
/// restart to step 0 with no partial credit.
pub struct Trainer {
    checklist: Checklist,
    current_step: usize,
    status: Status,
    verified: HashSet<usize>,
    countdown: Option<Countdown>,
    voice: Box<dyn VoiceSink>,
    timeout_ms: u64,
    attempt_started_at: Option<SystemTime>,
    last_attempt_secs: Option<f64>,
}

impl Trainer {
    pub fn new(checklist: Checklist, timeout_ms: u64, voice: Box<dyn VoiceSink>) -> Self {
        Self {
            checklist,
            current_step: 0,
            status: Status::Awaiting,
            verified: HashSet::new(),
            countdown: None,
            voice,
            timeout_ms,
            attempt_started_at: None,
            last_attempt_secs: None,
        }
    }

    /// Begin the session: narrate step 0 and arm its countdown. Before this
    /// call the trainer sits in `Awaiting` with no side effects issued.
    pub fn start(&mut self) {
        if self.has_started() {
            return;
        }
        self.attempt_started_at = Some(SystemTime::now());
        self.enter_step();
    }

    /// Reset everything for a fresh attempt (after completion).
    pub fn restart(&mut self) {
        self.current_step = 0;
        self.status = Status::Awaiting;
        self.verified.clear();
        self.countdown = None;
        self.attempt_started_at = None;
        self.start();
    }

    /// Confirmation event from either origin: the manual control of a step,
    /// or a hotspot activation resolved to its target step by the view.
    pub fn verify(&mut self, input_step_index: usize) -> Outcome {
        if input_step_index == self.current_step && self.status == Status::Listening {
            self.countdown = None;
            self.verified.insert(input_step_index);
            self.status = Status::Correct;
            self.current_step += 1;
            if self.is_complete() {
                self.record_attempt_end();
            } else {
                // The finished step's narration must not overlap the next
                // step's; the final step's is allowed to play out.
                self.voice.cancel();
            }
            self.enter_step();
            Outcome::Correct
        } else {
            self.fail(INCORRECT_STEP_MESSAGE);
            Outcome::Incorrect
        }
    }

    /// Tick handler, called every `TICK_RATE_MS` by the event loop. Returns
    /// `Some(Outcome::Incorrect)` when the step countdown elapsed and the
    /// checklist reset.
    pub fn on_tick(&mut self) -> Option<Outcome> {
        let expired = match self.countdown.as_mut() {
            Some(countdown) => countdown.on_tick(),
            None => false,
        };
        if !expired {
            return None;
        }

        match self.status {
            Status::Listening => {
                self.fail(TIMEOUT_MESSAGE);
                Some(Outcome::Incorrect)
            }
            Status::Failed => {
                // Failure pause over; restart from the top.
                self.attempt_started_at = Some(SystemTime::now());
                self.enter_step();
                None
            }
            _ => None,
        }
    }

    /// One failure routine for both the wrong-step path and the timeout
    /// path; only the spoken message differs. Holds in `Failed` for the
    /// failure pause before step 0 is re-entered from `on_tick`.
    fn fail(&mut self, message: &str) {
        self.countdown = None;
        self.voice.cancel();
        self.status = Status::Failed;
        self.voice.speak(message);
        self.record_attempt_end();
        self.current_step = 0;
        self.verified.clear();
        self.countdown = Some(Countdown::new(FAILURE_PAUSE_MS));
    }

    fn enter_step(&mut self) {
        self.countdown = None;
        if self.is_complete() {
            // Session complete: no further narration or timer.
            return;
        }
        let label = self.checklist.steps[self.current_step].label.clone();
        self.voice.speak(&label);
        self.status = Status::Listening;
        self.countdown = Some(Countdown::new(self.timeout_ms));
    }

    fn record_attempt_end(&mut self) {
        self.last_attempt_secs = self
            .attempt_started_at
            .and_then(|t| t.elapsed().ok())
            .map(|d| d.as_secs_f64());
    }

    pub fn has_started(&self) -> bool {
        self.attempt_started_at.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.current_step >= self.checklist.len()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_verified(&self, step_index: usize) -> bool {
        self.verified.contains(&step_index)
    }

    pub fn verified(&self) -> &HashSet<usize> {
        &self.verified
    }

    pub fn seconds_remaining(&self) -> Option<f64> {
        match self.status {
            Status::Listening => self.countdown.map(|c| c.seconds_remaining()),
            _ => None,
        }
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// Whether the step under the cursor takes a manual confirmation.
    pub fn is_manual_step(&self, step_index: usize) -> bool {
        self.checklist
            .steps
            .get(step_index)
            .map(|s| s.mode == ConfirmMode::Manual)
            .unwrap_or(false)
    }

    /// Duration of the most recently finished attempt (failed or complete).
    pub fn last_attempt_secs(&self) -> Option<f64> {
        self.last_attempt_secs
    }
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("checklist", &self.checklist.name)
            .field("current_step", &self.current_step)
            .field("status", &self.status)
            .field("verified", &self.verified)
            .field("countdown", &self.countdown)
            .finish()
    }
}
