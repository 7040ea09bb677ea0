use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use paneldrill::checklist::Checklist;
use paneldrill::runtime::{Runner, TestEventSource, TrainerEvent};
use paneldrill::trainer::{Outcome, Status, Trainer, INCORRECT_STEP_MESSAGE, TIMEOUT_MESSAGE};
use paneldrill::voice::{RecordingVoice, VoiceEvent};

// Headless integration using the internal runtime + Trainer without a TTY.
// Key events carry the step index to verify, mirroring how the binary maps
// input to `verify` calls.

fn digit_key(step_index: usize) -> TrainerEvent {
    let c = char::from_digit(step_index as u32, 10).unwrap();
    TrainerEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn recording_trainer(timeout_ms: u64) -> (Trainer, std::sync::Arc<std::sync::Mutex<Vec<VoiceEvent>>>) {
    let (voice, log) = RecordingVoice::new();
    let mut trainer = Trainer::new(Checklist::erj170_overhead(), timeout_ms, Box::new(voice));
    trainer.start();
    (trainer, log)
}

#[test]
fn headless_full_run_completes() {
    let (mut trainer, log) = recording_trainer(15_000);

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, Duration::from_millis(5));

    // Confirm every step in order.
    for step_index in 0..8 {
        tx.send(digit_key(step_index)).unwrap();
    }

    for _ in 0..200u32 {
        match runner.step() {
            TrainerEvent::Tick => {
                trainer.on_tick();
            }
            TrainerEvent::Resize => {}
            TrainerEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    let step_index = c.to_digit(10).unwrap() as usize;
                    assert_eq!(trainer.verify(step_index), Outcome::Correct);
                }
            }
        }
        if trainer.is_complete() {
            break;
        }
    }

    assert!(trainer.is_complete(), "all eight steps should have verified");
    assert_eq!(trainer.current_step(), 8);
    assert_eq!(trainer.status(), Status::Correct);
    assert!((0..8).all(|i| trainer.is_verified(i)));

    // Every step label was narrated, in checklist order.
    let spoken: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            VoiceEvent::Spoke(text) => Some(text.clone()),
            VoiceEvent::Canceled => None,
        })
        .collect();
    let labels: Vec<String> = trainer
        .checklist()
        .steps
        .iter()
        .map(|s| s.label.clone())
        .collect();
    assert_eq!(spoken, labels);
}

#[test]
fn headless_wrong_step_resets_checklist() {
    let (mut trainer, log) = recording_trainer(15_000);

    trainer.verify(0);
    trainer.verify(1);
    assert_eq!(trainer.current_step(), 2);

    // Jumping ahead to step 5 fails the whole run.
    assert_eq!(trainer.verify(5), Outcome::Incorrect);

    assert_eq!(trainer.current_step(), 0);
    assert!(trainer.verified().is_empty());
    assert_eq!(trainer.status(), Status::Failed);
    assert_eq!(
        log.lock().unwrap().last(),
        Some(&VoiceEvent::Spoke(INCORRECT_STEP_MESSAGE.to_string()))
    );
}

#[test]
fn headless_timeout_resets_checklist() {
    // 1s window; ticks advance the countdown by the fixed tick interval.
    let (mut trainer, log) = recording_trainer(1_000);

    let (_tx, rx) = mpsc::channel::<TrainerEvent>();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, Duration::from_millis(2));

    let mut timed_out = false;
    for _ in 0..50u32 {
        if let TrainerEvent::Tick = runner.step() {
            if trainer.on_tick() == Some(Outcome::Incorrect) {
                timed_out = true;
                break;
            }
        }
    }

    assert!(timed_out, "countdown should elapse with no input");
    assert_eq!(trainer.current_step(), 0);
    assert!(trainer.verified().is_empty());
    assert_eq!(trainer.status(), Status::Failed);
    assert_eq!(
        log.lock().unwrap().last(),
        Some(&VoiceEvent::Spoke(TIMEOUT_MESSAGE.to_string()))
    );
}

#[test]
fn headless_failure_pause_then_relisten() {
    let (mut trainer, log) = recording_trainer(15_000);

    trainer.verify(3);
    assert_eq!(trainer.status(), Status::Failed);

    // Drive ticks until the failure pause ends and step 0 re-enters.
    for _ in 0..50u32 {
        trainer.on_tick();
        if trainer.status() == Status::Listening {
            break;
        }
    }

    assert_eq!(trainer.status(), Status::Listening);
    assert_eq!(trainer.current_step(), 0);
    assert_eq!(
        log.lock().unwrap().last(),
        Some(&VoiceEvent::Spoke("Landing Gear – Chocked".to_string()))
    );
}

#[test]
fn headless_progress_is_monotonic() {
    let (mut trainer, _log) = recording_trainer(15_000);

    for k in 0..8 {
        assert_eq!(trainer.current_step(), k);
        trainer.verify(k);
        assert_eq!(trainer.current_step(), k + 1);
        let mut expected: Vec<usize> = (0..=k).collect();
        expected.sort_unstable();
        let mut actual: Vec<usize> = trainer.verified().iter().copied().collect();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }
}
