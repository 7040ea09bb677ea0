use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

/// Narration output for the trainer.
///
/// `speak` is fire-and-forget: utterances play in the order they were
/// requested. `cancel` stops whatever is currently playing and discards
/// anything still queued.
pub trait VoiceSink {
    fn speak(&mut self, text: &str);
    fn cancel(&mut self);
}

pub const DEFAULT_VOICE_PROGRAM: &str = "espeak-ng";

/// Speaks through an external text-to-speech program, one process per
/// utterance, run sequentially on a worker thread.
pub struct SystemVoice {
    tx: Option<Sender<(u64, String)>>,
    epoch: Arc<AtomicU64>,
    playing: Arc<Mutex<Option<Child>>>,
}

impl SystemVoice {
    pub fn new(program: &str) -> Self {
        let (tx, rx) = mpsc::channel::<(u64, String)>();
        let epoch = Arc::new(AtomicU64::new(0));
        let playing = Arc::new(Mutex::new(None::<Child>));

        let program = program.to_string();
        let worker_epoch = Arc::clone(&epoch);
        let worker_playing = Arc::clone(&playing);

        thread::spawn(move || {
            for (generation, text) in rx {
                // Skip anything queued before the most recent cancel.
                if generation < worker_epoch.load(Ordering::SeqCst) {
                    continue;
                }

                let spawned = Command::new(&program)
                    .arg(&text)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn();

                // Narration is best-effort; a missing tts program mutes it.
                let child = match spawned {
                    Ok(child) => child,
                    Err(_) => continue,
                };

                if let Ok(mut slot) = worker_playing.lock() {
                    *slot = Some(child);
                }

                // Poll until the utterance finishes or cancel() empties the
                // slot after killing the process.
                loop {
                    let done = match worker_playing.lock() {
                        Ok(mut slot) => match slot.as_mut() {
                            None => true,
                            Some(child) => match child.try_wait() {
                                Ok(None) => false,
                                Ok(Some(_)) | Err(_) => {
                                    slot.take();
                                    true
                                }
                            },
                        },
                        Err(_) => true,
                    };
                    if done {
                        break;
                    }
                    thread::sleep(std::time::Duration::from_millis(25));
                }
            }
        });

        Self {
            tx: Some(tx),
            epoch,
            playing,
        }
    }
}

impl VoiceSink for SystemVoice {
    fn speak(&mut self, text: &str) {
        if let Some(tx) = &self.tx {
            let generation = self.epoch.load(Ordering::SeqCst);
            let _ = tx.send((generation, text.to_string()));
        }
    }

    fn cancel(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.playing.lock() {
            if let Some(mut child) = slot.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

impl Drop for SystemVoice {
    fn drop(&mut self) {
        self.cancel();
        // Closing the channel ends the worker loop.
        self.tx.take();
    }
}

/// Mute mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVoice;

impl VoiceSink for NullVoice {
    fn speak(&mut self, _text: &str) {}
    fn cancel(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    Spoke(String),
    Canceled,
}

/// Records every narration request so tests can assert exact sequences.
pub struct RecordingVoice {
    log: Arc<Mutex<Vec<VoiceEvent>>>,
}

impl RecordingVoice {
    pub fn new() -> (Self, Arc<Mutex<Vec<VoiceEvent>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl VoiceSink for RecordingVoice {
    fn speak(&mut self, text: &str) {
        if let Ok(mut log) = self.log.lock() {
            log.push(VoiceEvent::Spoke(text.to_string()));
        }
    }

    fn cancel(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.push(VoiceEvent::Canceled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_voice_captures_order() {
        let (mut voice, log) = RecordingVoice::new();

        voice.speak("first");
        voice.cancel();
        voice.speak("second");

        let events = log.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                VoiceEvent::Spoke("first".to_string()),
                VoiceEvent::Canceled,
                VoiceEvent::Spoke("second".to_string()),
            ]
        );
    }

    #[test]
    fn test_null_voice_is_silent() {
        let mut voice = NullVoice;
        voice.speak("nothing happens");
        voice.cancel();
    }

    #[test]
    fn test_system_voice_missing_program_does_not_panic() {
        // Spawn failures are swallowed; speak/cancel stay fire-and-forget.
        let mut voice = SystemVoice::new("definitely-not-a-real-tts-binary");
        voice.speak("hello");
        voice.cancel();
        voice.speak("world");
    }
}
