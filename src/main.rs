pub mod app_dirs;
pub mod checklist;
pub mod config;
pub mod runtime;
pub mod session;
pub mod trainer;
pub mod ui;
pub mod util;
pub mod voice;

use crate::{
    app_dirs::AppDirs,
    checklist::{Checklist, ChecklistError, ConfirmMode},
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, Runner, TrainerEvent, TICK_RATE_MS},
    session::{AttemptLog, AttemptOutcome, AttemptRecord},
    trainer::{Outcome, Trainer},
    util::hotspot_index,
    voice::{NullVoice, SystemVoice, VoiceSink},
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fmt::Write as _,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// interactive cockpit checklist trainer with spoken callouts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal checklist trainer: each step is narrated aloud, confirmed manually or via a panel hotspot, and enforced strictly in order with a per-step countdown. Any wrong or late input restarts the checklist from the top."
)]
pub struct Cli {
    /// path to a custom checklist json file
    #[clap(short = 'c', long)]
    checklist: Option<PathBuf>,

    /// seconds allowed per step before the run fails
    #[clap(short = 't', long)]
    timeout_secs: Option<u64>,

    /// disable spoken narration
    #[clap(short = 'm', long)]
    mute: bool,

    /// text-to-speech program used for narration
    #[clap(long)]
    voice_program: Option<String>,

    /// print the resolved checklist and exit
    #[clap(long)]
    list: bool,
}

/// File-config values with CLI flags layered on top.
fn effective_config(cli: &Cli, mut cfg: Config) -> Config {
    if let Some(secs) = cli.timeout_secs {
        cfg.timeout_secs = secs;
    }
    if cli.mute {
        cfg.mute = true;
    }
    if let Some(program) = &cli.voice_program {
        cfg.voice_program = program.clone();
    }
    if let Some(path) = &cli.checklist {
        cfg.checklist = Some(path.display().to_string());
    }
    cfg
}

fn load_checklist(cfg: &Config) -> Result<Checklist, ChecklistError> {
    match &cfg.checklist {
        Some(path) => Checklist::from_file(path),
        None => Ok(Checklist::erj170_overhead()),
    }
}

/// Plain-text rendering of a checklist for `--list` (works without a tty).
fn checklist_listing(checklist: &Checklist) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", checklist.name);
    for (index, step) in checklist.steps.iter().enumerate() {
        let mode = match step.mode {
            ConfirmMode::Manual => "manual",
            ConfirmMode::Panel => "panel",
        };
        let _ = writeln!(out, "{}. [{}] {}", index, mode, step.label);
    }
    for hotspot in &checklist.hotspots {
        let _ = writeln!(
            out,
            "hotspot '{}' -> step {} (top {}%, left {}%)",
            hotspot.label, hotspot.step_index, hotspot.top, hotspot.left
        );
    }
    out
}

#[derive(Debug)]
pub struct App {
    pub trainer: Trainer,
    pub selected: usize,
    attempt_log: Option<AttemptLog>,
}

impl App {
    pub fn new(cfg: &Config) -> Result<Self, ChecklistError> {
        let checklist = load_checklist(cfg)?;
        let voice: Box<dyn VoiceSink> = if cfg.mute {
            Box::new(NullVoice)
        } else {
            Box::new(SystemVoice::new(&cfg.voice_program))
        };
        let trainer = Trainer::new(checklist, cfg.timeout_secs * 1000, voice);
        Ok(Self::with_parts(
            trainer,
            AppDirs::attempt_log_path().map(AttemptLog::new),
        ))
    }

    pub fn with_parts(trainer: Trainer, attempt_log: Option<AttemptLog>) -> Self {
        Self {
            trainer,
            selected: 0,
            attempt_log,
        }
    }

    /// Enter on the selection. Inert for panel steps (those take the
    /// hotspot) and for steps already verified this run.
    pub fn confirm_selected(&mut self) {
        let index = self.selected;
        if self.trainer.is_complete()
            || self.trainer.is_verified(index)
            || !self.trainer.is_manual_step(index)
        {
            return;
        }
        self.submit(index);
    }

    /// Hotspot activation by its digit key, resolved to the target step.
    pub fn activate_hotspot(&mut self, index: usize) {
        let target = self
            .trainer
            .checklist()
            .hotspots
            .get(index)
            .map(|h| h.step_index);
        if let Some(step_index) = target {
            self.submit(step_index);
        }
    }

    fn submit(&mut self, step_index: usize) {
        let expected = self.trainer.current_step();
        match self.trainer.verify(step_index) {
            Outcome::Correct => {
                if self.trainer.is_complete() {
                    self.log_attempt(AttemptOutcome::Completed, self.trainer.checklist().len());
                }
            }
            Outcome::Incorrect => {
                self.log_attempt(
                    AttemptOutcome::WrongStep {
                        expected,
                        got: step_index,
                    },
                    expected,
                );
            }
        }
    }

    pub fn on_tick(&mut self) {
        let step = self.trainer.current_step();
        if let Some(Outcome::Incorrect) = self.trainer.on_tick() {
            self.log_attempt(AttemptOutcome::TimedOut { step }, step);
        }
    }

    fn log_attempt(&self, outcome: AttemptOutcome, steps_completed: usize) {
        if let Some(log) = &self.attempt_log {
            let record = AttemptRecord {
                timestamp: Local::now(),
                checklist: self.trainer.checklist().name.clone(),
                outcome,
                steps_completed,
                total_steps: self.trainer.checklist().len(),
                duration_secs: self.trainer.last_attempt_secs().unwrap_or(0.0),
            };
            let _ = log.append(&record);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();
    let cfg = effective_config(&cli, store.load());

    if cli.list {
        let checklist = match load_checklist(&cfg) {
            Ok(checklist) => checklist,
            Err(e) => {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, e.to_string()).exit();
            }
        };
        print!("{}", checklist_listing(&checklist));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = match App::new(&cfg) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, e.to_string()).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.trainer.start();
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Persist the effective settings for the next session.
    let _ = store.save(&cfg);

    result
}

#[derive(Debug, PartialEq)]
enum KeyAction {
    Continue,
    Quit,
}

fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }
        KeyCode::Up => {
            app.selected = app.selected.saturating_sub(1);
        }
        KeyCode::Down => {
            let last = app.trainer.checklist().len().saturating_sub(1);
            app.selected = (app.selected + 1).min(last);
        }
        KeyCode::Enter => {
            app.confirm_selected();
        }
        KeyCode::Char('r') if app.trainer.is_complete() => {
            app.trainer.restart();
            app.selected = 0;
        }
        KeyCode::Char(c) => {
            if let Some(index) = hotspot_index(c) {
                app.activate_hotspot(index);
            }
        }
        _ => {}
    }
    KeyAction::Continue
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let runner = Runner::new(events, Duration::from_millis(TICK_RATE_MS));

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            TrainerEvent::Tick => {
                app.on_tick();
                // Redraw on ticks only while the countdown display moves.
                if app.trainer.has_started() && !app.trainer.is_complete() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            TrainerEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            TrainerEvent::Key(key) => {
                if handle_key(app, key) == KeyAction::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
