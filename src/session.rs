use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Completed,
    WrongStep { expected: usize, got: usize },
    TimedOut { step: usize },
}

impl AttemptOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Completed => "completed",
            AttemptOutcome::WrongStep { .. } => "wrong_step",
            AttemptOutcome::TimedOut { .. } => "timed_out",
        }
    }

    /// Extra detail column: what went wrong, empty on completion.
    fn detail(&self) -> String {
        match self {
            AttemptOutcome::Completed => String::new(),
            AttemptOutcome::WrongStep { expected, got } => {
                format!("expected {} got {}", expected, got)
            }
            AttemptOutcome::TimedOut { step } => format!("at step {}", step),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Local>,
    pub checklist: String,
    pub outcome: AttemptOutcome,
    pub steps_completed: usize,
    pub total_steps: usize,
    pub duration_secs: f64,
}

/// Append-only CSV log of finished attempts, one row per failed or
/// completed run.
#[derive(Debug, Clone)]
pub struct AttemptLog {
    path: PathBuf,
}

impl AttemptLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &AttemptRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record([
                "date",
                "checklist",
                "outcome",
                "detail",
                "steps_completed",
                "total_steps",
                "duration_secs",
            ])?;
        }

        writer.write_record([
            record.timestamp.format("%c").to_string(),
            record.checklist.clone(),
            record.outcome.as_str().to_string(),
            record.outcome.detail(),
            record.steps_completed.to_string(),
            record.total_steps.to_string(),
            format!("{:.2}", record.duration_secs),
        ])?;

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(outcome: AttemptOutcome, steps_completed: usize) -> AttemptRecord {
        AttemptRecord {
            timestamp: Local::now(),
            checklist: "ERJ 170/175 Overhead Panel".to_string(),
            outcome,
            steps_completed,
            total_steps: 8,
            duration_secs: 12.34,
        }
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attempts.csv");
        let log = AttemptLog::new(&path);

        log.append(&record(AttemptOutcome::Completed, 8)).unwrap();
        log.append(&record(AttemptOutcome::TimedOut { step: 3 }, 3))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,checklist,outcome"));
        assert!(lines[1].contains("completed"));
        assert!(lines[2].contains("timed_out"));
        assert!(lines[2].contains("at step 3"));
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state").join("attempts.csv");
        let log = AttemptLog::new(&path);

        log.append(&record(AttemptOutcome::WrongStep { expected: 2, got: 5 }, 2))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("expected 2 got 5"));
    }

    #[test]
    fn test_checklist_names_are_quoted_safely() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attempts.csv");
        let log = AttemptLog::new(&path);

        let mut rec = record(AttemptOutcome::Completed, 8);
        rec.checklist = "with, comma".to_string();
        log.append(&rec).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"with, comma\""));
    }

    #[test]
    fn test_outcome_strings() {
        assert_eq!(AttemptOutcome::Completed.as_str(), "completed");
        assert_eq!(
            AttemptOutcome::WrongStep { expected: 0, got: 1 }.as_str(),
            "wrong_step"
        );
        assert_eq!(AttemptOutcome::TimedOut { step: 0 }.as_str(), "timed_out");
        assert_eq!(AttemptOutcome::Completed.detail(), "");
    }
}
