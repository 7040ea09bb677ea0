use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::Path;

static CHECKLIST_DIR: Dir = include_dir!("src/checklists");

/// How a step gets confirmed: a manual "verified" control in the step list,
/// or an activation of the matching panel hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmMode {
    Manual,
    Panel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub label: String,
    #[serde(rename = "confirm")]
    pub mode: ConfirmMode,
}

/// A clickable region on the panel map. `top`/`left` are percentage
/// coordinates into the panel area; `step_index` points back into the
/// step sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotMapping {
    pub label: String,
    pub top: f64,
    pub left: f64,
    pub step_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub name: String,
    pub steps: Vec<Step>,
    pub hotspots: Vec<HotspotMapping>,
}

#[derive(Debug, PartialEq)]
pub enum ChecklistError {
    Empty,
    HotspotOutOfRange { hotspot: String, step_index: usize },
    HotspotOnManualStep { hotspot: String, step_index: usize },
    DuplicateHotspot { step_index: usize },
    Parse(String),
    Io(String),
}

impl fmt::Display for ChecklistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecklistError::Empty => write!(f, "checklist has no steps"),
            ChecklistError::HotspotOutOfRange { hotspot, step_index } => {
                write!(
                    f,
                    "hotspot '{}' points at step {} which does not exist",
                    hotspot, step_index
                )
            }
            ChecklistError::HotspotOnManualStep { hotspot, step_index } => {
                write!(
                    f,
                    "hotspot '{}' points at step {} which is manually confirmed",
                    hotspot, step_index
                )
            }
            ChecklistError::DuplicateHotspot { step_index } => {
                write!(f, "step {} has more than one hotspot", step_index)
            }
            ChecklistError::Parse(msg) => write!(f, "invalid checklist json: {}", msg),
            ChecklistError::Io(msg) => write!(f, "unable to read checklist: {}", msg),
        }
    }
}

impl Error for ChecklistError {}

impl Checklist {
    /// The built-in ERJ 170/175 overhead panel sequence.
    pub fn erj170_overhead() -> Self {
        let file = CHECKLIST_DIR
            .get_file("erj170_overhead.json")
            .expect("embedded checklist not found");

        let contents = file
            .contents_utf8()
            .expect("unable to interpret embedded checklist as a string");

        Self::from_json(contents).expect("embedded checklist is invalid")
    }

    /// Parse and validate a checklist from a json string.
    pub fn from_json(contents: &str) -> Result<Self, ChecklistError> {
        let checklist: Checklist =
            serde_json::from_str(contents).map_err(|e| ChecklistError::Parse(e.to_string()))?;
        checklist.validate()?;
        Ok(checklist)
    }

    /// Load a checklist override from disk (the `--checklist` flag).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChecklistError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ChecklistError::Io(e.to_string()))?;
        Self::from_json(&contents)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The hotspot confirming `step_index`, if that step has one.
    pub fn hotspot_for_step(&self, step_index: usize) -> Option<&HotspotMapping> {
        self.hotspots.iter().find(|h| h.step_index == step_index)
    }

    fn validate(&self) -> Result<(), ChecklistError> {
        if self.steps.is_empty() {
            return Err(ChecklistError::Empty);
        }

        let mut seen = HashSet::new();
        for hotspot in &self.hotspots {
            match self.steps.get(hotspot.step_index) {
                None => {
                    return Err(ChecklistError::HotspotOutOfRange {
                        hotspot: hotspot.label.clone(),
                        step_index: hotspot.step_index,
                    });
                }
                Some(step) if step.mode == ConfirmMode::Manual => {
                    return Err(ChecklistError::HotspotOnManualStep {
                        hotspot: hotspot.label.clone(),
                        step_index: hotspot.step_index,
                    });
                }
                Some(_) => {}
            }
            if !seen.insert(hotspot.step_index) {
                return Err(ChecklistError::DuplicateHotspot {
                    step_index: hotspot.step_index,
                });
            }
        }

        Ok(())
    }
}
