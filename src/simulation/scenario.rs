//! TOML scenario files.
//!
//! ```toml
//! name = "open, then snap higher"
//! viewport_height = 800
//! snap_points = [200, 500]
//!
//! [collaborators]
//! activation_ms = 30
//!
//! [[step]]
//! at_ms = 0
//! action = "measure"
//! header = 40
//! content = 400
//! footer = 60
//!
//! [[step]]
//! at_ms = 0
//! action = "open"
//!
//! [[step]]
//! at_ms = 1500
//! action = "snap"
//! height = 480
//! ```
//!
//! Without `snap_points` the sheet fits its content.

use super::runtime::{Action, CollaboratorScript, ObserverScript, Simulation, SimulationSetup};
use super::transcript::Transcript;
use crate::config::ResolvedConfig;
use crate::sheet::Viewport;
use crate::snap::{FitContent, FixedPolicy, SnapPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors loading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("Failed to read scenario at {path}: {source}")]
    Read {
        /// Scenario path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid scenario.
    #[error("Invalid scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The scenario parsed but cannot run.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

fn default_settle_ms() -> u64 {
    2000
}

/// A timed host action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    /// When to perform the action.
    pub at_ms: u64,
    /// What to do.
    #[serde(flatten)]
    pub action: Action,
}

/// A scripted run of one sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Shown in the transcript header.
    pub name: String,
    /// Initial viewport height.
    pub viewport_height: f64,
    /// Max height override; falls back to the configured one.
    #[serde(default)]
    pub max_height: Option<f64>,
    /// Fixed snap points. Fits the content when absent.
    #[serde(default)]
    pub snap_points: Option<Vec<f64>>,
    /// Height to open at, with fixed snap points.
    #[serde(default)]
    pub initial: Option<f64>,
    /// Overrides the configured reduced-motion setting.
    #[serde(default)]
    pub reduced_motion: Option<bool>,
    /// How long to keep running after the last step.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Focus trap behavior.
    #[serde(default)]
    pub collaborators: CollaboratorScript,
    /// Observer behavior.
    #[serde(default)]
    pub observer: ObserverScript,
    /// Actions in any order; they run sorted by time.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse and validate a scenario.
    ///
    /// # Errors
    /// Invalid TOML or an unusable value.
    pub fn from_toml(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read, parse and validate a scenario file.
    ///
    /// # Errors
    /// The file cannot be read, or see [`from_toml`](Self::from_toml).
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "viewport_height must be positive, got {}",
                self.viewport_height
            )));
        }
        if self.initial.is_some() && self.snap_points.is_none() {
            return Err(ScenarioError::Invalid(
                "initial requires snap_points".to_string(),
            ));
        }
        Ok(())
    }

    /// The snap policy this scenario describes.
    pub fn policy(&self) -> Box<dyn SnapPolicy> {
        match &self.snap_points {
            Some(points) => {
                let fixed = FixedPolicy::new(points.clone());
                match self.initial {
                    Some(initial) => Box::new(fixed.with_initial(initial)),
                    None => Box::new(fixed),
                }
            }
            None => Box::new(FitContent),
        }
    }

    /// Runtime setup with `config` underneath the scenario's own overrides.
    pub fn setup(&self, config: &ResolvedConfig) -> SimulationSetup {
        let mut machine = config.machine;
        if let Some(reduced_motion) = self.reduced_motion {
            machine.reduced_motion = reduced_motion;
        }
        SimulationSetup {
            machine,
            spring: config.spring,
            viewport: Viewport {
                height: self.viewport_height,
                max_height: self.max_height.or(config.max_height),
            },
            collaborators: self.collaborators.clone(),
            observer: self.observer.clone(),
        }
    }

    /// Replay every step and collect what the host observed.
    ///
    /// A fatal error ends the run early and is the last transcript entry.
    pub fn run(&self, config: &ResolvedConfig) -> Transcript {
        info!(name = %self.name, steps = self.steps.len(), "Running scenario");
        let mut sim = Simulation::new(self.setup(config), self.policy());

        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.at_ms);
        let end = steps
            .last()
            .map_or(0, |step| step.at_ms)
            .saturating_add(self.settle_ms);

        let outcome = steps
            .iter()
            .try_for_each(|step| {
                sim.run_until(step.at_ms)?;
                sim.apply(&step.action)
            })
            .and_then(|()| sim.run_until(end));

        if let Err(err) = outcome {
            warn!(at = sim.now(), "Scenario ended by a fatal error: {}", err);
            sim.record_fatal(&err);
        }

        Transcript {
            name: self.name.clone(),
            entries: sim.entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::DragPhase;
    use crate::model::TransitionKind;

    const BASIC: &str = r#"
name = "basic"
viewport_height = 800
snap_points = [200, 500]

[[step]]
at_ms = 0
action = "measure"
header = 40
content = 400
footer = 60

[[step]]
at_ms = 0
action = "open"
"#;

    #[test]
    fn parses_steps_with_flattened_actions() {
        let scenario = Scenario::from_toml(BASIC).unwrap();

        assert_eq!(scenario.settle_ms, 2000);
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(
            scenario.steps[1].action,
            Action::Open { source: None }
        );
    }

    #[test]
    fn parses_drag_frames_and_observer_holds() {
        let scenario = Scenario::from_toml(
            r#"
name = "drag"
viewport_height = 600

[observer]
hold = "snap"
hold_ms = 50

[[step]]
at_ms = 10
action = "drag"
phase = "end"
delta = -40
velocity = 0.2
direction = "down"
"#,
        )
        .unwrap();

        assert_eq!(scenario.observer.hold, Some(TransitionKind::Snap));
        let Action::Drag(frame) = scenario.steps[0].action else {
            panic!("expected a drag step");
        };
        assert_eq!(frame.phase, DragPhase::End);
        assert_eq!(frame.delta, -40.0);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = Scenario::from_toml("name = \"x\"\nviewport_height = 1\ncolour = 3");
        assert!(matches!(result, Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn rejects_non_positive_viewport() {
        let result = Scenario::from_toml("name = \"x\"\nviewport_height = 0");
        assert!(matches!(result, Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn scenario_reduced_motion_overrides_config() {
        let mut scenario = Scenario::from_toml(BASIC).unwrap();
        scenario.reduced_motion = Some(true);

        let setup = scenario.setup(&ResolvedConfig::default());

        assert!(setup.machine.reduced_motion);
        assert_eq!(setup.viewport.height, 800.0);
    }

    #[test]
    fn run_produces_a_named_transcript() {
        let transcript = Scenario::from_toml(BASIC)
            .unwrap()
            .run(&ResolvedConfig::default());

        assert_eq!(transcript.name, "basic");
        assert_eq!(
            transcript.lifecycle_lines(),
            ["start open (custom)", "end open (custom)"]
        );
        assert_eq!(transcript.fatal(), None);
    }
}
