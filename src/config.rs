//! Scenario parameter sets and communication stem catalogs.
//!
//! The crate ships the parameter sets and communication audio stems used by
//! the published experiment as embedded JSON assets; both can be replaced
//! from user-supplied files.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fsutil;

const EMBEDDED_PARAMS: &str = include_str!("../assets/matbii_params.json");
const EMBEDDED_COMM_STEMS: &str = include_str!("../assets/matbii_comm_stems.json");

/// Task-load condition of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    High,
    Low,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::High => write!(f, "high"),
            Condition::Low => write!(f, "low"),
        }
    }
}

/// Scenario version within a condition. Each participant session uses a
/// different version of the same condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    A,
    B,
    C,
}

impl Version {
    pub const ALL: [Version; 3] = [Version::A, Version::B, Version::C];
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::A => write!(f, "a"),
            Version::B => write!(f, "b"),
            Version::C => write!(f, "c"),
        }
    }
}

/// Parameters controlling one generated scenario.
///
/// Immutable once validated; all timing fields are in seconds unless the
/// name says otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioParams {
    pub session_duration_minutes: u32,
    pub min_seconds_event_diff: u32,
    pub max_seconds_event_diff: u32,
    pub min_seconds_fail_fix_resman: u32,
    pub max_seconds_fail_fix_resman: u32,
    pub min_seconds_to_indicate_no_comm: u32,
    pub seconds_before_comm_stop: u32,
    pub seconds_after_comm_start: u32,
    pub n_pump_failures: usize,
    pub n_own_comm: usize,
    pub n_other_comm: usize,
    pub n_green_red_issues: usize,
    pub n_systems_up_down: usize,
    pub total_auto_minutes: u32,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            session_duration_minutes: 10,
            min_seconds_event_diff: 10,
            max_seconds_event_diff: 35,
            min_seconds_fail_fix_resman: 20,
            max_seconds_fail_fix_resman: 90,
            min_seconds_to_indicate_no_comm: 90,
            seconds_before_comm_stop: 30,
            seconds_after_comm_start: 5,
            n_pump_failures: 5,
            n_own_comm: 5,
            n_other_comm: 5,
            n_green_red_issues: 6,
            n_systems_up_down: 6,
            total_auto_minutes: 3,
        }
    }
}

impl ScenarioParams {
    pub fn session_duration_seconds(&self) -> u32 {
        self.session_duration_minutes * 60
    }

    pub fn total_tasks(&self) -> usize {
        self.n_pump_failures
            + self.n_own_comm
            + self.n_other_comm
            + self.n_green_red_issues
            + self.n_systems_up_down
    }

    /// Check every field for a valid range. Called before any schedule is
    /// built so an invalid configuration never produces output.
    pub fn validate(&self) -> Result<()> {
        if self.session_duration_minutes == 0 {
            return Err(Error::Config(
                "session_duration_minutes must be greater than 0".into(),
            ));
        }
        if self.min_seconds_event_diff == 0 {
            return Err(Error::Config(
                "min_seconds_event_diff must be greater than 0".into(),
            ));
        }
        if self.min_seconds_event_diff > self.max_seconds_event_diff {
            return Err(Error::Config(format!(
                "min_seconds_event_diff ({}) exceeds max_seconds_event_diff ({})",
                self.min_seconds_event_diff, self.max_seconds_event_diff
            )));
        }
        if self.total_tasks() == 0 {
            return Err(Error::Config(
                "at least one task is required across the five task counts".into(),
            ));
        }
        if self.min_seconds_fail_fix_resman == 0
            || self.min_seconds_fail_fix_resman >= self.max_seconds_fail_fix_resman
        {
            return Err(Error::Config(format!(
                "resman fail/fix interval [{}, {}) is empty",
                self.min_seconds_fail_fix_resman, self.max_seconds_fail_fix_resman
            )));
        }
        let session = self.session_duration_seconds();
        // Pump failures must leave room for the repair before the session
        // ends; the compliance check rejects anything past this cutoff.
        if self.min_seconds_fail_fix_resman + 1 >= session {
            return Err(Error::Config(format!(
                "min_seconds_fail_fix_resman ({}) does not fit in a {} minute session",
                self.min_seconds_fail_fix_resman, self.session_duration_minutes
            )));
        }
        // The tracking automation block needs a 5 s buffer on each side.
        if self.total_auto_minutes * 60 + 10 >= session {
            return Err(Error::Config(format!(
                "total_auto_minutes ({}) does not fit in a {} minute session",
                self.total_auto_minutes, self.session_duration_minutes
            )));
        }
        if self.seconds_before_comm_stop + self.seconds_after_comm_start >= session {
            return Err(Error::Config(
                "communication start/stop margins exceed the session duration".into(),
            ));
        }
        Ok(())
    }
}

/// The two parameter sets shipped with the experiment.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamsFile {
    #[serde(rename = "MATBII_HIGH_PARAMS")]
    pub high: ScenarioParams,
    #[serde(rename = "MATBII_LOW_PARAMS")]
    pub low: ScenarioParams,
}

impl ParamsFile {
    /// Parameter sets embedded in the binary.
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(EMBEDDED_PARAMS)
            .map_err(|e| Error::Config(format!("embedded parameter set: {e}")))
    }

    /// Load parameter sets from a user-supplied JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn for_condition(&self, condition: Condition) -> &ScenarioParams {
        match condition {
            Condition::High => &self.high,
            Condition::Low => &self.low,
        }
    }
}

/// Communication audio file stems per call sign, without the `.wav`
/// extension. Stems follow the `SHIP_RADIO_FREQ` naming of the recordings,
/// e.g. `OWN_COM2_124-550`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommStems {
    pub own: Vec<String>,
    pub other: Vec<String>,
}

impl CommStems {
    /// Stem catalog embedded in the binary.
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(EMBEDDED_COMM_STEMS)
            .map_err(|e| Error::Config(format!("embedded comm stems: {e}")))
    }

    /// Build a catalog from the `.wav` recordings under `dir`. Only files
    /// whose stem names the call sign and has exactly three `_`-separated
    /// parts are kept.
    pub fn from_wav_dir(dir: &Path) -> Result<Self> {
        let files = fsutil::collect_wav_files(dir)?;
        let collect = |ship: &str| -> Vec<String> {
            files
                .iter()
                .filter_map(|p| p.file_stem().and_then(|s| s.to_str()))
                .filter(|stem| stem.contains(ship) && stem.split('_').count() == 3)
                .map(str::to_owned)
                .collect()
        };
        Ok(Self {
            own: collect("OWN"),
            other: collect("OTHER"),
        })
    }

    /// Shuffled working copy consumed during schedule generation.
    pub fn shuffled(&self, rng: &mut StdRng) -> ShuffledStems {
        let mut own = self.own.clone();
        let mut other = self.other.clone();
        own.shuffle(rng);
        other.shuffle(rng);
        ShuffledStems { own, other }
    }
}

/// Per-ship stem queues; each communication task pops one stem.
#[derive(Debug, Clone)]
pub struct ShuffledStems {
    own: Vec<String>,
    other: Vec<String>,
}

impl ShuffledStems {
    pub fn pop_own(&mut self) -> Option<String> {
        self.own.pop()
    }

    pub fn pop_other(&mut self) -> Option<String> {
        self.other.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_assets_parse() {
        let params = ParamsFile::embedded().unwrap();
        assert!(params.high.validate().is_ok());
        assert!(params.low.validate().is_ok());
        // The high condition schedules more tasks than the low condition.
        assert!(params.high.total_tasks() > params.low.total_tasks());

        let stems = CommStems::embedded().unwrap();
        assert!(stems.own.len() >= params.high.n_own_comm);
        assert!(stems.other.len() >= params.high.n_other_comm);
    }

    #[test]
    fn zero_session_rejected() {
        let params = ScenarioParams {
            session_duration_minutes: 0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_tasks_rejected() {
        let params = ScenarioParams {
            n_pump_failures: 0,
            n_own_comm: 0,
            n_other_comm: 0,
            n_green_red_issues: 0,
            n_systems_up_down: 0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn inverted_event_diff_rejected() {
        let params = ScenarioParams {
            min_seconds_event_diff: 40,
            max_seconds_event_diff: 10,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn resman_interval_must_fit_in_session() {
        let params = ScenarioParams {
            session_duration_minutes: 1,
            min_seconds_fail_fix_resman: 80,
            max_seconds_fail_fix_resman: 90,
            total_auto_minutes: 0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn oversized_auto_block_rejected() {
        let params = ScenarioParams {
            session_duration_minutes: 2,
            total_auto_minutes: 2,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
