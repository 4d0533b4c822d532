//! Batch generation of the scenario files used in the experiment.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{CommStems, Condition, ParamsFile, ScenarioParams, Version};
use crate::error::{Error, Result};
use crate::fsutil;
use crate::matbii;

/// Attempt budget for finding a seed whose event-time draw matches the
/// configured task count exactly.
pub const MAX_ATTEMPTS: u32 = 100;

/// Seed spacing between scenario versions, so version retries never
/// overlap the next version's seed range.
const VERSION_SEED_STRIDE: u64 = 1000;

fn scenario_file_stem(
    params: &ScenarioParams,
    condition: Condition,
    version: Version,
    seed: u64,
) -> String {
    if condition == Condition::Low && version == Version::C {
        // The low/c variant doubles as the tutorial scenario.
        format!(
            "MATB_EVENTS_tutorial_{}mins_seed_{seed}",
            params.session_duration_minutes
        )
    } else {
        format!("MATB_EVENTS_{condition}_{version}_seed_{seed}")
    }
}

/// Generate one scenario and write it to `output_folder`.
///
/// Seeds are tried in sequence starting from `seed` until a draw uses the
/// configured task mix without trimming or padding; the successful seed is
/// recorded in the file name. The file is written atomically, so a failed
/// run leaves nothing at the destination.
pub fn generate_and_save_xml(
    seed: u64,
    params: &ScenarioParams,
    stems: &CommStems,
    output_folder: &Path,
    condition: Condition,
    version: Version,
    max_attempts: u32,
) -> Result<PathBuf> {
    for attempt in 0..max_attempts {
        let candidate = seed + u64::from(attempt);
        let generated = matbii::generate_random_xml(Some(candidate), params, stems)?;
        if !generated.counts_match() {
            debug!(
                seed = candidate,
                n_task_kinds = generated.n_task_kinds,
                n_event_times = generated.n_event_times,
                "task count mismatch, reseeding"
            );
            continue;
        }
        let stem = scenario_file_stem(params, condition, version, candidate);
        let path = output_folder.join(format!("{stem}.xml"));
        fsutil::write_atomic(&path, &generated.xml)?;
        info!(path = %path.display(), seed = candidate, "wrote scenario");
        return Ok(path);
    }
    Err(Error::AttemptsExhausted {
        attempts: max_attempts,
    })
}

/// Generate the scenario versions for one condition. The high condition
/// has no version c; the low/c slot is the tutorial scenario. Each version
/// draws from its own seed range derived from `base_seed`.
pub fn create_matbii_scenarios(
    condition: Condition,
    output_folder: &Path,
    base_seed: u64,
    params_file: &ParamsFile,
    stems: &CommStems,
) -> Result<Vec<PathBuf>> {
    let params = params_file.for_condition(condition);
    params.validate()?;

    let mut paths = Vec::new();
    for (index, version) in Version::ALL.into_iter().enumerate() {
        if condition == Condition::High && version == Version::C {
            continue;
        }
        let seed = base_seed + index as u64 * VERSION_SEED_STRIDE;
        paths.push(generate_and_save_xml(
            seed,
            params,
            stems,
            output_folder,
            condition,
            version,
            MAX_ATTEMPTS,
        )?);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_file_stem_names_the_session_length() {
        let params = ScenarioParams::default();
        assert_eq!(
            scenario_file_stem(&params, Condition::Low, Version::C, 7),
            "MATB_EVENTS_tutorial_10mins_seed_7"
        );
        assert_eq!(
            scenario_file_stem(&params, Condition::High, Version::A, 0),
            "MATB_EVENTS_high_a_seed_0"
        );
    }
}
