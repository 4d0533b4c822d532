//! Generate the merged stress-audio tracks for the experiment.
//!
//! Builds three 13-minute tracks (versions a, b, c with fixed seeds) from
//! the most aversive recordings of the Kumar et al. (2008) stimulus set.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use matbexp::stimuli::audio::{merge_wav_files, MergeConfig};

/// The 20 highest-rated aversive sounds of the Kumar et al. (2008) set,
/// by file name (ratings repeat, so 12 distinct recordings).
const KUMAR_2008_TOP_FILES: [&str; 12] = [
    "knife_bottle_1_db.wav",
    "fork_glass_1_db.wav",
    "blackboard_chalk_1_db.wav",
    "fork_bottle_1_db.wav",
    "ruler_bottle_1_db.wav",
    "femalescream_db.wav",
    "brake_double_db.wav",
    "blackboard_nails_1_db.wav",
    "spade_drag_1_db.wav",
    "guitar_1_db.wav",
    "angle_grind_2_db.wav",
    "clarinet_squeak_db.wav",
];

const TRACK_MINUTES: u32 = 13;
const SILENCE_RANGE: (f64, f64) = (3.0, 15.0);
const TRANSITION_SECONDS: f64 = 0.1;

#[derive(Parser, Debug)]
#[command(name = "gen_audio_stimuli")]
#[command(about = "Merge aversive recordings into stress-audio tracks")]
struct Args {
    /// Folder holding the Kumar et al. (2008) recordings
    input_folder: PathBuf,

    /// Output folder for the merged tracks
    output_folder: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    matbexp::logging::init_logging(args.verbose);

    for (version, seed) in [("a", 1), ("b", 2), ("c", 3)] {
        let output_file = args
            .output_folder
            .join(format!("stress_audio_stimuli_{version}_seed{seed}.wav"));
        let config = MergeConfig {
            input_folder: &args.input_folder,
            output_file: &output_file,
            silence_range: SILENCE_RANGE,
            transition_duration: TRANSITION_SECONDS,
            total_duration_minutes: TRACK_MINUTES,
            sound_file_names: Some(&KUMAR_2008_TOP_FILES),
            seed: Some(seed),
        };
        merge_wav_files(&config)
            .with_context(|| format!("merging track version {version}"))?;
        info!(path = %output_file.display(), "finished version {version}");
    }
    Ok(())
}
