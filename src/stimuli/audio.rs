//! Auditory stimulus assembly: merge short aversive-sound recordings into
//! one long track with seeded random silence intervals between them.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fsutil;
use crate::matbii::seeded_rng;

/// Linear 0→1 onset ramp, to avoid a harsh transition between silence and
/// sound onset.
pub fn generate_transition(duration: f64, sampling_rate: u32) -> Vec<f32> {
    let num_samples = (duration * f64::from(sampling_rate)) as usize;
    (0..num_samples)
        .map(|i| i as f32 / (num_samples.saturating_sub(1).max(1)) as f32)
        .collect()
}

/// Silence of the given duration.
pub fn generate_silence(duration: f64, sampling_rate: u32) -> Vec<f32> {
    let num_samples = (duration * f64::from(sampling_rate)) as usize;
    vec![0.0; num_samples]
}

/// Settings for one merged stimulus track.
#[derive(Debug, Clone)]
pub struct MergeConfig<'a> {
    pub input_folder: &'a Path,
    pub output_file: &'a Path,
    /// Range of silence durations between sounds, in seconds.
    pub silence_range: (f64, f64),
    /// Duration of the onset ramp, in seconds.
    pub transition_duration: f64,
    /// Target duration of the merged track, in minutes.
    pub total_duration_minutes: u32,
    /// Restrict the pool to these file names; `None` uses every `.wav`
    /// found under the input folder.
    pub sound_file_names: Option<&'a [&'a str]>,
    pub seed: Option<u64>,
}

impl MergeConfig<'_> {
    fn validate(&self) -> Result<()> {
        if self.total_duration_minutes == 0 {
            return Err(Error::Config(
                "total_duration_minutes must be greater than 0".into(),
            ));
        }
        let (lo, hi) = self.silence_range;
        if !(0.0..=hi).contains(&lo) {
            return Err(Error::Config(format!(
                "silence range ({lo}, {hi}) is not ordered and non-negative"
            )));
        }
        if self.transition_duration < 0.0 {
            return Err(Error::Config(
                "transition_duration must not be negative".into(),
            ));
        }
        Ok(())
    }
}

fn read_normalized(path: &Path) -> Result<(WavSpec, Vec<f32>)> {
    let mut reader = hound::WavReader::open(path).map_err(|e| Error::Wav {
        path: path.to_owned(),
        source: e,
    })?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(Error::media(
            path,
            format!(
                "unsupported sample format ({:?}, {} bits); expected 16-bit PCM",
                spec.sample_format, spec.bits_per_sample
            ),
        ));
    }
    let samples = reader
        .samples::<i16>()
        .map(|s| s.map(|v| f32::from(v) / f32::from(i16::MAX)))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| Error::Wav {
            path: path.to_owned(),
            source: e,
        })?;
    Ok((spec, samples))
}

/// Merge WAV recordings into one track: pick a random recording, ramp its
/// onset, append a random silence, and repeat until the target duration is
/// exceeded; then truncate to the target and write the output file.
///
/// The draw sequence is fully determined by the seed, so a fixed seed and
/// input folder reproduce the output byte for byte.
pub fn merge_wav_files(config: &MergeConfig<'_>) -> Result<()> {
    config.validate()?;

    let mut files = fsutil::collect_wav_files(config.input_folder)?;
    if let Some(names) = config.sound_file_names {
        files.retain(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| names.contains(&n))
        });
    }
    if files.is_empty() {
        return Err(Error::media(
            config.input_folder,
            "no matching .wav files found",
        ));
    }

    let mut rng = seeded_rng(config.seed);
    let mut merged: Vec<f32> = Vec::new();
    let mut track_spec: Option<WavSpec> = None;
    let (silence_lo, silence_hi) = config.silence_range;

    loop {
        let file: &PathBuf = &files[rng.random_range(0..files.len())];
        let (spec, mut audio) = read_normalized(file)?;
        match track_spec {
            None => track_spec = Some(spec),
            Some(existing) if existing.sample_rate != spec.sample_rate => {
                return Err(Error::media(
                    file,
                    format!(
                        "sample rate {} does not match the first recording ({})",
                        spec.sample_rate, existing.sample_rate
                    ),
                ));
            }
            Some(_) => {}
        }
        debug!(file = %file.display(), samples = audio.len(), "appending recording");

        let transition = generate_transition(config.transition_duration, spec.sample_rate);
        for (sample, ramp) in audio.iter_mut().zip(&transition) {
            *sample *= ramp;
        }

        let silence_duration = if silence_lo < silence_hi {
            rng.random_range(silence_lo..silence_hi)
        } else {
            silence_lo
        };
        audio.extend(generate_silence(silence_duration, spec.sample_rate));
        merged.extend(audio);

        let target =
            config.total_duration_minutes as usize * 60 * spec.sample_rate as usize;
        if merged.len() > target {
            merged.truncate(target);
            break;
        }
    }

    let spec = track_spec.unwrap_or(WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    });
    write_track(config.output_file, spec, &merged)?;
    info!(
        path = %config.output_file.display(),
        minutes = config.total_duration_minutes,
        "wrote merged stimulus track"
    );
    Ok(())
}

/// Write the track to a temporary sibling and rename it into place once
/// finalized, so an interrupted write never leaves a partial file at the
/// destination.
fn write_track(path: &Path, spec: WavSpec, samples: &[f32]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let wav_err = |e| Error::Wav {
        path: path.to_owned(),
        source: e,
    };
    let mut writer = WavWriter::create(&tmp, spec).map_err(wav_err)?;
    for &sample in samples {
        let scaled = (sample * f32::from(i16::MAX)).clamp(
            f32::from(i16::MIN),
            f32::from(i16::MAX),
        );
        writer.write_sample(scaled as i16).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;
    std::fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}
