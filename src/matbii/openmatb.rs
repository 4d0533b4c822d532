//! Conversion of OpenMATB text scenarios into MATB-II event scripts.
//!
//! OpenMATB scenarios are line based: `H:MM:SS;task;action[;info]`, with
//! `#` comment lines. Only the system-monitoring and radio-prompt lines
//! have MATB-II counterparts; everything else is skipped.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{CommStems, ScenarioParams};
use crate::error::{Error, Result};

use super::event::{Event, LightColor, Payload, ScaleDirection, ScaleNumber};
use super::tasks::parse_comm_stem;
use super::time::parse_time_string;
use super::{build_task_schedule, finalize, seeded_rng, tasks, GeneratedXml};

/// Parse an OpenMATB scenario file into MATB-II events. Sysmon light and
/// scale lines convert directly; `radioprompt` lines draw a random
/// recording for the named call sign.
pub fn convert_text_file(
    path: &Path,
    rng: &mut StdRng,
    stems: &CommStems,
) -> Result<Vec<Event>> {
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut events = Vec::new();
    for (idx, raw) in data.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = raw.split(';').collect();
        if fields.len() < 3 {
            return Err(Error::OpenMatb {
                line,
                message: format!("expected `time;task;action`, got {raw:?}"),
            });
        }
        let seconds = parse_time_string(fields[0]).map_err(|e| Error::OpenMatb {
            line,
            message: e.to_string(),
        })?;

        match fields[1] {
            "sysmon" => {
                let action = fields[2];
                if let Some(scale) = action.strip_prefix("scales-") {
                    events.push(convert_sysmon_scale(rng, seconds, scale, line)?);
                } else if let Some(light) = action.strip_prefix("lights-") {
                    events.push(convert_sysmon_light(seconds, light));
                }
            }
            "communications" if fields[2] == "radioprompt" => {
                let info = fields.get(3).copied().ok_or_else(|| Error::OpenMatb {
                    line,
                    message: "radioprompt line is missing the call sign".into(),
                })?;
                events.push(convert_communication(rng, seconds, info, stems, line)?);
            }
            _ => {}
        }
    }
    Ok(events)
}

fn convert_sysmon_light(seconds: u32, light: &str) -> Event {
    // Light 1 is the normally-on green light; everything else maps to the
    // red warning light.
    let color = if light.contains('1') {
        LightColor::Green
    } else {
        LightColor::Red
    };
    Event::at(
        seconds,
        None,
        Payload::SysmonLight {
            color,
            activity_start: true,
        },
    )
}

fn convert_sysmon_scale(
    rng: &mut StdRng,
    seconds: u32,
    scale: &str,
    line: usize,
) -> Result<Event> {
    let number = scale
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|n| ScaleNumber::ALL.get(n).copied())
        .ok_or_else(|| Error::OpenMatb {
            line,
            message: format!("invalid scale number {scale:?}"),
        })?;
    let direction = if rng.random_range(0..2) == 0 {
        ScaleDirection::Up
    } else {
        ScaleDirection::Down
    };
    Ok(Event::at(
        seconds,
        None,
        Payload::SysmonScale { number, direction },
    ))
}

fn convert_communication(
    rng: &mut StdRng,
    seconds: u32,
    info: &str,
    stems: &CommStems,
    line: usize,
) -> Result<Event> {
    let ship = info.trim().to_uppercase();
    let pool = match ship.as_str() {
        "OWN" => &stems.own,
        "OTHER" => &stems.other,
        _ => {
            return Err(Error::OpenMatb {
                line,
                message: format!("unknown call sign {info:?}"),
            })
        }
    };
    if pool.is_empty() {
        return Err(Error::OpenMatb {
            line,
            message: format!("no communication stems available for {ship}"),
        });
    }
    let stem = &pool[rng.random_range(0..pool.len())];
    let (_, radio, freq) = parse_comm_stem(stem)?;
    Ok(Event::at(
        seconds,
        None,
        Payload::Comm { ship, radio, freq },
    ))
}

/// Generate a scenario whose system-monitoring and communications events
/// come from an OpenMATB text file instead of the random draw; everything
/// else (resource management, tracking automation, COMM markers, control
/// events) is generated as usual.
pub fn generate_random_xml_with_text_file(
    text_file: &Path,
    seed: Option<u64>,
    params: &ScenarioParams,
    stems: &CommStems,
) -> Result<GeneratedXml> {
    params.validate()?;
    let mut rng = seeded_rng(seed);
    let session = params.session_duration_seconds();

    let mut draft = build_task_schedule(&mut rng, params, stems)?;
    draft
        .events
        .retain(|e| !e.is_sysmon() && !e.is_comm());
    draft
        .events
        .extend(convert_text_file(text_file, &mut rng, stems)?);

    tasks::generate_auto_task(&mut draft.events, &mut rng, params.total_auto_minutes, session);
    tasks::generate_comm_start_stop(&mut draft.events, params, session);
    let xml = finalize(&mut draft.events, session);

    Ok(GeneratedXml {
        xml,
        n_task_kinds: draft.n_task_kinds,
        n_event_times: draft.n_event_times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::io::Write;

    fn write_scenario(lines: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(lines.as_bytes()).unwrap();
        file
    }

    #[test]
    fn converts_sysmon_and_radioprompt_lines() {
        let file = write_scenario(
            "# OpenMATB scenario\n\
             0:00:10;sysmon;lights-1\n\
             0:00:25;sysmon;scales-3\n\
             0:00:40;communications;radioprompt;own\n\
             0:01:00;tracking;start\n",
        );
        let mut rng = StdRng::seed_from_u64(0);
        let stems = CommStems::embedded().unwrap();
        let events = convert_text_file(file.path(), &mut rng, &stems).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0].payload,
            Payload::SysmonLight {
                color: LightColor::Green,
                activity_start: true,
            }
        );
        assert!(matches!(
            events[1].payload,
            Payload::SysmonScale {
                number: ScaleNumber::Three,
                ..
            }
        ));
        match &events[2].payload {
            Payload::Comm { ship, freq, .. } => {
                assert_eq!(ship, "OWN");
                assert!(freq.contains('.'));
            }
            other => panic!("expected comm payload, got {other:?}"),
        }
        assert_eq!(events[2].start_time, "00:00:40");
    }

    #[test]
    fn reports_line_numbers_for_malformed_input() {
        let file = write_scenario("0:00:10;sysmon;lights-1\nnot a line\n");
        let mut rng = StdRng::seed_from_u64(0);
        let stems = CommStems::embedded().unwrap();
        let err = convert_text_file(file.path(), &mut rng, &stems).unwrap_err();
        assert!(matches!(err, Error::OpenMatb { line: 2, .. }));
    }

    #[test]
    fn rejects_unknown_call_sign() {
        let file = write_scenario("0:00:10;communications;radioprompt;wingman\n");
        let mut rng = StdRng::seed_from_u64(0);
        let stems = CommStems::embedded().unwrap();
        assert!(convert_text_file(file.path(), &mut rng, &stems).is_err());
    }

    #[test]
    fn text_file_replaces_random_sysmon_and_comm_events() {
        let file = write_scenario(
            "0:01:00;sysmon;lights-2\n\
             0:02:00;communications;radioprompt;other\n\
             0:05:00;communications;radioprompt;own\n",
        );
        let params = ScenarioParams::default();
        let stems = CommStems::embedded().unwrap();
        let generated =
            generate_random_xml_with_text_file(file.path(), Some(7), &params, &stems).unwrap();

        // Exactly the comm events from the file survive.
        assert_eq!(generated.xml.matches("<comm>").count(), 2);
        assert_eq!(generated.xml.matches("monitoringLightType").count(), 1);
        assert!(generated.xml.contains("<event startTime=\"00:05:00\">"));
    }
}
