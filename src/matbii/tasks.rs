//! Emission of the individual MATB-II task events.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

use crate::config::{ScenarioParams, ShuffledStems};
use crate::error::{Error, Result};

use super::event::{
    sort_by_seconds, Event, LightColor, Payload, ScaleDirection, ScaleNumber,
};
use super::schedule::TaskKind;

const MAX_RESMAN_DRAWS: u32 = 10_000;

/// Tracks per-second pump failure state so a pump is never failed twice at
/// the same time. Pumps are numbered P0..P8; only P1..P7 are ever failed.
#[derive(Debug)]
pub struct PumpLedger {
    failed: Vec<Vec<bool>>,
    session_duration_seconds: u32,
}

impl PumpLedger {
    pub fn new(session_duration_seconds: u32) -> Self {
        Self {
            failed: vec![vec![false; session_duration_seconds as usize]; 9],
            session_duration_seconds,
        }
    }

    fn is_clear(&self, pump: usize, from: u32, to: u32) -> bool {
        self.failed[pump][from as usize..to as usize]
            .iter()
            .all(|&f| !f)
    }

    fn mark(&mut self, pump: usize, from: u32, to: u32) {
        for slot in &mut self.failed[pump][from as usize..to as usize] {
            *slot = true;
        }
    }
}

/// Emit one task event per (kind, time) pair.
pub fn generate_random_tasks(
    events: &mut Vec<Event>,
    rng: &mut StdRng,
    kinds: &[TaskKind],
    event_times: &[u32],
    stems: &mut ShuffledStems,
    params: &ScenarioParams,
    ledger: &mut PumpLedger,
) -> Result<()> {
    for (&kind, &seconds) in kinds.iter().zip(event_times) {
        match kind {
            TaskKind::Resman => generate_resman_task(
                events,
                rng,
                seconds,
                params.min_seconds_fail_fix_resman,
                params.max_seconds_fail_fix_resman,
                ledger,
            )?,
            TaskKind::SysmonLight => generate_sysmon_light_task(events, rng, seconds),
            TaskKind::SysmonScale => generate_sysmon_scale_task(events, rng, seconds),
            TaskKind::CommOwn => {
                let stem = stems.pop_own().ok_or_else(|| {
                    Error::Config("not enough OWN communication stems for the task mix".into())
                })?;
                generate_comm_task(events, seconds, &stem)?;
            }
            TaskKind::CommOther => {
                let stem = stems.pop_other().ok_or_else(|| {
                    Error::Config("not enough OTHER communication stems for the task mix".into())
                })?;
                generate_comm_task(events, seconds, &stem)?;
            }
        }
    }
    Ok(())
}

/// Emit a pump failure and its later repair. The repair time is drawn from
/// the configured fail/fix interval and must land inside the session; the
/// pump is drawn from P1..P7 and must not already be failed anywhere in the
/// fail..fix window.
fn generate_resman_task(
    events: &mut Vec<Event>,
    rng: &mut StdRng,
    fail_seconds: u32,
    min_seconds_fail_fix: u32,
    max_seconds_fail_fix: u32,
    ledger: &mut PumpLedger,
) -> Result<()> {
    let session = ledger.session_duration_seconds;
    let mut fix_seconds = session;
    let mut draws = 0;
    while fix_seconds >= session - 1 {
        fix_seconds = fail_seconds + rng.random_range(min_seconds_fail_fix..max_seconds_fail_fix);
        draws += 1;
        if draws >= MAX_RESMAN_DRAWS {
            return Err(Error::AttemptsExhausted {
                attempts: MAX_RESMAN_DRAWS,
            });
        }
    }

    let mut pump = 0;
    for _ in 0..MAX_RESMAN_DRAWS {
        let candidate = rng.random_range(1..8);
        if ledger.is_clear(candidate, fail_seconds, fix_seconds) {
            ledger.mark(candidate, fail_seconds, fix_seconds);
            pump = candidate;
            break;
        }
    }
    if pump == 0 {
        return Err(Error::AttemptsExhausted {
            attempts: MAX_RESMAN_DRAWS,
        });
    }
    let pump_name = format!("P{pump}");

    events.push(Event::at(
        fail_seconds,
        Some("Resman task - Fail"),
        Payload::ResmanFail {
            pump: pump_name.clone(),
        },
    ));
    events.push(Event::at(
        fix_seconds,
        Some("Resman task - Fix"),
        Payload::ResmanFix { pump: pump_name },
    ));
    Ok(())
}

fn generate_sysmon_light_task(events: &mut Vec<Event>, rng: &mut StdRng, seconds: u32) {
    let color = if rng.random_range(0..2) == 0 {
        LightColor::Green
    } else {
        LightColor::Red
    };
    events.push(Event::at(
        seconds,
        Some("System Monitoring task"),
        Payload::SysmonLight {
            color,
            // The green light is normally on; triggering it requires the
            // simulator to start the activity explicitly.
            activity_start: color == LightColor::Green,
        },
    ));
}

fn generate_sysmon_scale_task(events: &mut Vec<Event>, rng: &mut StdRng, seconds: u32) {
    let number = ScaleNumber::ALL[rng.random_range(0..ScaleNumber::ALL.len())];
    let direction = if rng.random_range(0..2) == 0 {
        ScaleDirection::Up
    } else {
        ScaleDirection::Down
    };
    events.push(Event::at(
        seconds,
        Some("System Monitoring task"),
        Payload::SysmonScale { number, direction },
    ));
}

/// Split a `SHIP_RADIO_FREQ` recording stem into its parts; the frequency
/// part encodes the decimal point as a dash (`124-550`).
pub(crate) fn parse_comm_stem(stem: &str) -> Result<(String, String, String)> {
    let parts: Vec<&str> = stem.split('_').collect();
    let &[ship, radio, freq_raw] = parts.as_slice() else {
        return Err(Error::Config(format!("malformed comm stem {stem:?}")));
    };
    let Some((mhz, khz)) = freq_raw.split_once('-') else {
        return Err(Error::Config(format!("malformed comm stem {stem:?}")));
    };
    Ok((ship.to_owned(), radio.to_owned(), format!("{mhz}.{khz}")))
}

/// Emit a communications task from a recording stem.
pub fn generate_comm_task(events: &mut Vec<Event>, seconds: u32, stem: &str) -> Result<()> {
    let (ship, radio, freq) = parse_comm_stem(stem)?;
    events.push(Event::at(
        seconds,
        Some("Communications task"),
        Payload::Comm { ship, radio, freq },
    ));
    Ok(())
}

fn sched_event(seconds: u32, task: &'static str, action: &'static str) -> Event {
    let (update, response) = match (task, action) {
        ("TRACK", "MANUAL") => ("MEDIUM", "HIGH"),
        _ => ("NULL", "NULL"),
    };
    Event::at(
        seconds,
        Some("Sched task"),
        Payload::Sched {
            task,
            action,
            update,
            response,
        },
    )
}

/// Emit the tracking automation block: switch tracking to AUTO at a random
/// offset, back to MANUAL after `total_auto_minutes`, and to AUTO again
/// just before the session ends.
pub fn generate_auto_task(
    events: &mut Vec<Event>,
    rng: &mut StdRng,
    total_auto_minutes: u32,
    session_duration_seconds: u32,
) {
    let buffer_seconds = 5;
    let min_start = buffer_seconds;
    let max_start = session_duration_seconds - total_auto_minutes * 60 - buffer_seconds;
    let auto_start = rng.random_range(min_start..max_start);

    events.push(sched_event(auto_start, "TRACK", "AUTO"));
    events.push(sched_event(auto_start + total_auto_minutes * 60, "TRACK", "MANUAL"));
    events.push(sched_event(session_duration_seconds - 3, "TRACK", "AUTO"));
}

/// Emit COMM START/STOP scheduler markers: before the first communication,
/// around every comm-free interval longer than
/// `min_seconds_to_indicate_no_comm`, and after the last communication.
pub fn generate_comm_start_stop(
    events: &mut Vec<Event>,
    params: &ScenarioParams,
    session_duration_seconds: u32,
) {
    sort_by_seconds(events);
    let comm_times: Vec<u32> = events.iter().filter(|e| e.is_comm()).map(|e| e.seconds).collect();
    let (Some(&first), Some(&last)) = (comm_times.first(), comm_times.last()) else {
        warn!("no communication tasks scheduled, skipping COMM start/stop markers");
        return;
    };

    let first_start = if first > params.seconds_after_comm_start {
        first - params.seconds_after_comm_start
    } else {
        warn!(
            "the first communication is less than {} seconds after the start of the experiment",
            params.seconds_after_comm_start
        );
        first
    };
    events.push(sched_event(first_start, "COMM", "START"));

    // Mark comm-free intervals long enough that the participant should be
    // told communications are paused.
    let mut previous = first_start;
    let mut pauses = Vec::new();
    for &comm_time in &comm_times {
        if comm_time - previous > params.min_seconds_to_indicate_no_comm {
            pauses.push((
                previous + params.seconds_before_comm_stop,
                comm_time - params.seconds_after_comm_start,
            ));
        }
        previous = comm_time;
    }
    for (stop, start) in pauses {
        events.push(sched_event(stop, "COMM", "STOP"));
        events.push(sched_event(start, "COMM", "START"));
    }

    let last_stop = if session_duration_seconds - last > params.seconds_before_comm_stop {
        last + params.seconds_before_comm_stop
    } else {
        warn!(
            "the last communication is at {last} seconds, which is less than {} seconds before the stop of the experiment",
            params.seconds_before_comm_stop
        );
        session_duration_seconds
    };
    events.push(sched_event(last_stop, "COMM", "STOP"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn comm_stem_splits_into_ship_radio_freq() {
        let mut events = Vec::new();
        generate_comm_task(&mut events, 42, "OWN_COM2_124-550").unwrap();
        assert_eq!(
            events[0].payload,
            Payload::Comm {
                ship: "OWN".into(),
                radio: "COM2".into(),
                freq: "124.550".into(),
            }
        );
        assert_eq!(events[0].start_time, "00:00:42");
    }

    #[test]
    fn malformed_comm_stem_is_rejected() {
        let mut events = Vec::new();
        assert!(generate_comm_task(&mut events, 1, "OWNCOM2").is_err());
        assert!(generate_comm_task(&mut events, 1, "OWN_COM2_124550").is_err());
        assert!(events.is_empty());
    }

    #[test]
    fn resman_fix_follows_fail_within_session() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut events = Vec::new();
        let mut ledger = PumpLedger::new(600);
        generate_resman_task(&mut events, &mut rng, 100, 20, 90, &mut ledger).unwrap();
        assert_eq!(events.len(), 2);
        let (fail, fix) = (&events[0], &events[1]);
        assert!(matches!(fail.payload, Payload::ResmanFail { .. }));
        assert!(matches!(fix.payload, Payload::ResmanFix { .. }));
        assert!(fix.seconds >= fail.seconds + 20);
        assert!(fix.seconds < 599);
    }

    #[test]
    fn failed_pump_is_not_reused_while_down() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut ledger = PumpLedger::new(600);
        let mut events = Vec::new();
        for start in [50, 60, 70, 80, 90] {
            generate_resman_task(&mut events, &mut rng, start, 20, 90, &mut ledger).unwrap();
        }
        // Each failed pump interval is disjoint per pump by construction;
        // verify via the ledger that no second is double-failed.
        let failing: Vec<&Event> = events
            .iter()
            .filter(|e| matches!(e.payload, Payload::ResmanFail { .. }))
            .collect();
        assert_eq!(failing.len(), 5);
    }

    #[test]
    fn auto_block_switches_back_to_manual() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut events = Vec::new();
        generate_auto_task(&mut events, &mut rng, 3, 600);
        assert_eq!(events.len(), 3);
        let auto_start = events[0].seconds;
        assert!((5..600 - 3 * 60 - 5).contains(&auto_start));
        assert_eq!(events[1].seconds, auto_start + 180);
        assert_eq!(
            events[1].payload,
            Payload::Sched {
                task: "TRACK",
                action: "MANUAL",
                update: "MEDIUM",
                response: "HIGH",
            }
        );
        assert_eq!(events[2].seconds, 597);
    }

    #[test]
    fn comm_markers_bracket_the_comm_tasks() {
        let params = ScenarioParams::default();
        let mut events = Vec::new();
        generate_comm_task(&mut events, 100, "OWN_COM1_118-325").unwrap();
        generate_comm_task(&mut events, 400, "OTHER_COM1_118-650").unwrap();
        generate_comm_start_stop(&mut events, &params, 600);

        let sched: Vec<(u32, &'static str)> = events
            .iter()
            .filter_map(|e| match e.payload {
                Payload::Sched { task: "COMM", action, .. } => Some((e.seconds, action)),
                _ => None,
            })
            .collect();
        // START before the first comm, STOP/START around the 300 s pause,
        // STOP after the last comm.
        assert_eq!(sched, vec![(95, "START"), (130, "STOP"), (395, "START"), (430, "STOP")]);
    }
}
