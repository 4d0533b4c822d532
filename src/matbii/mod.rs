//! MATB-II scenario script generation.
//!
//! A scenario is a timed sequence of task events (pump failures, system
//! monitoring issues, communications, tracking automation) rendered as a
//! MATB-EVENTS XML script for the simulator.

pub mod event;
pub mod openmatb;
pub mod schedule;
pub mod tasks;
pub mod time;
pub mod xml;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::config::{CommStems, ScenarioParams};
use crate::error::Result;

use event::{sort_by_seconds, Event, Payload};
use schedule::ComplianceLimits;
use tasks::PumpLedger;

/// A rendered scenario together with the counters the retry loop in
/// [`crate::scenarios`] uses: a draw is only kept when the configured task
/// count matched the number of drawn event times exactly.
#[derive(Debug, Clone)]
pub struct GeneratedXml {
    pub xml: String,
    pub n_task_kinds: usize,
    pub n_event_times: usize,
}

impl GeneratedXml {
    /// Whether the task mix was used as configured, without trimming or
    /// random padding.
    pub fn counts_match(&self) -> bool {
        self.n_task_kinds == self.n_event_times
    }
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// The fixed scenario preamble: resource management and system monitoring
/// start at once, tracking begins under manual control, and the session
/// control marker opens the script.
fn preamble() -> Vec<Event> {
    vec![
        Event::at_literal(
            "0:00:01",
            1,
            Payload::Sched {
                task: "RESSYS",
                action: "START",
                update: "NULL",
                response: "NULL",
            },
        ),
        Event::at_literal(
            "0:00:02",
            2,
            Payload::Sched {
                task: "TRACK",
                action: "MANUAL",
                update: "HIGH",
                response: "MEDIUM",
            },
        ),
        Event::at_literal("0:00:00", 0, Payload::Control("START")),
    ]
}

pub(crate) struct ScheduleDraft {
    pub events: Vec<Event>,
    pub n_task_kinds: usize,
    pub n_event_times: usize,
}

/// Draw the random task portion of a scenario: event times, a compliant
/// task ordering, and the per-task events, on top of the fixed preamble.
pub(crate) fn build_task_schedule(
    rng: &mut StdRng,
    params: &ScenarioParams,
    stems: &CommStems,
) -> Result<ScheduleDraft> {
    let session = params.session_duration_seconds();
    let mut events = preamble();
    let mut stems = stems.shuffled(rng);

    let event_times = schedule::generate_event_times(
        rng,
        params.min_seconds_event_diff,
        params.max_seconds_event_diff,
        session,
    );
    let kinds = schedule::generate_task_kinds(params);
    let (mut kinds, n_task_kinds, n_event_times) =
        schedule::adjust_task_kinds(rng, kinds, event_times.len());
    debug!(n_task_kinds, n_event_times, "drew task schedule");

    let limits = ComplianceLimits::from_params(params);
    if schedule::ensure_task_times_comply(rng, &mut kinds, &event_times, &limits) {
        let mut ledger = PumpLedger::new(session);
        tasks::generate_random_tasks(
            &mut events,
            rng,
            &kinds,
            &event_times,
            &mut stems,
            params,
            &mut ledger,
        )?;
    } else {
        warn!("no compliant task ordering found; schedule contains only control events");
    }

    Ok(ScheduleDraft {
        events,
        n_task_kinds,
        n_event_times,
    })
}

/// Close the scenario (rating prompt, session end marker), sort and render.
pub(crate) fn finalize(events: &mut Vec<Event>, session_duration_seconds: u32) -> String {
    events.push(Event::at(
        session_duration_seconds - 2,
        None,
        Payload::Rate("START"),
    ));
    events.push(Event::at(
        session_duration_seconds,
        None,
        Payload::Control("END"),
    ));
    sort_by_seconds(events);
    xml::render(events)
}

/// Generate one random scenario script.
///
/// A `Some(seed)` makes the draw fully reproducible; `None` seeds from the
/// operating system. The configuration is validated before any randomness
/// is consumed.
pub fn generate_random_xml(
    seed: Option<u64>,
    params: &ScenarioParams,
    stems: &CommStems,
) -> Result<GeneratedXml> {
    params.validate()?;
    let mut rng = seeded_rng(seed);
    let session = params.session_duration_seconds();

    let mut draft = build_task_schedule(&mut rng, params, stems)?;
    tasks::generate_auto_task(&mut draft.events, &mut rng, params.total_auto_minutes, session);
    tasks::generate_comm_start_stop(&mut draft.events, params, session);
    let xml = finalize(&mut draft.events, session);

    Ok(GeneratedXml {
        xml,
        n_task_kinds: draft.n_task_kinds,
        n_event_times: draft.n_event_times,
    })
}
