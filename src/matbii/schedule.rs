//! Random event timeline construction and task-mix compliance rules.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::ScenarioParams;

/// No task event is scheduled this close to the session end; the closing
/// rating prompt and control events need the room.
pub const GRACE_SECONDS_BEFORE_SESSION_END: u32 = 25;

const MAX_SHUFFLE_ATTEMPTS: u32 = 100_000;

/// Kind of randomly scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Resman,
    SysmonLight,
    SysmonScale,
    CommOwn,
    CommOther,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Resman,
        TaskKind::SysmonLight,
        TaskKind::SysmonScale,
        TaskKind::CommOwn,
        TaskKind::CommOther,
    ];

    pub fn is_comm(&self) -> bool {
        matches!(self, TaskKind::CommOwn | TaskKind::CommOther)
    }
}

/// Spacing rules a candidate task ordering must satisfy.
#[derive(Debug, Clone)]
pub struct ComplianceLimits {
    pub seconds_before_comm_stop: u32,
    pub seconds_after_comm_start: u32,
    pub min_seconds_fail_fix_resman: u32,
    pub session_duration_seconds: u32,
    pub min_seconds_between_comm: u32,
    pub min_seconds_between_sysmon_light: u32,
    pub min_seconds_between_sysmon_scale: u32,
    pub max_repeats: usize,
    pub window_size: usize,
}

impl ComplianceLimits {
    pub fn from_params(params: &ScenarioParams) -> Self {
        Self {
            seconds_before_comm_stop: params.seconds_before_comm_stop,
            seconds_after_comm_start: params.seconds_after_comm_start,
            min_seconds_fail_fix_resman: params.min_seconds_fail_fix_resman,
            session_duration_seconds: params.session_duration_seconds(),
            min_seconds_between_comm: 30,
            min_seconds_between_sysmon_light: 15,
            min_seconds_between_sysmon_scale: 10,
            max_repeats: 2,
            window_size: 3,
        }
    }
}

/// Draw random event times across the session: gaps are sampled uniformly
/// from `[min_diff, max_diff)` and accumulated, and times falling within
/// the end-of-session grace period are dropped. A degenerate range
/// (`min_diff == max_diff`) yields constant gaps.
pub fn generate_event_times(
    rng: &mut StdRng,
    min_diff: u32,
    max_diff: u32,
    session_duration_seconds: u32,
) -> Vec<u32> {
    let draws = (f64::from(session_duration_seconds) / f64::from(min_diff)).round() as usize;
    let cutoff = session_duration_seconds.saturating_sub(GRACE_SECONDS_BEFORE_SESSION_END);
    let mut times = Vec::with_capacity(draws);
    let mut elapsed = 0u32;
    for _ in 0..draws {
        let gap = if min_diff == max_diff {
            min_diff
        } else {
            rng.random_range(min_diff..max_diff)
        };
        elapsed += gap;
        if elapsed <= cutoff {
            times.push(elapsed);
        }
    }
    times
}

/// The configured task mix, one entry per scheduled task.
pub fn generate_task_kinds(params: &ScenarioParams) -> Vec<TaskKind> {
    let mut kinds = Vec::with_capacity(params.total_tasks());
    kinds.extend(std::iter::repeat_n(TaskKind::Resman, params.n_pump_failures));
    kinds.extend(std::iter::repeat_n(TaskKind::CommOwn, params.n_own_comm));
    kinds.extend(std::iter::repeat_n(TaskKind::CommOther, params.n_other_comm));
    kinds.extend(std::iter::repeat_n(
        TaskKind::SysmonLight,
        params.n_green_red_issues,
    ));
    kinds.extend(std::iter::repeat_n(
        TaskKind::SysmonScale,
        params.n_systems_up_down,
    ));
    kinds
}

/// Trim or randomly pad the task mix to match the number of event times.
/// Returns the adjusted mix together with the original kind count and the
/// event-time count so the caller can reseed until the two agree.
pub fn adjust_task_kinds(
    rng: &mut StdRng,
    mut kinds: Vec<TaskKind>,
    n_event_times: usize,
) -> (Vec<TaskKind>, usize, usize) {
    let n_kinds = kinds.len();
    if n_kinds > n_event_times {
        kinds.truncate(n_event_times);
    } else {
        for _ in n_kinds..n_event_times {
            kinds.push(TaskKind::ALL[rng.random_range(0..TaskKind::ALL.len())]);
        }
    }
    (kinds, n_kinds, n_event_times)
}

/// Reshuffle the task mix until it satisfies the spacing rules, up to a
/// fixed attempt budget. Returns whether a compliant ordering was found;
/// `kinds` holds the last ordering tried either way.
pub fn ensure_task_times_comply(
    rng: &mut StdRng,
    kinds: &mut [TaskKind],
    event_times: &[u32],
    limits: &ComplianceLimits,
) -> bool {
    for _ in 0..MAX_SHUFFLE_ATTEMPTS {
        kinds.shuffle(rng);
        if check_task_times_comply(kinds, event_times, limits) {
            return true;
        }
    }
    false
}

/// Check one task ordering against the spacing rules:
/// no communication too close to the session start or end, communications
/// at least `min_seconds_between_comm` apart, no pump failure too close to
/// the session end to be repaired, minimum spacing within each
/// system-monitoring subtype, and no kind appearing more than `max_repeats`
/// times in any sliding window.
pub fn check_task_times_comply(
    kinds: &[TaskKind],
    event_times: &[u32],
    limits: &ComplianceLimits,
) -> bool {
    let session = limits.session_duration_seconds;
    let max_seconds_last_comm = session - limits.seconds_before_comm_stop;

    let comm_too_late = kinds
        .iter()
        .zip(event_times)
        .any(|(k, &t)| k.is_comm() && t >= max_seconds_last_comm);
    let comm_too_early = kinds
        .iter()
        .zip(event_times)
        .any(|(k, &t)| k.is_comm() && t <= limits.seconds_after_comm_start);
    if comm_too_late || comm_too_early {
        return false;
    }

    let times_of = |wanted: fn(&TaskKind) -> bool| -> Vec<u32> {
        kinds
            .iter()
            .zip(event_times)
            .filter(|(k, _)| wanted(k))
            .map(|(_, &t)| t)
            .collect()
    };

    let comm_times = times_of(TaskKind::is_comm);
    if min_gap_violated(&comm_times, limits.min_seconds_between_comm) {
        return false;
    }

    let resman_cutoff = session - limits.min_seconds_fail_fix_resman - 1;
    let resman_too_late = kinds
        .iter()
        .zip(event_times)
        .any(|(k, &t)| *k == TaskKind::Resman && t >= resman_cutoff);
    if resman_too_late {
        return false;
    }

    let light_times = times_of(|k| *k == TaskKind::SysmonLight);
    if min_gap_violated(&light_times, limits.min_seconds_between_sysmon_light) {
        return false;
    }
    let scale_times = times_of(|k| *k == TaskKind::SysmonScale);
    if min_gap_violated(&scale_times, limits.min_seconds_between_sysmon_scale) {
        return false;
    }

    !has_repeated_kinds(kinds, limits.max_repeats, limits.window_size)
}

fn min_gap_violated(times: &[u32], min_gap: u32) -> bool {
    times.windows(2).any(|pair| pair[1] - pair[0] < min_gap)
}

/// Whether any kind occurs more than `max_repeats` times within a sliding
/// window of `window_size` consecutive tasks.
pub fn has_repeated_kinds(kinds: &[TaskKind], max_repeats: usize, window_size: usize) -> bool {
    if kinds.len() < window_size {
        return false;
    }
    kinds.windows(window_size).any(|window| {
        TaskKind::ALL
            .iter()
            .any(|kind| window.iter().filter(|k| *k == kind).count() > max_repeats)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn limits_for_test() -> ComplianceLimits {
        ComplianceLimits {
            seconds_before_comm_stop: 30,
            seconds_after_comm_start: 5,
            min_seconds_fail_fix_resman: 20,
            session_duration_seconds: 90,
            min_seconds_between_comm: 30,
            min_seconds_between_sysmon_light: 15,
            min_seconds_between_sysmon_scale: 10,
            max_repeats: 2,
            window_size: 3,
        }
    }

    #[test]
    fn rejects_comm_too_close_to_session_end() {
        use TaskKind::*;
        let kinds = [Resman, SysmonLight, SysmonScale, Resman, CommOther, SysmonScale];
        let times = [5, 20, 40, 50, 75, 80];
        assert!(!check_task_times_comply(&kinds, &times, &limits_for_test()));
    }

    #[test]
    fn rejects_comm_tasks_too_close_together() {
        use TaskKind::*;
        let kinds = [Resman, SysmonScale, CommOwn, CommOther, SysmonLight, SysmonScale];
        let times = [5, 20, 40, 50, 60, 80];
        assert!(!check_task_times_comply(&kinds, &times, &limits_for_test()));
    }

    #[test]
    fn rejects_sysmon_lights_too_close_together() {
        use TaskKind::*;
        let kinds = [Resman, SysmonLight, SysmonLight, CommOwn, SysmonScale];
        let times = [5, 20, 30, 50, 60];
        assert!(!check_task_times_comply(&kinds, &times, &limits_for_test()));
    }

    #[test]
    fn accepts_compliant_ordering() {
        use TaskKind::*;
        let kinds = [Resman, SysmonLight, SysmonScale, CommOwn, SysmonScale];
        let times = [5, 20, 40, 50, 60];
        assert!(check_task_times_comply(&kinds, &times, &limits_for_test()));
    }

    #[test]
    fn detects_repeats_in_window() {
        use TaskKind::*;
        assert!(has_repeated_kinds(
            &[Resman, Resman, Resman, CommOwn],
            2,
            3
        ));
        assert!(!has_repeated_kinds(
            &[Resman, Resman, CommOwn, Resman],
            2,
            3
        ));
        assert!(!has_repeated_kinds(&[Resman, Resman], 2, 3));
    }

    #[test]
    fn constant_gap_yields_exact_boundaries() {
        // min == max pins every gap, so the timeline is seed independent:
        // an 80 s session with 10 s gaps gives exactly five event times.
        let mut rng = StdRng::seed_from_u64(42);
        let times = generate_event_times(&mut rng, 10, 10, 80);
        assert_eq!(times, vec![10, 20, 30, 40, 50]);
        let mut other = StdRng::seed_from_u64(7);
        assert_eq!(generate_event_times(&mut other, 10, 10, 80), times);
    }

    #[test]
    fn event_times_are_increasing_and_within_grace() {
        let mut rng = StdRng::seed_from_u64(1);
        let times = generate_event_times(&mut rng, 10, 35, 600);
        assert!(!times.is_empty());
        assert!(times.windows(2).all(|p| p[0] < p[1]));
        assert!(*times.last().unwrap() <= 600 - GRACE_SECONDS_BEFORE_SESSION_END);
    }

    #[test]
    fn same_seed_same_times() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        assert_eq!(
            generate_event_times(&mut a, 10, 35, 600),
            generate_event_times(&mut b, 10, 35, 600)
        );
    }

    #[test]
    fn adjust_trims_or_pads_to_event_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let kinds = vec![TaskKind::Resman; 8];
        let (adjusted, n_kinds, n_times) = adjust_task_kinds(&mut rng, kinds, 5);
        assert_eq!((adjusted.len(), n_kinds, n_times), (5, 8, 5));

        let kinds = vec![TaskKind::Resman; 3];
        let (adjusted, n_kinds, n_times) = adjust_task_kinds(&mut rng, kinds, 6);
        assert_eq!((adjusted.len(), n_kinds, n_times), (6, 3, 6));
    }
}
