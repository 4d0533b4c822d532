//! Typed model of a MATB-II scenario event.

use super::time::format_seconds;

/// Color of a system-monitoring warning light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightColor {
    Green,
    Red,
}

impl LightColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightColor::Green => "GREEN",
            LightColor::Red => "RED",
        }
    }
}

/// Which of the four monitoring scales drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleNumber {
    One,
    Two,
    Three,
    Four,
}

impl ScaleNumber {
    pub const ALL: [ScaleNumber; 4] = [
        ScaleNumber::One,
        ScaleNumber::Two,
        ScaleNumber::Three,
        ScaleNumber::Four,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleNumber::One => "ONE",
            ScaleNumber::Two => "TWO",
            ScaleNumber::Three => "THREE",
            ScaleNumber::Four => "FOUR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    Up,
    Down,
}

impl ScaleDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleDirection::Up => "UP",
            ScaleDirection::Down => "DOWN",
        }
    }
}

/// Event payload, one variant per MATB-II task element.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Scheduler directive (`<sched>`), e.g. starting a task or switching
    /// tracking between MANUAL and AUTO.
    Sched {
        task: &'static str,
        action: &'static str,
        update: &'static str,
        response: &'static str,
    },
    /// Resource-management pump failure.
    ResmanFail { pump: String },
    /// Resource-management pump repair.
    ResmanFix { pump: String },
    /// System-monitoring light task. `activity_start` mirrors the
    /// `activity="START"` attribute on the `<sysmon>` element.
    SysmonLight {
        color: LightColor,
        activity_start: bool,
    },
    /// System-monitoring scale task.
    SysmonScale {
        number: ScaleNumber,
        direction: ScaleDirection,
    },
    /// Communications task referencing an audio recording.
    Comm {
        ship: String,
        radio: String,
        freq: String,
    },
    /// Session control marker (`START` / `END`).
    Control(&'static str),
    /// Rating prompt marker.
    Rate(&'static str),
}

/// One timestamped scenario event.
///
/// `start_time` is the rendered timestamp. It is kept separate from
/// `seconds` because the fixed preamble events use the unpadded `0:00:01`
/// form while generated events use `00:00:01`; the downstream simulator
/// accepts both and existing scenario files mix them.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub seconds: u32,
    pub start_time: String,
    pub label: Option<&'static str>,
    pub payload: Payload,
}

impl Event {
    /// Event at a second offset with the standard zero-padded timestamp.
    pub fn at(seconds: u32, label: Option<&'static str>, payload: Payload) -> Self {
        Self {
            seconds,
            start_time: format_seconds(seconds),
            label,
            payload,
        }
    }

    /// Event with a verbatim timestamp, used for the fixed preamble.
    pub fn at_literal(start_time: &str, seconds: u32, payload: Payload) -> Self {
        Self {
            seconds,
            start_time: start_time.to_owned(),
            label: None,
            payload,
        }
    }

    pub fn is_comm(&self) -> bool {
        matches!(self.payload, Payload::Comm { .. })
    }

    pub fn is_sysmon(&self) -> bool {
        matches!(
            self.payload,
            Payload::SysmonLight { .. } | Payload::SysmonScale { .. }
        )
    }
}

/// Stable sort by second offset; events at the same offset keep their
/// insertion order.
pub fn sort_by_seconds(events: &mut [Event]) {
    events.sort_by_key(|e| e.seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_stable_at_equal_offsets() {
        let mut events = vec![
            Event::at(5, None, Payload::Control("END")),
            Event::at(1, None, Payload::Rate("START")),
            Event::at(5, None, Payload::Control("START")),
        ];
        sort_by_seconds(&mut events);
        assert_eq!(events[0].payload, Payload::Rate("START"));
        assert_eq!(events[1].payload, Payload::Control("END"));
        assert_eq!(events[2].payload, Payload::Control("START"));
    }
}
