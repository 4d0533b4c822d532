//! Rendering of the MATB-EVENTS XML script.
//!
//! The output format is an external contract with the MATB-II simulator and
//! matches the layout of the published scenario files: declaration line,
//! events at column zero, children indented with tabs, comment lines inside
//! events, no blank lines and no trailing newline.

use super::event::{Event, Payload};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>";

/// Render a sorted event sequence as a complete MATB-EVENTS document.
pub fn render(events: &[Event]) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str("<MATB-EVENTS>\n");
    for event in events {
        render_event(&mut out, event);
    }
    out.push_str("</MATB-EVENTS>");
    out
}

fn render_event(out: &mut String, event: &Event) {
    out.push_str(&format!("<event startTime=\"{}\">\n", event.start_time));
    if let Some(label) = event.label {
        out.push_str(&format!("\t<!--{label}-->\n"));
    }
    match &event.payload {
        Payload::Sched {
            task,
            action,
            update,
            response,
        } => {
            out.push_str("\t<sched>\n");
            out.push_str(&format!("\t\t<task>{task}</task>\n"));
            out.push_str(&format!("\t\t<action>{action}</action>\n"));
            out.push_str(&format!("\t\t<update>{update}</update>\n"));
            out.push_str(&format!("\t\t<response>{response}</response>\n"));
            out.push_str("\t</sched>\n");
        }
        Payload::ResmanFail { pump } => {
            out.push_str("\t<resman>\n");
            out.push_str(&format!("\t\t<fail>{pump}</fail>\n"));
            out.push_str("\t</resman>\n");
        }
        Payload::ResmanFix { pump } => {
            out.push_str("\t<resman>\n");
            out.push_str(&format!("\t\t<fix>{pump}</fix>\n"));
            out.push_str("\t</resman>\n");
        }
        Payload::SysmonLight {
            color,
            activity_start,
        } => {
            if *activity_start {
                out.push_str("\t<sysmon activity=\"START\">\n");
            } else {
                out.push_str("\t<sysmon>\n");
            }
            out.push_str(&format!(
                "\t\t<monitoringLightType>{}</monitoringLightType>\n",
                color.as_str()
            ));
            out.push_str("\t</sysmon>\n");
        }
        Payload::SysmonScale { number, direction } => {
            out.push_str("\t<sysmon>\n");
            out.push_str(&format!(
                "\t\t<monitoringScaleNumber>{}</monitoringScaleNumber>\n",
                number.as_str()
            ));
            out.push_str(&format!(
                "\t\t<monitoringScaleDirection>{}</monitoringScaleDirection>\n",
                direction.as_str()
            ));
            out.push_str("\t</sysmon>\n");
        }
        Payload::Comm { ship, radio, freq } => {
            out.push_str("\t<comm>\n");
            out.push_str(&format!("\t\t<ship>{ship}</ship>\n"));
            out.push_str(&format!("\t\t<radio>{radio}</radio>\n"));
            out.push_str(&format!("\t\t<freq>{freq}</freq>\n"));
            out.push_str("\t</comm>\n");
        }
        Payload::Control(action) => {
            out.push_str(&format!("\t<control>{action}</control>\n"));
        }
        Payload::Rate(action) => {
            out.push_str(&format!("\t<rate>{action}</rate>\n"));
        }
    }
    out.push_str("</event>\n");
}

#[cfg(test)]
mod tests {
    use super::super::event::{LightColor, ScaleDirection, ScaleNumber};
    use super::*;

    #[test]
    fn renders_sched_event_verbatim() {
        let events = [Event::at_literal(
            "0:00:01",
            1,
            Payload::Sched {
                task: "RESSYS",
                action: "START",
                update: "NULL",
                response: "NULL",
            },
        )];
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n\
                        <MATB-EVENTS>\n\
                        <event startTime=\"0:00:01\">\n\
                        \t<sched>\n\
                        \t\t<task>RESSYS</task>\n\
                        \t\t<action>START</action>\n\
                        \t\t<update>NULL</update>\n\
                        \t\t<response>NULL</response>\n\
                        \t</sched>\n\
                        </event>\n\
                        </MATB-EVENTS>";
        assert_eq!(render(&events), expected);
    }

    #[test]
    fn green_light_carries_activity_attribute() {
        let green = Event::at(
            10,
            Some("System Monitoring task"),
            Payload::SysmonLight {
                color: LightColor::Green,
                activity_start: true,
            },
        );
        let rendered = render(std::slice::from_ref(&green));
        assert!(rendered.contains("<event startTime=\"00:00:10\">"));
        assert!(rendered.contains("\t<!--System Monitoring task-->\n"));
        assert!(rendered.contains("\t<sysmon activity=\"START\">\n"));
        assert!(rendered.contains("\t\t<monitoringLightType>GREEN</monitoringLightType>\n"));

        let red = Event::at(
            10,
            None,
            Payload::SysmonLight {
                color: LightColor::Red,
                activity_start: false,
            },
        );
        assert!(render(std::slice::from_ref(&red)).contains("\t<sysmon>\n"));
    }

    #[test]
    fn renders_scale_and_comm_children() {
        let events = [
            Event::at(
                20,
                None,
                Payload::SysmonScale {
                    number: ScaleNumber::Three,
                    direction: ScaleDirection::Down,
                },
            ),
            Event::at(
                30,
                None,
                Payload::Comm {
                    ship: "OWN".into(),
                    radio: "NAV1".into(),
                    freq: "112.775".into(),
                },
            ),
        ];
        let rendered = render(&events);
        assert!(rendered.contains("<monitoringScaleNumber>THREE</monitoringScaleNumber>"));
        assert!(rendered.contains("<monitoringScaleDirection>DOWN</monitoringScaleDirection>"));
        assert!(rendered.contains("<freq>112.775</freq>"));
    }

    #[test]
    fn no_blank_lines_or_trailing_newline() {
        let events = [Event::at(0, None, Payload::Control("START"))];
        let rendered = render(&events);
        assert!(!rendered.ends_with('\n'));
        assert!(!rendered.contains("\n\n"));
    }
}
