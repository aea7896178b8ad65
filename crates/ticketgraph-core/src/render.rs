//! PlantUML object-diagram output.
//!
//! The document is a preamble, one `object` block per visible ticket, one
//! `<blocker> <|-- <blocked>` line per outward link, and a trailer. The
//! inheritance arrow is borrowed to mean "blocks"; PlantUML does the layout.
//!
//! Objects are named by the identifier with [`KEY_SEPARATOR`] stripped. An
//! arrow may point at a ticket whose object was suppressed; PlantUML draws a
//! bare node for it.
//!
//! [`KEY_SEPARATOR`]: crate::model::KEY_SEPARATOR

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::io::{BufWriter, Write};

use crate::error::RenderError;
use crate::model::{TicketMap, TicketRecord, normalize_key};
use crate::options::Options;

pub const PREAMBLE: &str = "@startuml";
pub const TRAILER: &str = "@enduml";

/// Counters for one rendered diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub objects: usize,
    pub suppressed: usize,
    pub relationships: usize,
}

/// Write the diagram for `tickets` to `out`.
///
/// # Errors
///
/// [`RenderError::KeyCollision`] before anything is written if two
/// identifiers share an object name, and [`RenderError::Write`] if `out`
/// fails.
pub fn render<W: Write>(
    tickets: &TicketMap,
    options: &Options,
    out: &mut W,
) -> Result<RenderStats, RenderError> {
    check_collisions(tickets)?;

    let mut stats = RenderStats::default();

    writeln!(out, "{PREAMBLE}")?;
    writeln!(out, "skinparam wrapWidth {}", options.wrap_width)?;

    for record in tickets.values() {
        if is_suppressed(record, options) {
            stats.suppressed += 1;
            continue;
        }
        write_object(out, record, options)?;
        stats.objects += 1;
    }

    for record in tickets.values() {
        if options.keys.is_hidden(&record.key) {
            continue;
        }
        let blocker = normalize_key(&record.key);
        for blocked in &record.blocks {
            writeln!(out, "{blocker} <|-- {}", normalize_key(blocked))?;
            stats.relationships += 1;
        }
    }

    writeln!(out, "{TRAILER}")?;
    Ok(stats)
}

/// Buffer the whole diagram and flush it to `sink` once.
///
/// A failed final flush is logged rather than returned; whatever reached the
/// sink stays there.
///
/// # Errors
///
/// Anything [`render`] returns.
pub fn write_diagram<W: Write>(
    tickets: &TicketMap,
    options: &Options,
    sink: W,
) -> Result<RenderStats, RenderError> {
    let mut out = BufWriter::new(sink);
    let stats = render(tickets, options, &mut out)?;

    if let Err(err) = out.flush() {
        tracing::error!(error = %err, "couldn't flush output, diagram may be incomplete");
    }

    tracing::info!(
        objects = stats.objects,
        suppressed = stats.suppressed,
        relationships = stats.relationships,
        "rendered diagram"
    );
    Ok(stats)
}

fn is_suppressed(record: &TicketRecord, options: &Options) -> bool {
    options.keys.is_hidden(&record.key)
        || (record.is_orphan() && options.hide_orphans && !options.keys.is_pinned(&record.key))
}

fn write_object<W: Write>(
    out: &mut W,
    record: &TicketRecord,
    options: &Options,
) -> Result<(), RenderError> {
    write!(out, "object {}", normalize_key(&record.key))?;
    if options.keys.is_highlighted(&record.key) {
        write!(out, " #{}", options.highlight_color)?;
    }
    writeln!(out, " {{")?;
    writeln!(out, "  {}", record.effective_status().to_uppercase())?;
    if let Some(summary) = record
        .summary
        .as_deref()
        .filter(|s| !options.hide_summary && !s.is_empty())
    {
        writeln!(out, "  {summary}")?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn check_collisions(tickets: &TicketMap) -> Result<(), RenderError> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(tickets.len());
    for key in tickets.keys() {
        let normalized = normalize_key(key);
        if let Some(first) = seen.get(&normalized) {
            return Err(RenderError::KeyCollision {
                first: (*first).to_string(),
                second: key.clone(),
                normalized,
            });
        }
        seen.insert(normalized, key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TicketRecord;
    use crate::options::{KeyRules, KeySet};
    use std::io;

    fn ticket(key: &str, status: Option<&str>, summary: Option<&str>) -> TicketRecord {
        let mut record = TicketRecord::from_row(key);
        record.status = status.map(str::to_string);
        record.summary = summary.map(str::to_string);
        record
    }

    fn blocking_pair() -> TicketMap {
        let mut first = ticket("TKT-1", Some("Open"), Some("Write the parser"));
        first.blocks.push("TKT-2".to_string());
        let mut second = ticket("TKT-2", Some("Done"), None);
        second.blocked_by.push("TKT-1".to_string());

        let mut tickets = TicketMap::new();
        tickets.insert(first.key.clone(), first);
        tickets.insert(second.key.clone(), second);
        tickets
    }

    fn render_to_string(tickets: &TicketMap, options: &Options) -> String {
        let mut out = Vec::new();
        render(tickets, options, &mut out).expect("render");
        String::from_utf8(out).expect("utf-8")
    }

    #[test]
    fn renders_objects_then_relationships() {
        let text = render_to_string(&blocking_pair(), &Options::default());
        assert_eq!(
            text,
            "@startuml\n\
             skinparam wrapWidth 150\n\
             object TKT1 {\n  OPEN\n  Write the parser\n}\n\
             object TKT2 {\n  DONE\n}\n\
             TKT1 <|-- TKT2\n\
             @enduml\n"
        );
    }

    #[test]
    fn empty_map_renders_bare_document() {
        let options = Options {
            wrap_width: 80,
            ..Options::default()
        };
        let text = render_to_string(&TicketMap::new(), &options);
        assert_eq!(text, "@startuml\nskinparam wrapWidth 80\n@enduml\n");
    }

    #[test]
    fn missing_status_renders_unknown() {
        let mut tickets = TicketMap::new();
        tickets.insert("TKT-3".to_string(), ticket("TKT-3", None, None));
        let options = Options {
            hide_orphans: false,
            ..Options::default()
        };
        let text = render_to_string(&tickets, &options);
        assert!(text.contains("object TKT3 {\n  UNKNOWN\n}\n"));
    }

    #[test]
    fn orphans_hidden_unless_pinned() {
        let mut tickets = blocking_pair();
        tickets.insert("TKT-7".to_string(), ticket("TKT-7", Some("Open"), None));
        tickets.insert("TKT-8".to_string(), ticket("TKT-8", Some("Open"), None));

        let options = Options {
            keys: KeyRules {
                show: KeySet::parse("TKT-8"),
                ..KeyRules::default()
            },
            ..Options::default()
        };
        let text = render_to_string(&tickets, &options);
        assert!(!text.contains("object TKT7"));
        assert!(text.contains("object TKT8 {"));

        let shown = Options {
            hide_orphans: false,
            ..Options::default()
        };
        assert!(render_to_string(&tickets, &shown).contains("object TKT7 {"));
    }

    #[test]
    fn arrow_to_suppressed_object_is_still_emitted() {
        let mut tickets = blocking_pair();
        tickets.insert("TKT-5".to_string(), ticket("TKT-5", Some("Open"), None));
        if let Some(record) = tickets.get_mut("TKT-1") {
            record.blocks.push("TKT-5".to_string());
        }
        let options = Options {
            keys: KeyRules {
                hide: KeySet::parse("TKT-5"),
                ..KeyRules::default()
            },
            ..Options::default()
        };

        let text = render_to_string(&tickets, &options);
        assert!(!text.contains("object TKT5"));
        assert!(text.contains("TKT1 <|-- TKT5\n"));
    }

    #[test]
    fn hidden_ticket_emits_no_relationships() {
        let options = Options {
            keys: KeyRules {
                hide: KeySet::parse("TKT-1"),
                ..KeyRules::default()
            },
            ..Options::default()
        };
        let text = render_to_string(&blocking_pair(), &options);
        assert!(!text.contains("object TKT1"));
        assert!(!text.contains("<|--"));
        assert!(text.contains("object TKT2 {"));
    }

    #[test]
    fn summaries_can_be_suppressed() {
        let options = Options {
            hide_summary: true,
            ..Options::default()
        };
        let text = render_to_string(&blocking_pair(), &options);
        assert!(!text.contains("Write the parser"));
        assert!(text.contains("object TKT1 {\n  OPEN\n}\n"));
    }

    #[test]
    fn highlighted_tickets_carry_colour() {
        let options = Options {
            keys: KeyRules {
                highlight: KeySet::parse("TKT-2"),
                ..KeyRules::default()
            },
            highlight_color: "salmon".to_string(),
            ..Options::default()
        };
        let text = render_to_string(&blocking_pair(), &options);
        assert!(text.contains("object TKT2 #salmon {\n"));
        assert!(text.contains("object TKT1 {\n"));
    }

    #[test]
    fn colliding_object_names_are_rejected() {
        let mut tickets = TicketMap::new();
        tickets.insert("AB-1".to_string(), ticket("AB-1", None, None));
        tickets.insert("A-B1".to_string(), ticket("A-B1", None, None));

        let mut out = Vec::new();
        let err = render(&tickets, &Options::default(), &mut out).expect_err("should fail");
        assert!(matches!(
            err,
            RenderError::KeyCollision { ref first, ref second, ref normalized }
                if first == "A-B1" && second == "AB-1" && normalized == "AB1"
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn stats_count_what_was_written() {
        let mut tickets = blocking_pair();
        tickets.insert("TKT-9".to_string(), ticket("TKT-9", None, None));
        let mut out = Vec::new();
        let stats = render(&tickets, &Options::default(), &mut out).expect("render");
        assert_eq!(
            stats,
            RenderStats {
                objects: 2,
                suppressed: 1,
                relationships: 1,
            }
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[test]
    fn write_failure_aborts_render() {
        let err = render(&blocking_pair(), &Options::default(), &mut FailingWriter)
            .expect_err("should fail");
        assert!(matches!(err, RenderError::Write(_)));
    }

    #[test]
    fn flush_failure_is_not_an_error() {
        let stats =
            write_diagram(&blocking_pair(), &Options::default(), FailingWriter).expect("logged only");
        assert_eq!(stats.objects, 2);
    }
}
