use crate::chart::{NoteEvent, SpecialEvent};

/// A recognised body line inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackLine {
    /// `tick = N lane duration`
    Note(NoteEvent),
    /// `tick = S code length`
    Special(SpecialEvent),
}

/// Parse one body line. Anything that is not a well-formed note or special
/// line yields `None`; extra trailing tokens are ignored.
pub fn parse_track_line(line: &str) -> Option<TrackLine> {
    let mut parts = line.split_whitespace();
    let tick = parts.next()?.parse::<u32>().ok()?;
    if parts.next()? != "=" {
        return None;
    }
    let marker = parts.next()?;
    let value = parts.next()?.parse::<u32>().ok()?;
    let length = parts.next()?.parse::<u32>().ok()?;

    match marker {
        "N" => {
            let lane = u8::try_from(value).ok()?;
            Some(TrackLine::Note(NoteEvent::new(tick, lane, length)))
        }
        "S" => Some(TrackLine::Special(SpecialEvent::new(tick, value, length))),
        _ => None,
    }
}

/// Render a complete section block, events sorted by tick.
///
/// Layout: `[Name]`, `{`, one `  tick = N lane duration` line per event and
/// `}`, each ended by `newline`, with a blank line ahead of the header. At
/// equal ticks special lines precede note lines.
pub fn render_section(
    name: &str,
    notes: &[NoteEvent],
    specials: &[SpecialEvent],
    newline: &str,
) -> String {
    let mut lines: Vec<(u32, u8, TrackLine)> = specials
        .iter()
        .map(|s| (s.tick, 0, TrackLine::Special(*s)))
        .chain(notes.iter().map(|n| (n.tick, 1, TrackLine::Note(*n))))
        .collect();
    lines.sort_by_key(|(tick, order, _)| (*tick, *order));

    let mut out = format!("{nl}[{}]{nl}{{{nl}", name, nl = newline);
    for (_, _, line) in lines {
        let body = match line {
            TrackLine::Note(n) => format!("  {} = N {} {}", n.tick, n.lane, n.duration),
            TrackLine::Special(s) => format!("  {} = S {} {}", s.tick, s.code, s.length),
        };
        out.push_str(&body);
        out.push_str(newline);
    }
    out.push('}');
    out.push_str(newline);
    out
}
