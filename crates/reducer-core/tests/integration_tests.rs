//! Integration tests for reducer-core
//!
//! These tests drive whole charts through a session: load, regenerate,
//! save and re-read the output.

use std::collections::BTreeSet;
use std::fs;

use reducer_core::chart::{Difficulty, Instrument};
use reducer_core::midi::{Chunk, Header, MidiFile, TrackBuilder, scan_track};
use reducer_core::text::ChartText;
use reducer_core::{ChartFormat, Error, RuleSet, Session, default_output_path};
use tempfile::TempDir;

fn note_track(name: &str, notes: &[(u32, u8, u32)]) -> Chunk {
    let mut events: Vec<(u32, bool, u8)> = Vec::new();
    for &(tick, pitch, duration) in notes {
        events.push((tick, true, pitch));
        events.push((tick + duration, false, pitch));
    }
    events.sort_by_key(|&(tick, on, _)| (tick, on));

    let mut builder = TrackBuilder::new();
    builder.track_name(name);
    for (tick, on, pitch) in events {
        if on {
            builder.note_on(tick, pitch, 100);
        } else {
            builder.note_off(tick, pitch);
        }
    }
    builder.finish()
}

fn tempo_track() -> Chunk {
    Chunk::track(&[
        0x00, 0xFF, 0x03, 0x04, b'T', b'E', b'M', b'P', // name
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo
        0x00, 0xFF, 0x2F, 0x00,
    ])
}

fn vocals_track() -> Chunk {
    Chunk::track(&[
        0x00, 0xFF, 0x03, 0x0B, b'P', b'A', b'R', b'T', b' ', b'V', b'O', b'C', b'A', b'L', b'S',
        0x00, 0xFF, 0x05, 0x03, b'l', b'a', b'!', // lyric
        0x00, 0x90, 0x3C, 0x64, 0x60, 0x80, 0x3C, 0x00, 0x00, 0xFF, 0x2F, 0x00,
    ])
}

/// Sixteen Expert notes 96 ticks apart cycling through the lanes, a chord at
/// tick 0, a boost phrase at 480 and a stale Easy note at tick 7.
fn guitar_notes() -> Vec<(u32, u8, u32)> {
    let mut notes: Vec<_> = (0..16u32)
        .map(|i| (i * 96, 96 + (i % 5) as u8, 48))
        .collect();
    notes.push((0, 98, 48));
    notes.push((480, 116, 192));
    notes.push((7, 61, 20));
    notes
}

fn midi_bytes(chunks: Vec<Chunk>, division: u16) -> Vec<u8> {
    MidiFile {
        header: Header {
            format: 1,
            track_count: chunks.len() as u16,
            division,
        },
        chunks,
        trailing: Vec::new(),
    }
    .to_bytes()
}

fn sample_midi() -> Vec<u8> {
    midi_bytes(
        vec![
            tempo_track(),
            note_track("PART GUITAR", &guitar_notes()),
            vocals_track(),
        ],
        480,
    )
}

mod midi_tests {
    use super::*;

    #[test]
    fn test_binary_end_to_end() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("song.mid");
        let input = sample_midi();
        fs::write(&source, &input).unwrap();

        let session = Session::open(&source, RuleSet::default()).unwrap();
        let regeneration = session.regenerate().unwrap();
        let destination = default_output_path(&source);
        let summary = session.save(&regeneration, &destination).unwrap();

        assert_eq!(destination.file_name().unwrap(), "REDUCED_song.mid");
        assert_eq!(summary.division, Some(480));
        assert_eq!(summary.instruments.len(), 1);

        let original = MidiFile::parse(&input).unwrap();
        let output = MidiFile::parse(&fs::read(&destination).unwrap()).unwrap();

        assert_eq!(output.header.division, 480);
        assert_eq!(output.header.format, 1);
        assert_eq!(output.chunks.len(), 3);
        assert_eq!(output.chunks[0], original.chunks[0]);
        assert_eq!(output.chunks[2], original.chunks[2]);
        assert_ne!(output.chunks[1], original.chunks[1]);

        let guitar = scan_track(output.chunks[1].payload(), 10);
        assert_eq!(guitar.name.as_deref(), Some("PART GUITAR"));
        assert!(guitar.status.is_complete());
        assert!(
            guitar.notes.iter().all(|n| n.tick != 7),
            "stale Easy note must be replaced"
        );
        assert!(guitar.notes.iter().any(|n| n.pitch == 116 && n.duration == 192));

        let expert_count = guitar.notes.iter().filter(|n| (96..101).contains(&n.pitch)).count();
        assert_eq!(expert_count, 17);
    }

    #[test]
    fn test_boost_tick_present_in_every_tier() {
        let session =
            Session::from_bytes("song.mid", ChartFormat::Midi, &sample_midi(), RuleSet::default())
                .unwrap();
        let output = MidiFile::parse(&session.render(&session.regenerate().unwrap())).unwrap();
        let guitar = scan_track(output.chunks[1].payload(), 10);

        for base in [60u8, 72, 84, 96] {
            assert!(
                guitar
                    .notes
                    .iter()
                    .any(|n| n.tick == 480 && (base..base + 5).contains(&n.pitch)),
                "tier at pitch {} lost the boost tick",
                base
            );
        }
    }

    #[test]
    fn test_generated_tiers_respect_limits() {
        let session =
            Session::from_bytes("song.mid", ChartFormat::Midi, &sample_midi(), RuleSet::default())
                .unwrap();
        let output = MidiFile::parse(&session.render(&session.regenerate().unwrap())).unwrap();
        let reparsed = Session::from_bytes(
            "out.mid",
            ChartFormat::Midi,
            &output.to_bytes(),
            RuleSet::default(),
        )
        .unwrap();
        let guitar = &reparsed.instruments()[&Instrument::Guitar];

        let ticks = |d: Difficulty| -> BTreeSet<u32> {
            guitar.tracks[&d].iter().map(|n| n.tick).collect()
        };
        assert!(guitar.tracks[&Difficulty::Easy].iter().all(|n| n.lane <= 2));
        assert!(guitar.tracks[&Difficulty::Medium].iter().all(|n| n.lane <= 3));
        assert!(ticks(Difficulty::Easy).len() <= ticks(Difficulty::Medium).len());
        assert!(ticks(Difficulty::Medium).len() <= ticks(Difficulty::Hard).len());
        assert!(ticks(Difficulty::Hard).len() <= ticks(Difficulty::Expert).len());

        for notes in [
            &guitar.tracks[&Difficulty::Medium],
            &guitar.tracks[&Difficulty::Easy],
        ] {
            let mut per_tick = std::collections::BTreeMap::<u32, usize>::new();
            for note in notes {
                *per_tick.entry(note.tick).or_default() += 1;
            }
            assert!(per_tick.values().all(|&count| count == 1));
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        let session =
            Session::from_bytes("song.mid", ChartFormat::Midi, &sample_midi(), RuleSet::default())
                .unwrap();

        let first = session.render(&session.regenerate().unwrap());
        let second = session.render(&session.regenerate().unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_chart_without_instruments_is_untouched() {
        let input = midi_bytes(vec![tempo_track(), vocals_track()], 192);

        let session =
            Session::from_bytes("vocals.mid", ChartFormat::Midi, &input, RuleSet::default())
                .unwrap();

        assert!(matches!(session.regenerate(), Err(Error::NothingToRegenerate)));
        assert_eq!(MidiFile::parse(&input).unwrap().to_bytes(), input);
    }

    #[test]
    fn test_instrument_without_expert_is_skipped() {
        let input = midi_bytes(
            vec![
                note_track("PART GUITAR", &[(0, 96, 10), (96, 97, 10)]),
                note_track("PART BASS", &[(0, 84, 10)]),
            ],
            192,
        );
        let session =
            Session::from_bytes("song.mid", ChartFormat::Midi, &input, RuleSet::default())
                .unwrap();

        let regeneration = session.regenerate().unwrap();
        let output = MidiFile::parse(&session.render(&regeneration)).unwrap();
        let original = MidiFile::parse(&input).unwrap();

        assert_eq!(regeneration.skipped, vec![Instrument::Bass]);
        assert_eq!(output.chunks[1], original.chunks[1]);
    }

    #[test]
    fn test_truncated_unmatched_chunk_passes_through() {
        let mut input = midi_bytes(vec![note_track("PART KEYS", &[(0, 96, 10), (96, 98, 10)])], 192);
        input.extend_from_slice(b"MTrk\x00\x00\x00\x40\x00\xFF\x03\x05EVE");

        let session =
            Session::from_bytes("song.mid", ChartFormat::Midi, &input, RuleSet::default())
                .unwrap();
        let output = session.render(&session.regenerate().unwrap());

        let reports = session.chunk_reports();
        assert_eq!(reports.len(), 2);
        assert!(!reports[1].status.is_complete());
        assert!(reports[1].truncated);
        assert!(!reports[0].truncated);
        assert!(output.ends_with(b"MTrk\x00\x00\x00\x40\x00\xFF\x03\x05EVE"));
    }

    #[test]
    fn test_malformed_header_is_fatal() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("broken.mid");
        fs::write(&source, b"RIFF\x00\x00\x00\x06\x00\x01\x00\x01\x00\xC0").unwrap();

        let err = Session::open(&source, RuleSet::default()).err().unwrap();

        assert!(matches!(err, Error::MalformedHeader { .. }));
        assert_eq!(err.fallback_division(), Some(192));
    }
}

mod text_tests {
    use super::*;

    const HARD_SECTION: &str = "[HardSingle]\r\n{\r\n  0 = N 4 0\r\n}\r\n";

    fn sample_chart() -> String {
        let mut chart = String::from(
            "[Song]\r\n{\r\n  Name = \"Test\"\r\n  Resolution = 192\r\n}\r\n\
             [SyncTrack]\r\n{\r\n  0 = B 120000\r\n}\r\n\
             [Events]\r\n{\r\n  0 = E \"section Intro\"\r\n}\r\n\
             [ExpertSingle]\r\n{\r\n",
        );
        for i in 0..12u32 {
            chart.push_str(&format!("  {} = N {} 0\r\n", i * 192, i % 5));
        }
        chart.push_str("  960 = S 2 384\r\n  960 = E solo\r\n}\r\n");
        chart.push_str(HARD_SECTION);
        chart.push_str("[ExpertKeys]\r\n{\r\n}\r\n");
        chart
    }

    #[test]
    fn test_text_end_to_end() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("song.chart");
        let input = sample_chart();
        fs::write(&source, &input).unwrap();

        let session = Session::open(&source, RuleSet::default()).unwrap();
        let regeneration = session.regenerate().unwrap();
        let destination = temp.path().join("out.chart");
        let summary = session.save(&regeneration, &destination).unwrap();
        let output = fs::read_to_string(&destination).unwrap();

        assert_eq!(summary.division, Some(192));
        assert_eq!(summary.skipped, vec![Instrument::Keys]);

        let kept = input.replace(HARD_SECTION, "");
        assert!(output.starts_with(&kept));
        let appended = &output[kept.len()..];
        assert!(appended.starts_with("\r\n[HardSingle]\r\n{\r\n"));
        assert!(appended.contains("\r\n[MediumSingle]\r\n"));
        assert!(appended.contains("\r\n[EasySingle]\r\n"));
        assert_eq!(appended.matches("  960 = S 2 384\r\n").count(), 3);
        assert_eq!(output.matches('\n').count(), output.matches("\r\n").count());
        assert!(!appended.contains("ExpertSingle"));
    }

    #[test]
    fn test_text_zero_sustain_preserved() {
        let input = "[ExpertSingle]\n{\n  0 = N 0 0\n  192 = N 1 0\n  384 = N 2 0\n}\n";
        let session = Session::from_bytes(
            "song.chart",
            ChartFormat::Text,
            input.as_bytes(),
            RuleSet::default(),
        )
        .unwrap();

        let output = String::from_utf8(session.render(&session.regenerate().unwrap())).unwrap();

        assert!(output.starts_with(input));
        assert!(output.contains("\n[HardSingle]\n{\n  0 = N 0 0\n  384 = N 2 0\n}\n"));
        assert!(output.contains("\n[EasySingle]\n{\n  0 = N 0 0\n}\n"));
    }

    #[test]
    fn test_text_output_reparses() {
        let session = Session::from_bytes(
            "song.chart",
            ChartFormat::Text,
            sample_chart().as_bytes(),
            RuleSet::default(),
        )
        .unwrap();
        let output = session.render(&session.regenerate().unwrap());

        let chart = ChartText::from_bytes(&output).unwrap();
        let reparsed =
            Session::from_bytes("out.chart", ChartFormat::Text, &output, RuleSet::default())
                .unwrap();
        let guitar = &reparsed.instruments()[&Instrument::Guitar];

        assert_eq!(
            chart
                .sections()
                .iter()
                .filter(|s| s.name == "HardSingle")
                .count(),
            1
        );
        assert!(guitar.tracks[&Difficulty::Easy].iter().all(|n| n.lane <= 2));
        for difficulty in Difficulty::DERIVED {
            assert!(
                guitar.tracks[&difficulty].iter().any(|n| n.tick == 960),
                "{} lost the boost tick",
                difficulty
            );
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("song.txt");
        fs::write(&source, "[ExpertSingle]\n{\n}\n").unwrap();

        let err = Session::open(&source, RuleSet::default()).err().unwrap();

        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_custom_rules_change_reduction() {
        let rules = RuleSet::parse(
            r#"{"tiers": {"easy": {"spacing_multiplier": 1.0, "max_lane": 4, "max_chord": 2}}}"#,
        )
        .unwrap();
        let session =
            Session::from_bytes("song.chart", ChartFormat::Text, sample_chart().as_bytes(), rules)
                .unwrap();

        let regeneration = session.regenerate().unwrap();
        let easy = &regeneration.instruments[&Instrument::Guitar].tracks[&Difficulty::Easy];

        assert_eq!(easy.len(), 12);
    }
}
