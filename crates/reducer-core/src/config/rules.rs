use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::chart::{Difficulty, Instrument};
use crate::error::{Error, Result};

/// Naming for one instrument in both formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRule {
    pub instrument: Instrument,
    /// Canonical binary track name, matched as an upper-case substring.
    pub track_name: String,
    /// Text section suffix, e.g. `Single` in `[ExpertSingle]`.
    pub section_code: String,
}

impl InstrumentRule {
    fn new(instrument: Instrument, track_name: &str, section_code: &str) -> Self {
        Self {
            instrument,
            track_name: track_name.to_string(),
            section_code: section_code.to_string(),
        }
    }
}

/// Reduction limits for one derived tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    /// Multiplier applied to the median Expert gap to get the minimum accepted gap.
    pub spacing_multiplier: f64,
    pub max_lane: u8,
    pub max_chord: usize,
}

impl TierRule {
    pub const fn new(spacing_multiplier: f64, max_lane: u8, max_chord: usize) -> Self {
        Self {
            spacing_multiplier,
            max_lane,
            max_chord,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierRules {
    pub hard: TierRule,
    pub medium: TierRule,
    pub easy: TierRule,
}

impl Default for TierRules {
    fn default() -> Self {
        Self {
            hard: TierRule::new(1.01, 4, 2),
            medium: TierRule::new(2.00, 3, 1),
            easy: TierRule::new(3.33, 2, 1),
        }
    }
}

impl TierRules {
    pub fn get(&self, difficulty: Difficulty) -> Option<&TierRule> {
        match difficulty {
            Difficulty::Hard => Some(&self.hard),
            Difficulty::Medium => Some(&self.medium),
            Difficulty::Easy => Some(&self.easy),
            Difficulty::Expert => None,
        }
    }
}

/// First pitch of each difficulty's lane bucket in the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchBases {
    pub easy: u8,
    pub medium: u8,
    pub hard: u8,
    pub expert: u8,
}

impl Default for PitchBases {
    fn default() -> Self {
        Self {
            easy: 60,
            medium: 72,
            hard: 84,
            expert: 96,
        }
    }
}

impl PitchBases {
    pub fn get(&self, difficulty: Difficulty) -> u8 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Expert => self.expert,
        }
    }
}

/// Every lookup table used by the classifier, the reduction engine and the
/// synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub instruments: Vec<InstrumentRule>,
    pub pitch_bases: PitchBases,
    pub lanes_per_bucket: u8,
    pub tiers: TierRules,
    /// Special-event pitch marking a boost phrase in binary charts.
    pub midi_boost_code: u8,
    /// `S` event code marking a boost phrase in text charts.
    pub text_boost_code: u32,
    /// Duration used for notes closed without a usable length.
    pub fallback_duration: u32,
    /// Time division reported when a binary header cannot be read.
    pub default_division: u16,
    pub note_velocity: u8,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            instruments: vec![
                InstrumentRule::new(Instrument::Guitar, "PART GUITAR", "Single"),
                InstrumentRule::new(Instrument::Bass, "PART BASS", "DoubleBass"),
                InstrumentRule::new(Instrument::Drums, "PART DRUMS", "Drums"),
                InstrumentRule::new(Instrument::Keys, "PART KEYS", "Keys"),
            ],
            pitch_bases: PitchBases::default(),
            lanes_per_bucket: 5,
            tiers: TierRules::default(),
            midi_boost_code: 116,
            text_boost_code: 2,
            fallback_duration: 10,
            default_division: 192,
            note_velocity: 96,
        }
    }
}

impl RuleSet {
    /// Load a rule set from a JSON file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a rule set from JSON content.
    pub fn parse(content: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            return Err(Error::InvalidRules("no instruments configured".into()));
        }
        for (i, rule) in self.instruments.iter().enumerate() {
            if rule.track_name.trim().is_empty() || rule.section_code.trim().is_empty() {
                return Err(Error::InvalidRules(format!(
                    "{} has an empty track name or section code",
                    rule.instrument
                )));
            }
            if self.instruments[..i]
                .iter()
                .any(|other| other.instrument == rule.instrument)
            {
                return Err(Error::InvalidRules(format!(
                    "{} is configured twice",
                    rule.instrument
                )));
            }
        }

        if self.lanes_per_bucket == 0 {
            return Err(Error::InvalidRules("lanes_per_bucket must be positive".into()));
        }

        let mut bases: Vec<u8> = Difficulty::iter()
            .map(|d| self.pitch_bases.get(d))
            .collect();
        bases.sort_unstable();
        if bases
            .windows(2)
            .any(|pair| pair[1] - pair[0] < self.lanes_per_bucket)
        {
            return Err(Error::InvalidRules("pitch buckets overlap".into()));
        }
        if let Some(&top) = bases.last()
            && u16::from(top) + u16::from(self.lanes_per_bucket) > 128
        {
            return Err(Error::InvalidRules(
                "highest pitch bucket exceeds pitch 127".into(),
            ));
        }

        for difficulty in Difficulty::DERIVED {
            if let Some(tier) = self.tiers.get(difficulty) {
                if !tier.spacing_multiplier.is_finite() || tier.spacing_multiplier <= 0.0 {
                    return Err(Error::InvalidRules(format!(
                        "{} spacing multiplier must be a positive number",
                        difficulty
                    )));
                }
                if tier.max_chord == 0 {
                    return Err(Error::InvalidRules(format!(
                        "{} chord cap must be at least 1",
                        difficulty
                    )));
                }
                if tier.max_lane >= self.lanes_per_bucket {
                    return Err(Error::InvalidRules(format!(
                        "{} max lane {} is outside the {}-lane bucket",
                        difficulty, tier.max_lane, self.lanes_per_bucket
                    )));
                }
            }
        }

        if self.midi_boost_code > 127 {
            return Err(Error::InvalidRules("midi_boost_code exceeds 127".into()));
        }
        if self.note_velocity == 0 || self.note_velocity > 127 {
            return Err(Error::InvalidRules(
                "note_velocity must be within 1..=127".into(),
            ));
        }
        if self.fallback_duration == 0 {
            return Err(Error::InvalidRules("fallback_duration must be positive".into()));
        }
        Ok(())
    }

    pub fn instrument_rule(&self, instrument: Instrument) -> Option<&InstrumentRule> {
        self.instruments.iter().find(|r| r.instrument == instrument)
    }

    pub fn track_name(&self, instrument: Instrument) -> Option<&str> {
        self.instrument_rule(instrument)
            .map(|r| r.track_name.as_str())
    }

    /// Match a declared track name against the naming table.
    ///
    /// Table order decides when several canonical names are substrings.
    pub fn instrument_for_track(&self, declared: &str) -> Option<Instrument> {
        let upper = declared.to_uppercase();
        self.instruments
            .iter()
            .find(|r| upper.contains(&r.track_name.to_uppercase()))
            .map(|r| r.instrument)
    }

    pub fn section_name(&self, difficulty: Difficulty, instrument: Instrument) -> Option<String> {
        self.instrument_rule(instrument)
            .map(|r| format!("{}{}", difficulty.name(), r.section_code))
    }

    /// Resolve a text section name like `HardDoubleBass`.
    pub fn parse_section_name(&self, name: &str) -> Option<(Difficulty, Instrument)> {
        Difficulty::iter().find_map(|difficulty| {
            let code = name.strip_prefix(difficulty.name())?;
            self.instruments
                .iter()
                .find(|r| r.section_code == code)
                .map(|r| (difficulty, r.instrument))
        })
    }

    /// Difficulty bucket and lane for a binary note pitch.
    pub fn bucket(&self, pitch: u8) -> Option<(Difficulty, u8)> {
        Difficulty::iter().find_map(|difficulty| {
            let base = self.pitch_bases.get(difficulty);
            let lane = pitch.checked_sub(base)?;
            (lane < self.lanes_per_bucket).then_some((difficulty, lane))
        })
    }

    /// Binary pitch for a lane of the given difficulty.
    pub fn pitch_for(&self, difficulty: Difficulty, lane: u8) -> Option<u8> {
        if lane >= self.lanes_per_bucket {
            return None;
        }
        self.pitch_bases
            .get(difficulty)
            .checked_add(lane)
            .filter(|&p| p <= 127)
    }

    pub fn tier(&self, difficulty: Difficulty) -> Option<&TierRule> {
        self.tiers.get(difficulty)
    }
}
