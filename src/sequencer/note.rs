// Note catalog and note instances
// A note instance is one entry of a practice sequence: a catalog kind plus its strikes

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::sequencer::hand_pattern::HandPattern;

/// Unique identifier for note instances
pub type NoteId = u64;

/// Global note ID generator (atomic for thread-safety)
static NEXT_NOTE_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique note ID
pub fn generate_note_id() -> NoteId {
    NEXT_NOTE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Errors raised while building a note instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("{kind} expects {expected} strikes, got {actual}")]
    PatternLength {
        kind: NoteKind,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid strike symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Kick strikes are disabled")]
    KickDisabled,
}

/// Catalog of note kinds
///
/// The catalog is fixed; instances reference a kind by tag so the catalog
/// constants stay the single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteKind {
    Quarter,
    Eighth,
    Triplet,
    Sixteenth,
    ThirtySecond,
    Rest,
}

impl NoteKind {
    /// Every kind in catalog order
    pub const ALL: [NoteKind; 6] = [
        NoteKind::Quarter,
        NoteKind::Eighth,
        NoteKind::Triplet,
        NoteKind::Sixteenth,
        NoteKind::ThirtySecond,
        NoteKind::Rest,
    ];

    /// Kinds that sound a strike
    pub const SOUNDING: [NoteKind; 5] = [
        NoteKind::Quarter,
        NoteKind::Eighth,
        NoteKind::Triplet,
        NoteKind::Sixteenth,
        NoteKind::ThirtySecond,
    ];

    /// Number of subdivisions (hits) per beat, always >= 1
    pub fn subdivisions(self) -> usize {
        match self {
            NoteKind::Quarter => 1,
            NoteKind::Eighth => 2,
            NoteKind::Triplet => 3,
            NoteKind::Sixteenth => 4,
            NoteKind::ThirtySecond => 8,
            NoteKind::Rest => 1,
        }
    }

    /// Rests occupy time and click but never strike
    pub fn is_rest(self) -> bool {
        matches!(self, NoteKind::Rest)
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            NoteKind::Quarter => "Quarter Note",
            NoteKind::Eighth => "Eighth Note",
            NoteKind::Triplet => "Triplet Note",
            NoteKind::Sixteenth => "Sixteenth Note",
            NoteKind::ThirtySecond => "Thirty-second Note",
            NoteKind::Rest => "Quarter Rest",
        }
    }

    /// Whether manual cycling may offer kick strikes for this kind.
    /// Excluded for the 8-subdivision kind to bound the enumeration.
    pub fn allows_kick(self) -> bool {
        !matches!(self, NoteKind::ThirtySecond | NoteKind::Rest)
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single percussive assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strike {
    Right,
    Left,
    Kick,
}

impl Strike {
    /// One-letter symbol used in pattern strings
    pub fn symbol(self) -> char {
        match self {
            Strike::Right => 'R',
            Strike::Left => 'L',
            Strike::Kick => 'K',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'R' => Some(Strike::Right),
            'L' => Some(Strike::Left),
            'K' => Some(Strike::Kick),
            _ => None,
        }
    }
}

impl fmt::Display for Strike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One entry of a practice sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInstance {
    id: NoteId,
    kind: NoteKind,
    pattern: HandPattern,
}

impl NoteInstance {
    /// Create a note with a freshly generated ID
    pub fn new(kind: NoteKind, pattern: HandPattern) -> Result<Self, NoteError> {
        Self::with_id(generate_note_id(), kind, pattern)
    }

    /// Create a note with an explicit ID
    ///
    /// The pattern must hold exactly one strike per subdivision. Rests accept
    /// an empty pattern as well.
    pub fn with_id(id: NoteId, kind: NoteKind, pattern: HandPattern) -> Result<Self, NoteError> {
        Self::check_pattern(kind, &pattern)?;
        Ok(Self { id, kind, pattern })
    }

    /// Whether `pattern` fits `kind`: one strike per subdivision, or empty for a rest
    pub fn check_pattern(kind: NoteKind, pattern: &HandPattern) -> Result<(), NoteError> {
        let expected = kind.subdivisions();
        let valid = pattern.len() == expected || (kind.is_rest() && pattern.is_empty());
        if !valid {
            return Err(NoteError::PatternLength {
                kind,
                expected,
                actual: pattern.len(),
            });
        }
        Ok(())
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn pattern(&self) -> &HandPattern {
        &self.pattern
    }

    /// Number of subdivision slots this note occupies
    pub fn subdivisions(&self) -> usize {
        self.kind.subdivisions()
    }

    pub fn is_rest(&self) -> bool {
        self.kind.is_rest()
    }

    /// Strike sounded at a subdivision, `None` for rests.
    /// Missing pattern entries fall back to Right.
    pub fn strike_at(&self, subdivision: usize) -> Option<Strike> {
        if self.is_rest() {
            return None;
        }
        Some(self.pattern.get(subdivision).unwrap_or(Strike::Right))
    }
}
