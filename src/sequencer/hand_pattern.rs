// Hand patterns - Strike orderings assigned to a note's subdivisions
// Enumerates every ordering for manual cycling and samples random ones for auto-fill

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::sequencer::note::{NoteError, NoteInstance, NoteKind, Strike};

const HANDS: [Strike; 2] = [Strike::Right, Strike::Left];
const HANDS_AND_KICK: [Strike; 3] = [Strike::Right, Strike::Left, Strike::Kick];

/// Ordered strikes, one per subdivision
///
/// Written as symbols joined by dashes, e.g. `R-L-K`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HandPattern(Vec<Strike>);

impl HandPattern {
    pub fn new(strikes: Vec<Strike>) -> Self {
        Self(strikes)
    }

    /// The empty pattern (rests)
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// The same strike on every subdivision
    pub fn uniform(strike: Strike, len: usize) -> Self {
        Self(vec![strike; len])
    }

    pub fn strikes(&self) -> &[Strike] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<Strike> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_kick(&self) -> bool {
        self.0.contains(&Strike::Kick)
    }
}

impl fmt::Display for HandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, strike) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{}", strike)?;
        }
        Ok(())
    }
}

impl FromStr for HandPattern {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::empty());
        }

        s.split('-')
            .map(|token| {
                let mut chars = token.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(symbol), None) => Strike::from_symbol(symbol)
                        .ok_or_else(|| NoteError::InvalidSymbol(token.to_string())),
                    _ => Err(NoteError::InvalidSymbol(token.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Every string of `len` strikes over `alphabet`, most significant subdivision first.
/// With the hand alphabet this is the natural binary count (R = 0, L = 1).
fn enumerate_over(alphabet: &[Strike], len: usize) -> Vec<HandPattern> {
    let base = alphabet.len();
    let total = base.pow(len as u32);

    (0..total)
        .map(|mut index| {
            let mut strikes = vec![Strike::Right; len];
            for slot in strikes.iter_mut().rev() {
                *slot = alphabet[index % base];
                index /= base;
            }
            HandPattern(strikes)
        })
        .collect()
}

fn kick_offered(kind: NoteKind, kick_enabled: bool) -> bool {
    kick_enabled && kind.allows_kick()
}

/// Fixed cycling order for a kind
///
/// Hands-only combinations come first, then (when kick is offered) every
/// combination containing at least one kick. Rests have a single empty pattern.
pub fn enumerate_patterns(kind: NoteKind, kick_enabled: bool) -> Vec<HandPattern> {
    if kind.is_rest() {
        return vec![HandPattern::empty()];
    }

    let len = kind.subdivisions();
    if !kick_offered(kind, kick_enabled) {
        return enumerate_over(&HANDS, len);
    }

    let (hands_only, with_kick): (Vec<_>, Vec<_>) = enumerate_over(&HANDS_AND_KICK, len)
        .into_iter()
        .partition(|pattern| !pattern.contains_kick());

    hands_only.into_iter().chain(with_kick).collect()
}

/// Size of the cycle returned by [`enumerate_patterns`]
pub fn pattern_count(kind: NoteKind, kick_enabled: bool) -> usize {
    if kind.is_rest() {
        return 1;
    }
    let base: usize = if kick_offered(kind, kick_enabled) { 3 } else { 2 };
    base.pow(kind.subdivisions() as u32)
}

/// Pattern following `current` in the cycling order, wrapping after the last.
/// Unknown patterns (e.g. a kick pattern after kick was disabled) restart at the first entry.
pub fn cycle_pattern(kind: NoteKind, current: &HandPattern, kick_enabled: bool) -> HandPattern {
    let mut patterns = enumerate_patterns(kind, kick_enabled);
    let next = patterns
        .iter()
        .position(|pattern| pattern == current)
        .map_or(0, |index| (index + 1) % patterns.len());

    patterns.swap_remove(next)
}

/// Uniformly random hands (never kick), one per subdivision
pub fn random_pattern<R: Rng + ?Sized>(kind: NoteKind, rng: &mut R) -> HandPattern {
    if kind.is_rest() {
        return HandPattern::empty();
    }

    (0..kind.subdivisions())
        .map(|_| if rng.gen_bool(0.5) { Strike::Left } else { Strike::Right })
        .collect::<Vec<_>>()
        .into()
}

impl From<Vec<Strike>> for HandPattern {
    fn from(strikes: Vec<Strike>) -> Self {
        Self(strikes)
    }
}

/// Current hand pattern per note kind, used when appending notes by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandPatternBook {
    patterns: [HandPattern; 6],
}

impl HandPatternBook {
    pub fn new() -> Self {
        Self {
            patterns: NoteKind::ALL.map(|kind| {
                if kind.is_rest() {
                    HandPattern::empty()
                } else {
                    HandPattern::uniform(Strike::Right, kind.subdivisions())
                }
            }),
        }
    }

    fn slot(kind: NoteKind) -> usize {
        kind as usize
    }

    pub fn current(&self, kind: NoteKind) -> &HandPattern {
        &self.patterns[Self::slot(kind)]
    }

    /// Advance the pattern for `kind`. Rests are left untouched.
    pub fn cycle(&mut self, kind: NoteKind, kick_enabled: bool) -> &HandPattern {
        let slot = Self::slot(kind);
        if !kind.is_rest() {
            self.patterns[slot] = cycle_pattern(kind, &self.patterns[slot], kick_enabled);
        }
        &self.patterns[slot]
    }

    /// Replace the pattern for `kind`
    pub fn set(&mut self, kind: NoteKind, pattern: HandPattern) -> Result<(), NoteError> {
        NoteInstance::check_pattern(kind, &pattern)?;
        self.patterns[Self::slot(kind)] = pattern;
        Ok(())
    }
}

impl Default for HandPatternBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn p(s: &str) -> HandPattern {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let pattern = p("R-L-K");
        assert_eq!(
            pattern.strikes(),
            &[Strike::Right, Strike::Left, Strike::Kick]
        );
        assert_eq!(pattern.to_string(), "R-L-K");
        assert_eq!(p("").to_string(), "");
        assert!("R-X".parse::<HandPattern>().is_err());
        assert!("RL".parse::<HandPattern>().is_err());
    }

    #[test]
    fn test_hand_only_order_is_binary_count() {
        let patterns = enumerate_patterns(NoteKind::Eighth, false);
        let names: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["R-R", "R-L", "L-R", "L-L"]);
    }

    #[test]
    fn test_thirty_second_never_offers_kick() {
        let patterns = enumerate_patterns(NoteKind::ThirtySecond, true);
        assert_eq!(patterns.len(), 256);
        assert!(patterns.iter().all(|p| !p.contains_kick()));
        assert_eq!(patterns[0].to_string(), "R-R-R-R-R-R-R-R");
        assert_eq!(patterns[1].to_string(), "R-R-R-R-R-R-R-L");
        assert_eq!(patterns[255].to_string(), "L-L-L-L-L-L-L-L");
    }

    #[test]
    fn test_kick_patterns_follow_hand_patterns() {
        let patterns = enumerate_patterns(NoteKind::Eighth, true);
        assert_eq!(patterns.len(), 9);

        let names: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            vec!["R-R", "R-L", "L-R", "L-L", "R-K", "L-K", "K-R", "K-L", "K-K"]
        );
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle_pattern(NoteKind::Quarter, &p("R"), false), p("L"));
        assert_eq!(cycle_pattern(NoteKind::Quarter, &p("L"), false), p("R"));
        assert_eq!(cycle_pattern(NoteKind::Quarter, &p("L"), true), p("K"));
        assert_eq!(cycle_pattern(NoteKind::Quarter, &p("K"), true), p("R"));
    }

    #[test]
    fn test_cycle_unknown_pattern_restarts() {
        // Kick pattern left over after kick was switched off
        assert_eq!(cycle_pattern(NoteKind::Eighth, &p("K-R"), false), p("R-R"));
        assert_eq!(cycle_pattern(NoteKind::Eighth, &p(""), false), p("R-R"));
    }

    #[test]
    fn test_cycle_returns_to_start_after_full_enumeration() {
        for kind in NoteKind::ALL {
            for kick in [false, true] {
                let start = enumerate_patterns(kind, kick)[0].clone();
                let n = pattern_count(kind, kick);
                assert_eq!(enumerate_patterns(kind, kick).len(), n);

                let mut current = start.clone();
                for step in 1..=n {
                    current = cycle_pattern(kind, &current, kick);
                    if step < n {
                        assert_ne!(current, start, "{kind} returned early at step {step}");
                    }
                }
                assert_eq!(current, start);
            }
        }
    }

    #[test]
    fn test_random_pattern_hands_only() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in NoteKind::ALL {
            for _ in 0..50 {
                let pattern = random_pattern(kind, &mut rng);
                if kind.is_rest() {
                    assert!(pattern.is_empty());
                } else {
                    assert_eq!(pattern.len(), kind.subdivisions());
                    assert!(!pattern.contains_kick());
                }
            }
        }
    }

    #[test]
    fn test_random_pattern_uses_both_hands() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut lefts = 0;
        let mut rights = 0;
        for _ in 0..200 {
            for strike in random_pattern(NoteKind::ThirtySecond, &mut rng).strikes() {
                match strike {
                    Strike::Left => lefts += 1,
                    Strike::Right => rights += 1,
                    Strike::Kick => unreachable!(),
                }
            }
        }
        // 1600 fair coin flips
        assert!(lefts > 600 && rights > 600);
    }

    #[test]
    fn test_pattern_book_defaults_and_cycle() {
        let mut book = HandPatternBook::new();
        assert_eq!(book.current(NoteKind::Quarter), &p("R"));
        assert_eq!(book.current(NoteKind::Sixteenth), &p("R-R-R-R"));
        assert!(book.current(NoteKind::Rest).is_empty());

        assert_eq!(book.cycle(NoteKind::Triplet, false), &p("R-R-L"));
        assert_eq!(book.current(NoteKind::Triplet), &p("R-R-L"));

        assert!(book.cycle(NoteKind::Rest, true).is_empty());
    }

    #[test]
    fn test_pattern_book_set_validates_length() {
        let mut book = HandPatternBook::new();
        assert!(book.set(NoteKind::Eighth, p("L-K")).is_ok());
        assert_eq!(book.current(NoteKind::Eighth), &p("L-K"));
        assert!(book.set(NoteKind::Eighth, p("L")).is_err());
    }

    #[test]
    fn test_pattern_book_rest_accepts_only_valid_patterns() {
        let mut book = HandPatternBook::new();
        assert!(book.set(NoteKind::Rest, p("R-L")).is_err());
        assert!(book.current(NoteKind::Rest).is_empty());

        assert!(book.set(NoteKind::Rest, p("L")).is_ok());
        assert!(book.set(NoteKind::Rest, HandPattern::empty()).is_ok());

        // Anything the book accepts must build a note
        assert!(NoteInstance::new(NoteKind::Rest, book.current(NoteKind::Rest).clone()).is_ok());
    }
}
