// Sequence - Ordered list of note instances played in insertion order
// The sequence loops from its last note back to the first

use rand::Rng;
use rand::seq::SliceRandom;

use crate::sequencer::hand_pattern::{HandPattern, random_pattern};
use crate::sequencer::note::{NoteError, NoteId, NoteInstance, NoteKind};

/// Subdivision budget of a random fill
pub const DEFAULT_FILL_TARGET: usize = 32;
/// Safety bound on the notes a single random fill may generate
pub const DEFAULT_FILL_MAX_INSTANCES: usize = 50;

/// Outcome of [`Sequence::auto_fill`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillSummary {
    /// Notes appended
    pub notes_added: usize,
    /// Subdivisions those notes occupy
    pub subdivisions_added: usize,
}

/// An ordered practice sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    notes: Vec<NoteInstance>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all notes in playback order
    pub fn notes(&self) -> &[NoteInstance] {
        &self.notes
    }

    pub fn get(&self, index: usize) -> Option<&NoteInstance> {
        self.notes.get(index)
    }

    /// Get a note by ID
    pub fn get_note(&self, note_id: NoteId) -> Option<&NoteInstance> {
        self.notes.iter().find(|n| n.id() == note_id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Subdivision slots of one full traversal
    pub fn total_subdivisions(&self) -> usize {
        self.notes.iter().map(|n| n.subdivisions()).sum()
    }

    /// Append a new note built from `kind` and `pattern`
    pub fn append(&mut self, kind: NoteKind, pattern: HandPattern) -> Result<NoteId, NoteError> {
        let note = NoteInstance::new(kind, pattern)?;
        Ok(self.push(note))
    }

    /// Append an already validated note
    pub fn push(&mut self, note: NoteInstance) -> NoteId {
        let id = note.id();
        self.notes.push(note);
        id
    }

    /// Remove a note by ID
    pub fn remove(&mut self, note_id: NoteId) -> Option<NoteInstance> {
        let index = self.notes.iter().position(|n| n.id() == note_id)?;
        Some(self.notes.remove(index))
    }

    /// Remove every note
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Append random notes until `target_subdivisions` more slots are filled
    ///
    /// Each note is drawn uniformly from the kinds of `pool` that fit the
    /// remaining budget, falling back to a quarter note when none fit, and gets
    /// a random hands-only pattern. Stops early after `max_instances` notes.
    pub fn auto_fill<R: Rng + ?Sized>(
        &mut self,
        pool: &[NoteKind],
        target_subdivisions: usize,
        max_instances: usize,
        rng: &mut R,
    ) -> Result<FillSummary, NoteError> {
        let mut summary = FillSummary::default();

        while summary.subdivisions_added < target_subdivisions
            && summary.notes_added < max_instances
        {
            let remaining = target_subdivisions - summary.subdivisions_added;
            let fitting: Vec<NoteKind> = pool
                .iter()
                .copied()
                .filter(|kind| kind.subdivisions() <= remaining)
                .collect();

            let kind = fitting.choose(rng).copied().unwrap_or(NoteKind::Quarter);
            let pattern = random_pattern(kind, rng);
            self.append(kind, pattern)?;

            summary.notes_added += 1;
            summary.subdivisions_added += kind.subdivisions();
        }

        Ok(summary)
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
    fn test_append_keeps_insertion_order() {
        let mut sequence = Sequence::new();
        sequence.append(NoteKind::Sixteenth, p("R-L-R-R")).unwrap();
        sequence.append(NoteKind::Quarter, p("L")).unwrap();
        sequence.append(NoteKind::Eighth, p("R-L")).unwrap();

        let kinds: Vec<NoteKind> = sequence.notes().iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![NoteKind::Sixteenth, NoteKind::Quarter, NoteKind::Eighth]
        );
        assert_eq!(sequence.total_subdivisions(), 7);
    }

    #[test]
    fn test_append_rejects_invalid_note() {
        let mut sequence = Sequence::new();
        assert!(sequence.append(NoteKind::Eighth, p("R")).is_err());
        assert!(sequence.is_empty());
    }

    #[test]
    fn test_remove_note() {
        let mut sequence = Sequence::new();
        let first = sequence.append(NoteKind::Quarter, p("R")).unwrap();
        let second = sequence.append(NoteKind::Quarter, p("L")).unwrap();

        let removed = sequence.remove(first).unwrap();
        assert_eq!(removed.id(), first);
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence.notes()[0].id(), second);

        // Absent ID is a no-op
        assert!(sequence.remove(first).is_none());
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut sequence = Sequence::new();
        sequence.append(NoteKind::Quarter, p("R")).unwrap();
        sequence.clear();
        assert!(sequence.is_empty());
        assert_eq!(sequence.total_subdivisions(), 0);
    }

    #[test]
    fn test_auto_fill_hits_target_exactly() {
        let pool = NoteKind::SOUNDING;
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sequence = Sequence::new();
            let summary = sequence
                .auto_fill(&pool, DEFAULT_FILL_TARGET, DEFAULT_FILL_MAX_INSTANCES, &mut rng)
                .unwrap();

            assert_eq!(summary.subdivisions_added, 32, "seed {seed}");
            assert_eq!(sequence.total_subdivisions(), 32);
            assert!(summary.notes_added <= DEFAULT_FILL_MAX_INSTANCES);
            assert!(sequence.notes().iter().all(|n| !n.pattern().contains_kick()));
        }
    }

    #[test]
    fn test_auto_fill_falls_back_to_quarter() {
        // Three triplets leave one slot that only a quarter can fill
        let mut rng = StdRng::seed_from_u64(3);
        let mut sequence = Sequence::new();
        let summary = sequence
            .auto_fill(&[NoteKind::Triplet], 10, 50, &mut rng)
            .unwrap();

        assert_eq!(summary.subdivisions_added, 10);
        assert_eq!(summary.notes_added, 4);
        assert_eq!(sequence.notes()[3].kind(), NoteKind::Quarter);
    }

    #[test]
    fn test_auto_fill_respects_instance_bound() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sequence = Sequence::new();
        let summary = sequence
            .auto_fill(&[NoteKind::Quarter], 200, 50, &mut rng)
            .unwrap();

        assert_eq!(summary.notes_added, 50);
        assert_eq!(summary.subdivisions_added, 50);
        assert_eq!(sequence.len(), 50);
    }

    #[test]
    fn test_auto_fill_appends() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sequence = Sequence::new();
        let existing = sequence.append(NoteKind::Sixteenth, p("R-L-R-L")).unwrap();

        sequence
            .auto_fill(&NoteKind::SOUNDING, 32, 50, &mut rng)
            .unwrap();

        assert_eq!(sequence.notes()[0].id(), existing);
        assert_eq!(sequence.total_subdivisions(), 36);
    }

    #[test]
    fn test_auto_fill_with_rests() {
        let mut pool = NoteKind::SOUNDING.to_vec();
        pool.push(NoteKind::Rest);

        let mut rng = StdRng::seed_from_u64(9);
        let mut sequence = Sequence::new();
        let summary = sequence.auto_fill(&pool, 32, 50, &mut rng).unwrap();

        assert_eq!(summary.subdivisions_added, 32);
        for note in sequence.notes().iter().filter(|n| n.is_rest()) {
            assert!(note.pattern().is_empty());
        }
    }

    #[test]
    fn test_auto_fill_empty_pool_uses_quarters() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sequence = Sequence::new();
        let summary = sequence.auto_fill(&[], 4, 50, &mut rng).unwrap();

        assert_eq!(summary.notes_added, 4);
        assert!(sequence.notes().iter().all(|n| n.kind() == NoteKind::Quarter));
    }
}
