//! Fixed 36-week placement lattice.
//!
//! Each slot holds up to [`MAX_SUBJECTS_PER_WEEK`] occupying subjects in a
//! fixed-capacity array, plus the paces placed there. Subjects are
//! addressed by their index in the generator's subject table; since every
//! category has exactly one subject, a subject index doubles as a
//! category key.

use crate::models::{
    GeneratedPace, NormalizedSubject, PairingRules, WeekPosition, TOTAL_WEEKS,
};

/// Most distinct categories that may share one week.
pub const MAX_SUBJECTS_PER_WEEK: usize = 3;

/// A pace placed in the lattice: subject index + index into its paces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlacedPace {
    pub subject: usize,
    pub pace: usize,
}

/// Symmetric subject-by-subject exclusion matrix.
#[derive(Debug, Clone)]
pub(crate) struct Exclusions {
    n: usize,
    cells: Vec<bool>,
}

impl Exclusions {
    pub fn build(subjects: &[NormalizedSubject], rules: &PairingRules) -> Self {
        let n = subjects.len();
        let mut cells = vec![false; n * n];
        for (i, a) in subjects.iter().enumerate() {
            for (j, b) in subjects.iter().enumerate() {
                if i != j && rules.conflicts(&a.category_id, &b.category_id) {
                    cells[i * n + j] = true;
                }
            }
        }
        Self { n, cells }
    }

    #[inline]
    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.cells[a * self.n + b]
    }
}

/// One week of the lattice.
#[derive(Debug, Clone)]
pub(crate) struct WeekSlot {
    index: usize,
    occupants: [Option<usize>; MAX_SUBJECTS_PER_WEEK],
    paces: Vec<PlacedPace>,
}

impl WeekSlot {
    fn new(index: usize) -> Self {
        Self {
            index,
            occupants: [None; MAX_SUBJECTS_PER_WEEK],
            paces: Vec::with_capacity(MAX_SUBJECTS_PER_WEEK),
        }
    }

    pub fn occupants(&self) -> impl Iterator<Item = usize> + '_ {
        self.occupants.iter().flatten().copied()
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants.iter().filter(|o| o.is_some()).count()
    }

    pub fn contains(&self, subject: usize) -> bool {
        self.occupants.contains(&Some(subject))
    }

    pub fn paces(&self) -> &[PlacedPace] {
        &self.paces
    }

    pub fn load(&self) -> usize {
        self.paces.len()
    }
}

/// The school-year lattice.
#[derive(Debug, Clone)]
pub(crate) struct WeekLattice {
    slots: [WeekSlot; TOTAL_WEEKS],
}

impl WeekLattice {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(WeekSlot::new),
        }
    }

    pub fn slot(&self, index: usize) -> &WeekSlot {
        &self.slots[index]
    }

    #[cfg(test)]
    pub fn slots(&self) -> &[WeekSlot] {
        &self.slots
    }

    /// Capacity, category exclusivity and pairing conflicts.
    pub fn can_place(&self, index: usize, subject: usize, exclusions: &Exclusions) -> bool {
        self.can_place_relaxed(index, subject)
            && !self.slots[index]
                .occupants()
                .any(|o| exclusions.conflicts(subject, o))
    }

    /// Capacity and category exclusivity only.
    pub fn can_place_relaxed(&self, index: usize, subject: usize) -> bool {
        let slot = &self.slots[index];
        slot.occupant_count() < MAX_SUBJECTS_PER_WEEK && !slot.contains(subject)
    }

    /// Places a pace. Callers check capacity first.
    pub fn place(&mut self, index: usize, placed: PlacedPace) {
        let slot = &mut self.slots[index];
        if slot.paces.contains(&placed) {
            return;
        }
        if !slot.contains(placed.subject) {
            let free = slot.occupants.iter_mut().find(|o| o.is_none());
            debug_assert!(free.is_some(), "week {index} is full");
            if let Some(cell) = free {
                *cell = Some(placed.subject);
            }
        }
        slot.paces.push(placed);
    }

    /// Removes a subject's pace from a slot.
    pub fn remove(&mut self, index: usize, subject: usize) -> Option<PlacedPace> {
        let slot = &mut self.slots[index];
        let at = slot.paces.iter().position(|p| p.subject == subject)?;
        let removed = slot.paces.remove(at);
        for cell in slot.occupants.iter_mut() {
            if *cell == Some(subject) {
                *cell = None;
            }
        }
        Some(removed)
    }

    /// `(slot index, pace index)` of every placed pace of a subject.
    pub fn placements_of(&self, subject: usize) -> Vec<(usize, usize)> {
        self.slots
            .iter()
            .flat_map(|s| {
                s.paces
                    .iter()
                    .filter(move |p| p.subject == subject)
                    .map(move |p| (s.index, p.pace))
            })
            .collect()
    }

    /// Total placed paces.
    pub fn pace_count(&self) -> usize {
        self.slots.iter().map(WeekSlot::load).sum()
    }

    /// Flattens the lattice into generated paces, in week order.
    pub fn to_generated(&self, subjects: &[NormalizedSubject]) -> Vec<GeneratedPace> {
        let mut out = Vec::with_capacity(self.pace_count());
        for slot in &self.slots {
            let Some(position) = WeekPosition::from_index(slot.index) else {
                continue;
            };
            let mut paces = slot.paces.clone();
            paces.sort_by_key(|p| p.subject);
            for p in paces {
                let subject = &subjects[p.subject];
                out.push(GeneratedPace::new(
                    subject.category_id.clone(),
                    subject.subject_id.clone(),
                    subject.paces[p.pace].code.clone(),
                    position,
                ));
            }
        }
        out
    }
}
