//! Grid filling by backtracking search. Before searching we make every domain node-consistent and
//! arc-consistent; during the search we pick the slot with the fewest remaining options (breaking
//! ties by the number of unfilled crossings), try its words in least-constraining order, and
//! re-establish arc consistency after each tentative choice so that dead ends show up early.

use instant::{Duration, Instant};
use log::{debug, trace};
use smallvec::SmallVec;
use std::cmp::Reverse;

use crate::arc_consistency::{establish_arc_consistency, incoming_arcs, ArcConsistencyFailure};
use crate::consistency::{is_complete, is_consistent, Assignment};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotArc};
use crate::word_list::WordList;
use crate::{SlotId, WordId, CHECK_INVARIANTS, MAX_SLOT_LENGTH};

/// Settings for a fill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOptions {
    /// Should we prune the other slots' domains (distinct words plus arc consistency) after each
    /// tentative choice? Without this, dead ends are only detected once a conflicting slot is
    /// actually assigned.
    pub maintain_arc_consistency: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        FillOptions { maintain_arc_consistency: true }
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub revisions: u64,
    pub eliminations: u64,
    pub duration: Duration,
}

/// The two normal outcomes of a fill attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    Solved(Assignment),
    NoSolution,
}

/// A struct representing the results of a fill operation.
#[derive(Debug, Clone)]
pub struct FillResult {
    pub outcome: FillOutcome,
    pub statistics: Statistics,
}

impl FillResult {
    pub fn assignment(&self) -> Option<&Assignment> {
        match &self.outcome {
            FillOutcome::Solved(assignment) => Some(assignment),
            FillOutcome::NoSolution => None,
        }
    }
}

/// The live state of a fill attempt. The solver owns the domains and the partial assignment; each
/// search frame undoes its own changes to both before returning control to its parent.
pub struct Solver<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    options: FillOptions,
    domains: Domains,
    assignment: Assignment,
    statistics: Statistics,
}

impl<'a> Solver<'a> {
    pub fn new(
        config: &'a GridConfig,
        word_list: &'a WordList,
        options: FillOptions,
    ) -> Solver<'a> {
        Solver {
            config,
            word_list,
            options,
            domains: Domains::new(config, word_list),
            assignment: Assignment::new(config.slot_count()),
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Enforce node and arc consistency, and then search for a complete assignment.
    pub fn solve(mut self) -> FillResult {
        let start = Instant::now();

        let removed = self.domains.enforce_node_consistency(self.config, self.word_list);
        debug!("Node consistency removed {} options", removed);

        let outcome = if let Some(slot_id) = self.domains.first_empty_slot() {
            debug!(
                "Slot {} has no words of length {}",
                slot_id, self.config.slot_configs[slot_id].length,
            );
            FillOutcome::NoSolution
        } else if let Err(failure) = self.propagate(None) {
            debug!("Initial arc consistency emptied slot {}", failure.emptied_slot_id);
            FillOutcome::NoSolution
        } else {
            // Nothing before the search needs to be undone.
            self.domains.forget_history();
            self.domains.check_lengths(self.config, self.word_list);

            if self.backtrack() {
                FillOutcome::Solved(self.assignment.clone())
            } else {
                FillOutcome::NoSolution
            }
        };

        self.statistics.duration = start.elapsed();
        debug!("Fill finished: {:?}, {:?}", outcome, self.statistics);

        FillResult { outcome, statistics: self.statistics }
    }

    /// Run arc consistency and fold its counts into our statistics.
    fn propagate(&mut self, initial_arcs: Option<&[SlotArc]>) -> Result<(), ArcConsistencyFailure> {
        let result =
            establish_arc_consistency(self.config, self.word_list, &mut self.domains, initial_arcs);
        let (revisions, eliminations) = match &result {
            Ok(success) => (success.revisions, success.eliminations),
            Err(failure) => (failure.revisions, failure.eliminations),
        };
        self.statistics.revisions += revisions as u64;
        self.statistics.eliminations += eliminations as u64;

        result.map(|_| ())
    }

    /// How many unassigned slots cross this one?
    fn unassigned_degree(&self, slot_id: SlotId) -> usize {
        self.config
            .neighbors(slot_id)
            .iter()
            .filter(|&&neighbor_id| !self.assignment.is_assigned(neighbor_id))
            .count()
    }

    /// Choose the unassigned slot with the fewest remaining options. Ties go to the slot with the
    /// most unassigned crossings, then to the lowest slot id.
    pub fn select_unassigned_slot(&self) -> Option<SlotId> {
        (0..self.config.slot_count())
            .filter(|&slot_id| !self.assignment.is_assigned(slot_id))
            .min_by_key(|&slot_id| {
                (self.domains.len(slot_id), Reverse(self.unassigned_degree(slot_id)), slot_id)
            })
    }

    /// Return the words in the slot's domain, ordered by how many unassigned crossing slots would
    /// lose at least one option if the word were chosen (fewest first, then by word id). A crossing
    /// slot loses an option if some of its words have a different letter in the shared cell, or if
    /// the chosen word itself is one of its options.
    pub fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        let slot_config = &self.config.slot_configs[slot_id];

        // For each unassigned crossing: its id, which cell of ours it crosses, how many options it
        // has, and how many of those put each glyph in the shared cell.
        let crossing_counts: SmallVec<[(SlotId, usize, usize, Vec<usize>); MAX_SLOT_LENGTH]> =
            slot_config
                .neighbors
                .iter()
                .filter(|&&neighbor_id| !self.assignment.is_assigned(neighbor_id))
                .filter_map(|&neighbor_id| {
                    let overlap = self.config.overlap(slot_id, neighbor_id)?;
                    let mut glyph_counts = vec![0; self.word_list.glyphs.len()];
                    for word_id in self.domains.iter(neighbor_id) {
                        glyph_counts[self.word_list.word(word_id).glyphs[overlap.other_cell]] += 1;
                    }
                    Some((neighbor_id, overlap.cell, self.domains.len(neighbor_id), glyph_counts))
                })
                .collect();

        let mut word_ids: Vec<WordId> = self.domains.iter(slot_id).collect();
        word_ids.sort_by_cached_key(|&word_id| {
            let word = self.word_list.word(word_id);
            let constrained_count = crossing_counts
                .iter()
                .filter(|&&(neighbor_id, cell, option_count, ref glyph_counts)| {
                    self.domains.contains(neighbor_id, word_id)
                        || glyph_counts[word.glyphs[cell]] < option_count
                })
                .count();
            (constrained_count, word_id)
        });

        word_ids
    }

    /// Tentatively choose a word for a slot: record the assignment, narrow the slot's domain to
    /// the word, and (if enabled) prune the rest of the grid. Returns false if the choice is
    /// inconsistent or wipes out some domain. The caller is responsible for undoing the changes.
    fn try_word(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.assignment.insert(slot_id, word_id);
        self.domains.restrict_to(slot_id, word_id);

        if !is_consistent(self.config, self.word_list, &self.assignment) {
            return false;
        }
        if !self.options.maintain_arc_consistency {
            return true;
        }

        // The word can't be used anywhere else, so take it out of every other unassigned slot's
        // domain before propagating.
        let mut changed_slot_ids: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = SmallVec::new();
        changed_slot_ids.push(slot_id);
        for other_slot_id in 0..self.config.slot_count() {
            if other_slot_id == slot_id || self.assignment.is_assigned(other_slot_id) {
                continue;
            }
            if self.domains.remove(other_slot_id, word_id) {
                if self.domains.is_empty(other_slot_id) {
                    return false;
                }
                changed_slot_ids.push(other_slot_id);
            }
        }

        let arcs = incoming_arcs(self.config, &changed_slot_ids);
        self.propagate(Some(&arcs)).is_ok()
    }

    /// Recursively extend the current assignment. Returns true once it's complete, leaving the
    /// solution in `self.assignment`; otherwise returns false with the assignment and domains
    /// exactly as they were on entry.
    fn backtrack(&mut self) -> bool {
        if is_complete(self.config, &self.assignment) {
            return true;
        }
        self.statistics.states += 1;

        let slot_id = match self.select_unassigned_slot() {
            Some(slot_id) => slot_id,
            None => return true,
        };

        for word_id in self.order_domain_values(slot_id) {
            trace!("Trying {:?} in slot {}", self.word_list.word(word_id).string, slot_id);

            let mark = self.domains.checkpoint();
            let before = if CHECK_INVARIANTS { Some(self.domains.snapshot()) } else { None };

            if self.try_word(slot_id, word_id) && self.backtrack() {
                return true;
            }

            self.assignment.remove(slot_id);
            self.domains.rewind(mark);
            self.statistics.backtracks += 1;

            if let Some(before) = before {
                assert_eq!(self.domains.snapshot(), before, "backtrack didn't restore domains");
            }
        }

        trace!("Exhausted slot {}", slot_id);
        false
    }
}

/// Search for a valid fill for the given grid and word list.
pub fn find_fill(config: &GridConfig, word_list: &WordList, options: &FillOptions) -> FillResult {
    Solver::new(config, word_list, *options).solve()
}
