//! An implementation of the AC-3 algorithm for establishing and maintaining arc consistency. For
//! our purposes, the grid is arc-consistent when every word in every slot's domain has, for each
//! crossing slot, at least one word in that slot's domain with the same letter at the shared cell.

use bit_set::BitSet;
use std::collections::VecDeque;

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotArc};
use crate::word_list::WordList;
use crate::{SlotId, WordId};

/// Queue of arcs waiting to be revised. Enqueueing an arc that's already pending does nothing.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<SlotArc>,
    pending: BitSet,
    slot_count: usize,
}

impl ArcQueue {
    fn new(slot_count: usize) -> ArcQueue {
        ArcQueue {
            queue: VecDeque::new(),
            pending: BitSet::with_capacity(slot_count * slot_count),
            slot_count,
        }
    }

    fn key(&self, arc: SlotArc) -> usize {
        arc.slot_id * self.slot_count + arc.other_slot_id
    }

    fn enqueue(&mut self, arc: SlotArc) {
        let key = self.key(arc);
        if self.pending.insert(key) {
            self.queue.push_back(arc);
        }
    }

    fn pop_front(&mut self) -> Option<SlotArc> {
        let arc = self.queue.pop_front()?;
        let key = self.key(arc);
        self.pending.remove(key);
        Some(arc)
    }
}

/// Results from a successful call to `establish_arc_consistency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised.
    pub revisions: usize,

    /// How many words were removed from domains.
    pub eliminations: usize,
}

/// Result from a failed call to `establish_arc_consistency`, naming the slot whose domain was
/// wiped out. Removals made before the failure stay in place (and on the trail).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub emptied_slot_id: SlotId,
    pub revisions: usize,
    pub eliminations: usize,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make `slot_id` arc-consistent with `other_slot_id`, removing every word from the former's
/// domain that has no *other* word in the latter's domain with the same letter at their crossing.
/// A word can't support itself, since it can only be used once in the grid. Returns the number of
/// words removed; slots that don't cross are left alone.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    slot_id: SlotId,
    other_slot_id: SlotId,
) -> usize {
    let overlap = match config.overlap(slot_id, other_slot_id) {
        Some(overlap) => overlap,
        None => return 0,
    };

    // How many options put each glyph in the shared cell?
    let mut glyph_counts = vec![0; word_list.glyphs.len()];
    for word_id in domains.iter(other_slot_id) {
        glyph_counts[word_list.word(word_id).glyphs[overlap.other_cell]] += 1;
    }

    let unsupported: Vec<WordId> = domains
        .iter(slot_id)
        .filter(|&word_id| {
            let count = glyph_counts[word_list.word(word_id).glyphs[overlap.cell]];
            let self_support = usize::from(domains.contains(other_slot_id, word_id));
            count <= self_support
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(slot_id, word_id);
    }

    unsupported.len()
}

/// Revise arcs until no domain changes or some domain is wiped out. If `initial_arcs` is `None`,
/// we start from every arc in the grid; otherwise just from the given ones, which is enough when
/// the grid was arc-consistent before the domains of those arcs' `other_slot_id`s were narrowed.
pub fn establish_arc_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    initial_arcs: Option<&[SlotArc]>,
) -> ArcConsistencyResult {
    let mut queue = ArcQueue::new(config.slot_count());
    match initial_arcs {
        Some(arcs) => arcs.iter().for_each(|&arc| queue.enqueue(arc)),
        None => config.arcs().into_iter().for_each(|arc| queue.enqueue(arc)),
    }

    let mut revisions = 0;
    let mut eliminations = 0;

    while let Some(SlotArc { slot_id, other_slot_id }) = queue.pop_front() {
        revisions += 1;
        let removed = revise(config, word_list, domains, slot_id, other_slot_id);
        if removed == 0 {
            continue;
        }
        eliminations += removed;

        if domains.is_empty(slot_id) {
            return Err(ArcConsistencyFailure { emptied_slot_id: slot_id, revisions, eliminations });
        }

        // The smaller domain may have taken away the only support for words in the other slots
        // crossing this one.
        for &neighbor_id in config.neighbors(slot_id) {
            if neighbor_id != other_slot_id {
                queue.enqueue(SlotArc { slot_id: neighbor_id, other_slot_id: slot_id });
            }
        }
    }

    Ok(ArcConsistencySuccess { revisions, eliminations })
}

/// The arcs pointing into each of the given slots, i.e. the ones that need revising after those
/// slots' domains shrink.
pub fn incoming_arcs(config: &GridConfig, slot_ids: &[SlotId]) -> Vec<SlotArc> {
    slot_ids
        .iter()
        .flat_map(|&slot_id| {
            config
                .neighbors(slot_id)
                .iter()
                .map(move |&neighbor_id| SlotArc { slot_id: neighbor_id, other_slot_id: slot_id })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_config::build_slots;
    use crate::parse::parse_structure;

    fn setup(structure: &str, words: &[&str]) -> (GridConfig, WordList, Domains) {
        let config = build_slots(&parse_structure(structure)).unwrap();
        let word_list = WordList::new(words.iter().copied());
        let mut domains = Domains::new(&config, &word_list);
        domains.enforce_node_consistency(&config, &word_list);

        (config, word_list, domains)
    }

    fn domain_strings(word_list: &WordList, domains: &Domains, slot_id: SlotId) -> Vec<String> {
        domains.iter(slot_id).map(|id| word_list.word(id).string.clone()).collect()
    }

    const CROSS: &str = "
        #_#
        ___
        #_#
    ";

    #[test]
    fn test_revise_removes_unsupported_words() {
        let (config, word_list, mut domains) = setup(CROSS, &["cat", "dog", "bob", "hot"]);
        domains.restrict_to(1, word_list.find("dog").unwrap());

        // Only words with an "o" in the middle are supported by "dog", and "dog" itself can't
        // cross "dog".
        assert_eq!(revise(&config, &word_list, &mut domains, 0, 1), 2);
        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["bob", "hot"]);

        assert_eq!(revise(&config, &word_list, &mut domains, 0, 1), 0);
    }

    #[test]
    fn test_revise_ignores_slots_without_overlap() {
        let (config, word_list, mut domains) = setup(
            "
            ___
            ###
            ___
            ",
            &["cat", "dog"],
        );
        domains.restrict_to(1, word_list.find("dog").unwrap());

        assert_eq!(revise(&config, &word_list, &mut domains, 0, 1), 0);
        assert_eq!(domains.len(0), 2);
    }

    #[test]
    fn test_propagation_reaches_fixpoint() {
        // A 3x3 ring: slots 0 (top) and 1 (bottom) across, 2 (left) and 3 (right) down.
        let ring = "
            ___
            _#_
            ___
        ";
        let (config, word_list, mut domains) = setup(
            ring,
            &["abc", "ade", "aec", "axe", "bee", "cab", "cfg", "egg", "ehg", "xyz"],
        );

        let result = establish_arc_consistency(&config, &word_list, &mut domains, None);

        assert!(result.is_ok());
        assert_eq!(domains.first_empty_slot(), None);
        for SlotArc { slot_id, other_slot_id } in config.arcs() {
            let mut probe = domains.clone();
            assert_eq!(
                revise(&config, &word_list, &mut probe, slot_id, other_slot_id),
                0,
                "arc {} -> {} isn't consistent",
                slot_id,
                other_slot_id,
            );
        }
        // No word starts with "z", so nothing can cross the end of "xyz" in the top slot.
        assert!(!domains.contains(0, word_list.find("xyz").unwrap()));
    }

    #[test]
    fn test_propagation_fails_on_wipeout() {
        let (config, word_list, mut domains) = setup(CROSS, &["cat", "dog"]);
        domains.restrict_to(0, word_list.find("cat").unwrap());
        domains.restrict_to(1, word_list.find("dog").unwrap());

        let result = establish_arc_consistency(&config, &word_list, &mut domains, None);

        assert!(matches!(result, Err(ArcConsistencyFailure { .. })));
    }

    #[test]
    fn test_propagation_only_shrinks_domains() {
        let ring = "
            ___
            _#_
            ___
        ";
        let (config, word_list, mut domains) =
            setup(ring, &["abc", "cde", "aec", "efg", "xyz", "axe", "egg"]);
        let before = domains.snapshot();

        let _ = establish_arc_consistency(&config, &word_list, &mut domains, None);

        for (after, before) in domains.snapshot().iter().zip(&before) {
            assert!(after.iter().all(|word_id| before.contains(word_id)));
        }
    }

    #[test]
    fn test_propagation_terminates_within_candidate_bound() {
        let ring = "
            ___
            _#_
            ___
        ";
        let (config, word_list, mut domains) =
            setup(ring, &["abc", "cde", "aec", "efg", "xyz", "axe", "egg", "cab", "bee"]);
        let total_candidates: usize = (0..config.slot_count()).map(|id| domains.len(id)).sum();

        let result = establish_arc_consistency(&config, &word_list, &mut domains, None);
        let (revisions, eliminations) = match result {
            Ok(success) => (success.revisions, success.eliminations),
            Err(failure) => (failure.revisions, failure.eliminations),
        };

        // Every productive revision removes at least one candidate, and each removal re-queues at
        // most one arc per neighbor.
        assert!(eliminations <= total_candidates);
        let max_degree = 2;
        assert!(revisions <= config.arcs().len() + eliminations * max_degree);
    }

    #[test]
    fn test_propagation_from_initial_arcs() {
        let (config, word_list, mut domains) =
            setup(CROSS, &["cat", "car", "dog", "bob", "hot"]);
        domains.restrict_to(1, word_list.find("cat").unwrap());

        let arcs = incoming_arcs(&config, &[1]);
        assert_eq!(arcs, vec![SlotArc { slot_id: 0, other_slot_id: 1 }]);

        let result = establish_arc_consistency(&config, &word_list, &mut domains, Some(&arcs));

        assert_eq!(result.map(|success| success.eliminations), Ok(4));
        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["car"]);
    }

    #[test]
    fn test_word_doesnt_support_itself() {
        let (config, word_list, mut domains) = setup(CROSS, &["cat", "dog", "bob", "hot"]);
        domains.restrict_to(1, word_list.find("cat").unwrap());

        let arcs = incoming_arcs(&config, &[1]);
        let result = establish_arc_consistency(&config, &word_list, &mut domains, Some(&arcs));

        assert_eq!(
            result,
            Err(ArcConsistencyFailure { emptied_slot_id: 0, revisions: 1, eliminations: 4 }),
        );
        assert!(domains.is_empty(0));
    }

    #[test]
    fn test_single_word_cross_is_wiped_out() {
        let (config, word_list, mut domains) = setup(CROSS, &["cat"]);

        assert_eq!(revise(&config, &word_list, &mut domains, 0, 1), 1);
        assert!(domains.is_empty(0));
    }

    #[test]
    fn test_arc_queue_deduplicates() {
        let mut queue = ArcQueue::new(3);
        let arc = SlotArc { slot_id: 2, other_slot_id: 1 };

        queue.enqueue(arc);
        queue.enqueue(arc);
        assert_eq!(queue.pop_front(), Some(arc));
        assert_eq!(queue.pop_front(), None);

        queue.enqueue(arc);
        assert_eq!(queue.pop_front(), Some(arc));
    }
}
