//! The live candidate sets for each slot. Domains only ever shrink while solving; every removal
//! made after `forget_history` is recorded on a trail so that a search frame can rewind to the
//! exact state it started from.

use bit_set::BitSet;
use std::fmt::{Debug, Formatter};

use crate::grid_config::GridConfig;
use crate::word_list::WordList;
use crate::{SlotId, WordId, CHECK_INVARIANTS};

/// A single trailed removal.
#[derive(Debug, Clone, Copy)]
struct Removal {
    slot_id: SlotId,
    word_id: WordId,
}

/// A position in the trail to rewind to, as returned by `Domains::checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrailMark(usize);

/// Mapping from each slot to the set of words still possible for it.
#[derive(Clone)]
pub struct Domains {
    domains: Vec<BitSet>,
    trail: Vec<Removal>,
}

impl Debug for Domains {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domains")
            .field("sizes", &self.domains.iter().map(BitSet::len).collect::<Vec<_>>())
            .field("trail_length", &self.trail.len())
            .finish()
    }
}

impl Domains {
    /// Give every slot the whole word list as its domain.
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        let full: BitSet = (0..word_list.len()).collect();

        Domains {
            domains: (0..config.slot_count()).map(|_| full.clone()).collect(),
            trail: vec![],
        }
    }

    /// Remove every word whose length doesn't match its slot's length. These removals are
    /// permanent: they aren't recorded on the trail. Returns the number of words removed, so a
    /// second call returns 0.
    pub fn enforce_node_consistency(&mut self, config: &GridConfig, word_list: &WordList) -> usize {
        let mut removed = 0;

        for (slot_config, domain) in config.slot_configs.iter().zip(&mut self.domains) {
            let mismatched: Vec<WordId> = domain
                .iter()
                .filter(|&word_id| word_list.word(word_id).len() != slot_config.length)
                .collect();

            for word_id in mismatched {
                domain.remove(word_id);
                removed += 1;
            }
        }

        removed
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// Iterate over the words in a slot's domain in ascending id order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    /// Id of the first slot whose domain is empty, if any.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.domains.iter().position(BitSet::is_empty)
    }

    /// Remove a word from a slot's domain, recording the removal on the trail. Returns whether the
    /// word was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if self.domains[slot_id].remove(word_id) {
            self.trail.push(Removal { slot_id, word_id });
            true
        } else {
            false
        }
    }

    /// Narrow a slot's domain to just the given word, recording every other removal on the trail.
    /// Returns the number of words removed.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) -> usize {
        let others: Vec<WordId> =
            self.domains[slot_id].iter().filter(|&other| other != word_id).collect();

        for &other in &others {
            self.remove(slot_id, other);
        }

        others.len()
    }

    pub fn checkpoint(&self) -> TrailMark {
        TrailMark(self.trail.len())
    }

    /// Restore every word removed since the given checkpoint.
    pub fn rewind(&mut self, mark: TrailMark) {
        while self.trail.len() > mark.0 {
            if let Some(Removal { slot_id, word_id }) = self.trail.pop() {
                self.domains[slot_id].insert(word_id);
            }
        }
    }

    /// Make every removal so far permanent. Checkpoints taken before this call are invalidated.
    pub fn forget_history(&mut self) {
        self.trail.clear();
    }

    /// A by-value copy of every domain, as sorted word ids.
    pub fn snapshot(&self) -> Vec<Vec<WordId>> {
        self.domains.iter().map(|domain| domain.iter().collect()).collect()
    }

    /// Panic if any domain contains a word of the wrong length. Only runs with the
    /// `check_invariants` feature.
    pub fn check_lengths(&self, config: &GridConfig, word_list: &WordList) {
        if !CHECK_INVARIANTS {
            return;
        }

        for slot_config in &config.slot_configs {
            for word_id in self.iter(slot_config.id) {
                assert_eq!(
                    word_list.word(word_id).len(),
                    slot_config.length,
                    "slot {} has {:?} in its domain",
                    slot_config.id,
                    word_list.word(word_id).string,
                );
            }
        }
    }
}
