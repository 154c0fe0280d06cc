use bit_set::BitSet;

use crate::grid_config::GridConfig;
use crate::word_list::WordList;
use crate::{SlotId, WordId};

/// A partial or complete mapping from slots to words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    word_ids_by_slot: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a grid with the given number of slots.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { word_ids_by_slot: vec![None; slot_count], assigned_count: 0 }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids_by_slot.get(slot_id).copied().flatten()
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    /// Assign a word to a slot, returning the word it replaces.
    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.word_ids_by_slot[slot_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.word_ids_by_slot[slot_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    /// Number of assigned slots.
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// Iterate over (slot, word) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.word_ids_by_slot
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    }
}

/// Does every assigned word fit its slot, appear only once, and agree with every assigned
/// neighbor at their shared cell?
pub fn is_consistent(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> bool {
    let mut seen_words = BitSet::with_capacity(word_list.len());

    for (slot_id, word_id) in assignment.iter() {
        let slot_config = match config.slot_configs.get(slot_id) {
            Some(slot_config) => slot_config,
            None => return false,
        };
        let word = word_list.word(word_id);

        if word.len() != slot_config.length || !seen_words.insert(word_id) {
            return false;
        }

        for &neighbor_id in &slot_config.neighbors {
            let neighbor_word_id = match assignment.get(neighbor_id) {
                Some(neighbor_word_id) => neighbor_word_id,
                None => continue,
            };
            let overlap = match config.overlap(slot_id, neighbor_id) {
                Some(overlap) => overlap,
                None => continue,
            };

            let neighbor_word = word_list.word(neighbor_word_id);
            if word.glyphs[overlap.cell] != neighbor_word.glyphs[overlap.other_cell] {
                return false;
            }
        }
    }

    true
}

/// Does the assignment give a word to every slot in the grid?
pub fn is_complete(config: &GridConfig, assignment: &Assignment) -> bool {
    (0..config.slot_count()).all(|slot_id| assignment.is_assigned(slot_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_config::build_slots;
    use crate::parse::parse_structure;

    fn setup() -> (GridConfig, WordList) {
        let config = build_slots(&parse_structure(
            "
            #_#
            ___
            #_#
            ",
        ))
        .unwrap();

        (config, WordList::new(["cat", "car", "dog", "at"]))
    }

    fn assign(word_list: &WordList, words: &[(SlotId, &str)]) -> Assignment {
        let mut assignment = Assignment::new(2);
        for &(slot_id, word) in words {
            assignment.insert(slot_id, word_list.find(word).unwrap());
        }
        assignment
    }

    #[test]
    fn test_empty_assignment_is_consistent_but_incomplete() {
        let (config, word_list) = setup();
        let assignment = Assignment::new(config.slot_count());

        assert!(is_consistent(&config, &word_list, &assignment));
        assert!(!is_complete(&config, &assignment));
    }

    #[test]
    fn test_matching_crossing_is_consistent() {
        let (config, word_list) = setup();
        let assignment = assign(&word_list, &[(0, "cat"), (1, "car")]);

        assert!(is_consistent(&config, &word_list, &assignment));
        assert!(is_complete(&config, &assignment));
    }

    #[test]
    fn test_conflicting_crossing_is_inconsistent() {
        let (config, word_list) = setup();
        let assignment = assign(&word_list, &[(0, "cat"), (1, "dog")]);

        assert!(!is_consistent(&config, &word_list, &assignment));
    }

    #[test]
    fn test_repeated_word_is_inconsistent() {
        let (config, word_list) = setup();
        let assignment = assign(&word_list, &[(0, "cat"), (1, "cat")]);

        assert!(!is_consistent(&config, &word_list, &assignment));
    }

    #[test]
    fn test_wrong_length_is_inconsistent() {
        let (config, word_list) = setup();

        assert!(!is_consistent(&config, &word_list, &assign(&word_list, &[(0, "at")])));
    }

    #[test]
    fn test_assignment_bookkeeping() {
        let mut assignment = Assignment::new(3);

        assert_eq!(assignment.insert(1, 7), None);
        assert_eq!(assignment.insert(1, 8), Some(7));
        assert_eq!(assignment.len(), 1);
        assert_eq!(assignment.iter().collect::<Vec<_>>(), vec![(1, 8)]);
        assert_eq!(assignment.remove(1), Some(8));
        assert_eq!(assignment.remove(1), None);
        assert!(assignment.is_empty());
    }
}
