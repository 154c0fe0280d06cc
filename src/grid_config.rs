use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

use crate::{GridCoord, SlotId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// Errors for grid shapes that can't be turned into slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("malformed grid: row {row} has {found} cells but row 0 has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// The pair of character offsets at which two neighboring slots must agree. `cell` indexes into
/// the first slot of the pair it was looked up for and `other_cell` into the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub cell: usize,
    pub other_cell: usize,
}

impl Overlap {
    fn flipped(self) -> Overlap {
        Overlap { cell: self.other_cell, other_cell: self.cell }
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing a slot in the grid. Slots never change once derived.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// For each cell of the slot, the slot crossing it (if any).
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,

    /// Ids of the slots crossing this one, ascending.
    pub neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]>,
}

impl SlotConfig {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (self.start_cell.0, self.start_cell.1 + cell_idx),
            Direction::Down => (self.start_cell.0 + cell_idx, self.start_cell.1),
        })
    }
}

/// An ordered pair of neighboring slots; revising the arc narrows `slot_id` against
/// `other_slot_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotArc {
    pub slot_id: SlotId,
    pub other_slot_id: SlotId,
}

/// The static structure of a grid: its shape, its slots, and how they cross.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub slot_configs: Vec<SlotConfig>,
    shape: Vec<Vec<bool>>,

    /// Overlaps keyed by unordered slot pair, stored with the lower slot id first.
    overlaps: HashMap<(SlotId, SlotId), Overlap>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

impl GridConfig {
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.slot_configs[slot_id].neighbors
    }

    /// Look up the overlap between two slots, oriented so that `cell` indexes into `slot_id`.
    pub fn overlap(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<Overlap> {
        if slot_id <= other_slot_id {
            self.overlaps.get(&(slot_id, other_slot_id)).copied()
        } else {
            self.overlaps.get(&(other_slot_id, slot_id)).map(|overlap| overlap.flipped())
        }
    }

    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        self.shape.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    /// Every ordered pair of neighboring slots, in both directions.
    pub fn arcs(&self) -> Vec<SlotArc> {
        self.slot_configs
            .iter()
            .flat_map(|slot_config| {
                slot_config.neighbors.iter().map(move |&other_slot_id| SlotArc {
                    slot_id: slot_config.id,
                    other_slot_id,
                })
            })
            .collect()
    }
}

/// Find the maximal runs of length 2 or more in a line of cells, as (start index, length).
fn find_runs<I: IntoIterator<Item = bool>>(cells: I) -> Vec<(usize, usize)> {
    let mut runs = vec![];
    let mut run_start: Option<usize> = None;
    let mut line_length = 0;

    for (idx, fillable) in cells.into_iter().enumerate() {
        line_length = idx + 1;
        match (fillable, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                if idx - start > 1 {
                    runs.push((start, idx - start));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        if line_length - start > 1 {
            runs.push((start, line_length - start));
        }
    }

    runs
}

/// Derive the slots and overlaps for a grid shape, where `true` marks a fillable cell. Across
/// slots are numbered first in row-major order, then down slots in column-major order.
pub fn build_slots(shape: &[Vec<bool>]) -> Result<GridConfig, GridError> {
    let height = shape.len();
    let width = shape.first().map(Vec::len).unwrap_or(0);

    for (row, cells) in shape.iter().enumerate() {
        if cells.len() != width {
            return Err(GridError::RaggedRow { row, expected: width, found: cells.len() });
        }
    }

    let mut slot_configs: Vec<SlotConfig> = vec![];
    let mut push_slot = |start_cell: GridCoord, direction: Direction, length: usize| {
        let id = slot_configs.len();
        slot_configs.push(SlotConfig {
            id,
            start_cell,
            direction,
            length,
            crossings: (0..length).map(|_| None).collect(),
            neighbors: SmallVec::new(),
        });
    };

    for (row, cells) in shape.iter().enumerate() {
        for (col, length) in find_runs(cells.iter().copied()) {
            push_slot((row, col), Direction::Across, length);
        }
    }
    for col in 0..width {
        for (row, length) in find_runs(shape.iter().map(|cells| cells[col])) {
            push_slot((row, col), Direction::Down, length);
        }
    }

    // Build a map from cell location to the slots covering it, which we can then use to calculate
    // crossings. Each cell is covered by at most one across and one down slot.
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
    for slot_config in &slot_configs {
        for (cell_idx, loc) in slot_config.cell_coords().enumerate() {
            entries_by_loc.entry(loc).or_default().push((slot_config.id, cell_idx));
        }
    }

    let mut overlaps: HashMap<(SlotId, SlotId), Overlap> = HashMap::new();
    for entries in entries_by_loc.values() {
        if let &[(first_id, first_cell), (second_id, second_cell)] = entries.as_slice() {
            let (slot_id, cell, other_slot_id, other_cell) = if first_id < second_id {
                (first_id, first_cell, second_id, second_cell)
            } else {
                (second_id, second_cell, first_id, first_cell)
            };
            overlaps.insert((slot_id, other_slot_id), Overlap { cell, other_cell });

            slot_configs[slot_id].crossings[cell] =
                Some(Crossing { other_slot_id, other_slot_cell: other_cell });
            slot_configs[other_slot_id].crossings[other_cell] =
                Some(Crossing { other_slot_id: slot_id, other_slot_cell: cell });
        }
    }

    for slot_config in &mut slot_configs {
        let mut neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = slot_config
            .crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_slot_id)
            .collect();
        neighbors.sort_unstable();
        slot_config.neighbors = neighbors;
    }

    Ok(GridConfig {
        width,
        height,
        slot_configs,
        shape: shape.to_vec(),
        overlaps,
    })
}
