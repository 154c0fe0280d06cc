//! Fill crossword grids with words from a dictionary.
//!
//! The grid is treated as a constraint satisfaction problem: each slot is a variable whose domain
//! is the set of dictionary words that could still go there. We derive the slots from a boolean
//! grid shape (`grid_config`), filter domains by length and make them arc-consistent
//! (`domains`, `arc_consistency`), and then run a backtracking search that maintains arc
//! consistency after every choice (`backtracking_search`).

pub mod arc_consistency;
pub mod backtracking_search;
pub mod consistency;
pub mod domains;
pub mod grid_config;
pub mod parse;
pub mod render;
pub mod word_list;

pub use backtracking_search::{find_fill, FillOptions, FillOutcome, FillResult, Solver, Statistics};
pub use consistency::{is_complete, is_consistent, Assignment};
pub use grid_config::{build_slots, Direction, GridConfig, GridError, Overlap, SlotConfig};
pub use parse::parse_structure;
pub use render::{letter_grid, render_grid};
pub use word_list::WordList;

/// Should we run extra checks to validate that we're never in an invalid state during search? This
/// can be enabled with `--features check_invariants` when debugging or making risky algorithm
/// changes.
pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given letter, based on its index in the word list's `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a given slot, based on its index in the grid config's `slot_configs` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the word list's `words` field.
pub type WordId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);
