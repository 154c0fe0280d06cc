use crate::consistency::Assignment;
use crate::grid_config::GridConfig;
use crate::word_list::WordList;

/// The char drawn for blocked cells by `render_grid`.
pub const BLOCK_CHAR: char = '█';

/// Return a 2-D array with the letter assigned to each cell, or `None` for blocked cells and cells
/// that no assigned slot covers.
pub fn letter_grid(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters: Vec<Vec<Option<char>>> = vec![vec![None; config.width]; config.height];

    for (slot_id, word_id) in assignment.iter() {
        let word = word_list.word(word_id);
        for ((row, col), &glyph) in config.slot_configs[slot_id].cell_coords().zip(&word.glyphs) {
            letters[row][col] = Some(word_list.glyph(glyph));
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, one line per row.
pub fn render_grid(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> String {
    letter_grid(config, word_list, assignment)
        .iter()
        .enumerate()
        .map(|(row, letters)| {
            letters
                .iter()
                .enumerate()
                .map(|(col, letter)| match letter {
                    Some(letter) => *letter,
                    None if config.is_fillable(row, col) => ' ',
                    None => BLOCK_CHAR,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
