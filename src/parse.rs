/// Parse a grid structure, with `_` representing fillable cells and any other character
/// representing a block. Each non-blank line is one row; surrounding whitespace is ignored, so
/// structures can be written as indented string literals.
///
/// Rows aren't required to have the same length here; `build_slots` reports ragged structures.
pub fn parse_structure(text: &str) -> Vec<Vec<bool>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().map(|c| c == '_').collect())
        .collect()
}
