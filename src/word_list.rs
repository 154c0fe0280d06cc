use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Debug, Formatter};

use crate::{GlyphId, WordId, MAX_SLOT_LENGTH};

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// The length of the word in chars, which is what has to match a slot's length.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The dictionary that slots are filled from. Words are deduplicated and kept in lexicographic
/// order, so a `WordId` is stable for a given set of input words no matter what order they were
/// supplied in.
pub struct WordList {
    /// Every distinct char appearing in any word, indexed by `GlyphId`.
    pub glyphs: Vec<char>,
    pub words: Vec<Word>,
    glyph_ids_by_char: HashMap<char, GlyphId>,
    word_ids_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &format!("({} entries)", self.words.len()))
            .finish()
    }
}

impl WordList {
    /// Build a word list from the given words. Empty strings are dropped since they can't fill
    /// any slot.
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique_words: BTreeSet<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|word| !word.is_empty())
            .collect();

        let mut glyphs: Vec<char> = vec![];
        let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();
        let mut word_ids_by_string: HashMap<String, WordId> =
            HashMap::with_capacity(unique_words.len());

        let words: Vec<Word> = unique_words
            .into_iter()
            .enumerate()
            .map(|(word_id, string)| {
                let glyphs = string
                    .chars()
                    .map(|c| {
                        *glyph_ids_by_char.entry(c).or_insert_with(|| {
                            glyphs.push(c);
                            glyphs.len() - 1
                        })
                    })
                    .collect();
                word_ids_by_string.insert(string.clone(), word_id);
                Word { string, glyphs }
            })
            .collect();

        WordList { glyphs, words, glyph_ids_by_char, word_ids_by_string }
    }

    /// Build a word list from text with one word per line. Lines are trimmed and uppercased, and
    /// blank lines are skipped.
    pub fn from_text(text: &str) -> WordList {
        WordList::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_uppercase),
        )
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn glyph(&self, glyph_id: GlyphId) -> char {
        self.glyphs[glyph_id]
    }

    pub fn glyph_id(&self, c: char) -> Option<GlyphId> {
        self.glyph_ids_by_char.get(&c).copied()
    }

    /// Look up the id of the given word, if it's in the list.
    pub fn find(&self, word: &str) -> Option<WordId> {
        self.word_ids_by_string.get(word).copied()
    }
}
