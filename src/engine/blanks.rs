use std::collections::HashMap;

use rand::Rng;
use rand::seq::index;

pub const PLACEHOLDER: &str = "____";
pub const MIN_BLANK_CHARS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlankState {
    pub segment_index: usize,
    pub masked_text: String,
    /// Removed words in sentence order.
    pub answers: Vec<String>,
}

impl BlankState {
    /// Put the answers back into the placeholders, in order.
    pub fn fill(&self, answers: &[String]) -> String {
        let mut answers = answers.iter();
        self.masked_text
            .split(' ')
            .map(|w| {
                if w == PLACEHOLDER {
                    answers.next().map(String::as_str).unwrap_or(PLACEHOLDER)
                } else {
                    w
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Mask up to `max_blanks` randomly chosen words of two or more characters.
///
/// Selection is by candidate position, so a word that occurs twice can be
/// chosen twice; each masked occurrence consumes one selection.
pub fn generate_blanks<R: Rng + ?Sized>(
    segment_index: usize,
    sentence: &str,
    max_blanks: usize,
    rng: &mut R,
) -> BlankState {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    let candidates: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.chars().count() >= MIN_BLANK_CHARS)
        .collect();

    let amount = max_blanks.min(candidates.len());
    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for i in index::sample(rng, candidates.len(), amount).iter() {
        *remaining.entry(candidates[i]).or_insert(0) += 1;
    }

    let mut masked = Vec::with_capacity(words.len());
    let mut answers = Vec::with_capacity(amount);
    for word in words {
        match remaining.get_mut(word) {
            Some(left) if *left > 0 => {
                *left -= 1;
                masked.push(PLACEHOLDER);
                answers.push(word.to_string());
            }
            _ => masked.push(word),
        }
    }

    BlankState {
        segment_index,
        masked_text: masked.join(" "),
        answers,
    }
}

/// Holds the blanks of the segment currently on screen. A redraw of the same
/// segment gets the same blanks back; moving to another index regenerates.
#[derive(Clone, Debug, Default)]
pub struct BlankCache {
    current: Option<BlankState>,
}

impl BlankCache {
    pub fn get_or_generate<R: Rng + ?Sized>(
        &mut self,
        segment_index: usize,
        sentence: &str,
        max_blanks: usize,
        rng: &mut R,
    ) -> &BlankState {
        if self.peek(segment_index).is_none() {
            self.current = None;
        }
        self.current
            .get_or_insert_with(|| generate_blanks(segment_index, sentence, max_blanks, rng))
    }

    pub fn peek(&self, segment_index: usize) -> Option<&BlankState> {
        self.current
            .as_ref()
            .filter(|state| state.segment_index == segment_index)
    }

    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
