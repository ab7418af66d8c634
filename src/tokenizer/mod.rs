pub mod ko_dic;
pub mod rules;

use std::path::Path;

use ko_dic::KoDicTokenizer;
use rules::RuleTokenizer;

/// A tagged morpheme. Tags follow the Sejong tag set used by mecab-ko-dic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Morpheme {
    pub form: String,
    pub tag: String,
}

impl Morpheme {
    pub fn new(form: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            tag: tag.into(),
        }
    }

    /// Case markers, auxiliary particles and conjunctive particles all start with `J`.
    pub fn is_particle(&self) -> bool {
        self.tag.starts_with('J')
    }
}

pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Morpheme>;
}

/// Use the dictionary-backed analyzer when one is configured and loads,
/// otherwise the rule-based particle splitter.
pub fn from_config(dictionary: Option<&Path>) -> Box<dyn Tokenizer> {
    if let Some(path) = dictionary {
        match KoDicTokenizer::load(path) {
            Ok(tokenizer) => {
                log::info!("loaded morphological dictionary from {}", path.display());
                return Box::new(tokenizer);
            }
            Err(err) => {
                log::warn!(
                    "could not load dictionary {}: {err:#}; using rule tokenizer",
                    path.display()
                );
            }
        }
    }
    Box::new(RuleTokenizer)
}
