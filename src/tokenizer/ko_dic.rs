use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Result;
use vibrato::{Dictionary, Tokenizer as VibratoTokenizer};

use crate::tokenizer::{Morpheme, Tokenizer};

/// Morphological analyzer over a compiled mecab-ko-dic system dictionary.
pub struct KoDicTokenizer {
    inner: VibratoTokenizer,
}

impl KoDicTokenizer {
    /// Load a vibrato-compiled dictionary. Files ending in `.zst` are
    /// decompressed on the fly.
    pub fn load(path: &Path) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "zst") {
            Box::new(zstd::Decoder::new(file)?)
        } else {
            Box::new(file)
        };
        let dict = Dictionary::read(reader)?;
        let inner = VibratoTokenizer::new(dict).ignore_space(true)?;
        Ok(Self { inner })
    }
}

/// mecab-ko-dic features start with the POS tag; compound tags such as
/// `VV+EP` keep the first component.
fn tag_of(feature: &str) -> &str {
    let pos = feature.split(',').next().unwrap_or("");
    pos.split('+').next().unwrap_or(pos)
}

impl Tokenizer for KoDicTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Morpheme> {
        let mut worker = self.inner.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();
        worker
            .token_iter()
            .map(|token| Morpheme::new(token.surface(), tag_of(token.feature())))
            .collect()
    }
}
