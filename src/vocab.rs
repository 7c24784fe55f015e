// imports
use crate::error::Result;

use std::collections::btree_set::{self, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;


/// Where corpus lines come from. A file is streamed line by line and never
/// held in memory as a whole.
#[derive(Clone, Debug)]
pub enum Corpus {
    Sentences(Vec<String>),
    File(PathBuf),
}

pub type CorpusLines<'a> = Box<dyn Iterator<Item = io::Result<String>> + 'a>;

impl Corpus {

    pub fn from_sentences<S: AsRef<str>>(sentences: &[S]) -> Corpus {
        Corpus::Sentences(sentences.iter().map(|s| s.as_ref().to_owned()).collect())
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Corpus {
        Corpus::File(path.into())
    }

    /// A fresh pass over the corpus, one item per line (or sentence).
    pub fn lines(&self) -> Result<CorpusLines<'_>> {
        match self {
            Corpus::Sentences(sentences) => Ok(Box::new(sentences.iter().cloned().map(Ok::<String, io::Error>))),
            Corpus::File(path) => {
                let f = File::open(path)?;
                Ok(Box::new(BufReader::new(f).lines()))
            }
        }
    }
}


// defines the behavior needed for tokenizing a corpus
pub trait Tokenizer {
    fn tokenize(sequence: &str) -> Vec<&str>;
}


/// Distinct tokens found in a corpus. Kept ordered so that vectors created
/// from it come out in the same order (and with the same seeded values) on
/// every run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: BTreeSet<String>,
}

impl Vocabulary {

    fn accumulate(&mut self, line: &str) {
        for tok in Vocabulary::tokenize(line) {
            if !self.tokens.contains(tok) {
                self.tokens.insert(tok.to_owned());
            }
        }
    }

    /// Scans the whole corpus once and collects every distinct token.
    pub fn build(corpus: &Corpus) -> Result<Vocabulary> {
        let mut vocab = Vocabulary::default();
        for line in corpus.lines()? {
            vocab.accumulate(&line?);
        }
        log::debug!("built vocabulary of {} tokens", vocab.len());
        Ok(vocab)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.tokens.iter()
    }
}

impl<'a> IntoIterator for &'a Vocabulary {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Tokenizer for Vocabulary {
    // simple tokenizer by whitespace, positions are preserved
    fn tokenize(sequence: &str) -> Vec<&str> {
        sequence.split_whitespace().collect()
    }
}
