use crate::error::{EmbedError, Result};
use crate::files_handling::{self, ReadFile, SaveFile};
use crate::vector::Vector;
use crate::vocab::Vocabulary;

use ndarray_rand::rand::Rng;
use rand::thread_rng;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// File name of the persisted vectors inside the output directory.
pub const VECTORS_FILE: &str = "vectors.json";


/// Word to vector mapping.
///
/// Vectors live in one arena indexed by position; `t2i` maps a word to its
/// slot, so the trainer can borrow two entries mutably at once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddingTable {
    words: Vec<String>,
    vectors: Vec<Vector>,
    t2i: HashMap<String, usize>,
}

/// What `reconcile` did to bring a loaded table in line with the vocabulary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub added: Vec<String>,
    pub stale: Vec<String>,
}

impl EmbeddingTable {

    pub fn new() -> EmbeddingTable {
        EmbeddingTable::default()
    }

    /// A fresh random vector for every vocabulary word.
    pub fn create(vocab: &Vocabulary, vector_size: usize) -> EmbeddingTable {
        EmbeddingTable::create_using(vocab, vector_size, &mut thread_rng())
    }

    pub fn create_using<R: Rng + ?Sized>(vocab: &Vocabulary, vector_size: usize, rng: &mut R) -> EmbeddingTable {
        let mut table = EmbeddingTable::new();
        for word in vocab {
            table.insert(word.to_owned(), Vector::random_using(vector_size, rng));
        }
        table
    }

    /// Inserts or replaces the vector of `word`.
    pub fn insert(&mut self, word: String, vector: Vector) {
        match self.t2i.get(&word) {
            Some(&i) => self.vectors[i] = vector,
            None => {
                self.t2i.insert(word.clone(), self.words.len());
                self.words.push(word);
                self.vectors.push(vector);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.t2i.contains_key(word)
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.t2i.get(word).copied()
    }

    pub fn get(&self, word: &str) -> Option<&Vector> {
        self.index_of(word).map(|i| &self.vectors[i])
    }

    pub fn get_mut(&mut self, word: &str) -> Option<&mut Vector> {
        self.index_of(word).map(move |i| &mut self.vectors[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.words.iter().map(String::as_str).zip(self.vectors.iter())
    }

    /// Two distinct entries borrowed mutably, by slot.
    pub(crate) fn pair_mut(&mut self, i: usize, j: usize) -> Option<(&mut Vector, &mut Vector)> {
        if i == j || i >= self.vectors.len() || j >= self.vectors.len() {
            return None;
        }
        if i < j {
            let (head, tail) = self.vectors.split_at_mut(j);
            Some((&mut head[i], &mut tail[0]))
        } else {
            let (head, tail) = self.vectors.split_at_mut(i);
            Some((&mut tail[0], &mut head[j]))
        }
    }

    /// Length shared by every vector, `None` for an empty table.
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Vector::len)
    }

    fn check_dimensions(&self) -> std::result::Result<(), String> {
        if let Some(dim) = self.dimension() {
            if let Some((word, v)) = self.iter().find(|(_, v)| v.len() != dim) {
                return Err(format!("vector of '{}' has length {}, expected {}", word, v.len(), dim));
            }
        }
        Ok(())
    }

    /// Brings a loaded table in line with the current vocabulary: words the
    /// table lacks get a fresh vector, words the corpus no longer has are kept.
    /// New vectors follow the table's own dimension when it has one.
    pub fn reconcile<R: Rng + ?Sized>(&mut self, vocab: &Vocabulary, vector_size: usize, rng: &mut R) -> Reconciliation {

        let dim = match self.dimension() {
            Some(dim) if dim != vector_size => {
                log::warn!("loaded vectors have length {}, ignoring configured vector_size {}", dim, vector_size);
                dim
            }
            Some(dim) => dim,
            None => vector_size,
        };

        let mut report = Reconciliation::default();
        for word in vocab {
            if !self.contains(word) {
                self.insert(word.to_owned(), Vector::random_using(dim, rng));
                report.added.push(word.to_owned());
            }
        }
        report.stale = self.words.iter().filter(|w| !vocab.contains(w)).cloned().collect();

        if !report.added.is_empty() {
            log::warn!("{} corpus words had no saved vector and were initialized: {:?}", report.added.len(), report.added);
        }
        if !report.stale.is_empty() {
            log::warn!("{} saved words no longer occur in the corpus and are kept untrained: {:?}", report.stale.len(), report.stale);
        }
        report
    }

    /// Writes the table as a JSON object of word to array, replacing the file.
    pub fn save(&self, file_path: &Path) -> Result<()> {
        log::info!("saving vectors to {}", file_path.display());
        if self.is_empty() {
            log::warn!("attempting to save an empty vector set");
        }
        self.save_file(file_path)?;
        log::info!("vectors saved");
        Ok(())
    }

    /// `Ok(None)` when there is no file or the file is blank.
    pub fn load(file_path: &Path) -> Result<Option<EmbeddingTable>> {
        files_handling::read_input::<EmbeddingTable>(file_path)
    }
}

impl SaveFile for EmbeddingTable {
    fn save_file(&self, file_path: &Path) -> Result<()> {
        files_handling::write_atomic(file_path, |f| {
            serde_json::to_writer(f, self)?;
            Ok(())
        })
    }
}

impl ReadFile for EmbeddingTable {
    fn read_file(file_path: &Path) -> Result<Option<Self>> {
        let data = match files_handling::read_to_string_if_exists(file_path)? {
            Some(data) if !data.trim().is_empty() => data,
            _ => return Ok(None),
        };

        let table: EmbeddingTable = serde_json::from_str(&data)
            .map_err(|e| EmbedError::malformed(file_path, e))?;
        table.check_dimensions().map_err(|reason| EmbedError::malformed(file_path, reason))?;
        Ok(Some(table))
    }
}

impl Serialize for EmbeddingTable {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer {

            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (word, vector) in self.iter() {
                map.serialize_entry(word, vector)?;
            }
            map.end()
    }
}

struct TableVisitor;
impl<'de> Visitor<'de> for TableVisitor {

    type Value = EmbeddingTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of word to array of numbers")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de> {

            let mut table = EmbeddingTable::new();
            while let Some((word, vector)) = access.next_entry::<String, Vector>()? {
                table.insert(word, vector);
            }
            Ok(table)
    }
}

impl<'de> Deserialize<'de> for EmbeddingTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de> {
            deserializer.deserialize_map(TableVisitor)
    }
}


#[cfg(test)]
mod tests {

    use super::{EmbeddingTable, VECTORS_FILE};
    use crate::error::EmbedError;
    use crate::vector::Vector;
    use crate::vocab::{Corpus, Vocabulary};
    use rand::{rngs::StdRng, SeedableRng};
    use std::fs;

    fn vocab(sentences: &[&str]) -> Vocabulary {
        Vocabulary::build(&Corpus::from_sentences(sentences)).unwrap()
    }

    #[test]
    fn create_covers_vocabulary() {
        let vocab = vocab(&["the quick brown fox", "the lazy dog"]);
        let table = EmbeddingTable::create(&vocab, 8);
        assert_eq!(table.len(), 6);
        for word in &vocab {
            assert_eq!(table.get(word).unwrap().len(), 8);
        }
        assert_eq!(table.dimension(), Some(8));
    }

    #[test]
    fn seeded_create_is_reproducible() {
        let vocab = vocab(&["b a c", "a d"]);
        let t1 = EmbeddingTable::create_using(&vocab, 4, &mut StdRng::seed_from_u64(42));
        let t2 = EmbeddingTable::create_using(&vocab, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(t1, t2);
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VECTORS_FILE);

        let mut table = EmbeddingTable::new();
        table.insert("a".to_string(), Vector::from_vec(vec![0.1, 0.2]));
        table.insert("b".to_string(), Vector::from_vec(vec![-0.3, 0.4]));
        table.save(&path).unwrap();

        let loaded = EmbeddingTable::load(&path).unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("a").unwrap().to_vec(), vec![0.1, 0.2]);
        assert_eq!(loaded.get("b").unwrap().to_vec(), vec![-0.3, 0.4]);
    }

    #[test]
    fn saved_file_is_a_plain_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VECTORS_FILE);

        let mut table = EmbeddingTable::new();
        table.insert("a".to_string(), Vector::from_vec(vec![0.5, -1.0]));
        table.save(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"a": [0.5, -1.0]}));
    }

    #[test]
    fn load_missing_or_blank_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VECTORS_FILE);
        assert!(EmbeddingTable::load(&path).unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(EmbeddingTable::load(&path).unwrap().is_none());
    }

    #[test]
    fn empty_table_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VECTORS_FILE);
        EmbeddingTable::new().save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
        let loaded = EmbeddingTable::load(&path).unwrap().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn load_ignores_configured_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VECTORS_FILE);
        fs::write(&path, r#"{"x": [1.0, 2.0, 3.0]}"#).unwrap();

        let loaded = EmbeddingTable::load(&path).unwrap().unwrap();
        assert_eq!(loaded.dimension(), Some(3));
    }

    #[test]
    fn malformed_files_fail_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VECTORS_FILE);

        for content in [r#"{"a": [0.1, "x"]}"#, "[1, 2]", "{not json", r#"{"a": [1.0], "b": [1.0, 2.0]}"#] {
            fs::write(&path, content).unwrap();
            match EmbeddingTable::load(&path) {
                Err(EmbedError::MalformedState { path: p, .. }) => assert_eq!(p, path),
                other => panic!("expected malformed state for {}, got {:?}", content, other),
            }
        }
    }

    #[test]
    fn reconcile_adds_missing_and_keeps_stale() {
        let mut table = EmbeddingTable::new();
        table.insert("old".to_string(), Vector::from_vec(vec![1.0, 1.0, 1.0]));
        table.insert("kept".to_string(), Vector::from_vec(vec![2.0, 2.0, 2.0]));

        let vocab = vocab(&["kept new"]);
        let report = table.reconcile(&vocab, 50, &mut StdRng::seed_from_u64(1));

        assert_eq!(report.added, vec!["new".to_string()]);
        assert_eq!(report.stale, vec!["old".to_string()]);
        assert_eq!(table.len(), 3);
        // table dimension wins over the configured one
        assert_eq!(table.get("new").unwrap().len(), 3);
        assert_eq!(table.get("kept").unwrap().to_vec(), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn pair_mut_borrows_two_distinct_entries() {
        let mut table = EmbeddingTable::new();
        table.insert("a".to_string(), Vector::from_vec(vec![1.0]));
        table.insert("b".to_string(), Vector::from_vec(vec![2.0]));

        let (b, a) = table.pair_mut(1, 0).unwrap();
        assert_eq!(a.get(0).unwrap(), 1.0);
        assert_eq!(b.get(0).unwrap(), 2.0);
        assert!(table.pair_mut(0, 0).is_none());
        assert!(table.pair_mut(0, 2).is_none());
    }

    #[test]
    fn insert_replaces_existing_word() {
        let mut table = EmbeddingTable::new();
        table.insert("a".to_string(), Vector::from_vec(vec![1.0]));
        table.insert("a".to_string(), Vector::from_vec(vec![3.0]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_mut("a").unwrap().get(0).unwrap(), 3.0);
    }
}
