use crate::embeddings::EmbeddingTable;
use crate::error::{EmbedError, Result};
use crate::vector::Vector;


/// Nearest-neighbour queries over a trained table.
pub struct Similarity<'a> {
    table: &'a EmbeddingTable,
}

impl<'a> Similarity<'a> {

    pub fn new(table: &'a EmbeddingTable) -> Similarity<'a> {
        Self { table }
    }

    pub fn extract_vec_from_word(&self, token: &str) -> Result<&'a Vector> {
        self.table
            .get(token)
            .ok_or_else(|| EmbedError::UnknownWord(token.to_string()))
    }

    /// `b - a + c` for "a is to b as c is to ?".
    pub fn extract_analogy_vec(&self, inputs: [&str; 3]) -> Result<Vector> {
        let a = self.extract_vec_from_word(inputs[0])?;
        let b = self.extract_vec_from_word(inputs[1])?;
        let c = self.extract_vec_from_word(inputs[2])?;
        b.subtract(a)?.add(c)
    }

    /// The `k` words closest to `vec` by cosine similarity, best first.
    /// Words in `exclude` and zero vectors in the table are left out.
    pub fn find_k_most_similar(&self, vec: &Vector, k: usize, exclude: &[&str]) -> Result<Vec<(String, f32)>> {

        if vec.norm() == 0.0 {
            return Err(EmbedError::ZeroNorm);
        }

        let mut scores: Vec<(String, f32)> = Vec::new();
        for (word, other) in self.table.iter() {
            if exclude.iter().any(|e| *e == word) {
                continue;
            }
            match vec.cosine_similarity(other) {
                Ok(score) => scores.push((word.to_string(), score)),
                Err(EmbedError::ZeroNorm) => continue,
                Err(e) => return Err(e),
            }
        }

        // sort by most similar in descending order
        scores.sort_by(|(_, s), (_, t)| t.total_cmp(s));
        scores.truncate(k);
        Ok(scores)
    }

    pub fn most_similar(&self, token: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let vec = self.extract_vec_from_word(token)?;
        self.find_k_most_similar(vec, k, &[token])
    }

    pub fn extract_analogies(&self, inputs: [&str; 3], k: usize) -> Result<Vec<(String, f32)>> {
        let analogy = self.extract_analogy_vec(inputs)?;
        self.find_k_most_similar(&analogy, k, &inputs)
    }
}
