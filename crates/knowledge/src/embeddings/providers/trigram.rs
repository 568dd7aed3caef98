//! Deterministic trigram embedding provider.
//!
//! Produces content-aware unit vectors from character trigrams and word
//! frequencies. Not semantically accurate like a real embedding model, but
//! deterministic and offline: the test suite runs on it, and it backs the
//! "trigram" provider setting for air-gapped experiments.

use crate::embeddings::EmbeddingProvider;
use nexus_core::AppResult;
use std::collections::HashMap;

/// Common words that carry no retrieval signal.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic embedding provider over character trigrams.
#[derive(Debug)]
pub struct TrigramEmbeddings {
    dimensions: usize,
}

impl TrigramEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split_whitespace()
            .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();

            // Spread each word over several dimensions via its trigrams.
            for window in chars.windows(3) {
                let bucket = hash_chars(window, 37) % self.dimensions as u64;
                embedding[bucket as usize] += (*freq as f32).sqrt();
            }

            // And one dimension for the whole word.
            let bucket = hash_chars(&chars, 31) % self.dimensions as u64;
            embedding[bucket as usize] += *freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

fn hash_chars(chars: &[char], seed: u64) -> u64 {
    let mut acc = 0u64;
    for &c in chars {
        for byte in (c as u32).to_le_bytes() {
            acc = acc.wrapping_mul(seed).wrapping_add(byte as u64);
        }
    }
    acc
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbeddings {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
