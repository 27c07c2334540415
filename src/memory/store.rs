//! Two-tier memory store with embedding-similarity recall
//!
//! Short-term memory is bounded; on overflow the single oldest entry (by
//! insertion order, not relevance) transitions to the long-term tier.
//! Records are never deleted.

use crate::errors::Result;
use crate::memory::types::{cosine_similarity, MemoryRecord, MemoryTier};
use crate::models::EmbeddingModel;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Memory bounds and recall tuning
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Maximum short-term entries before eviction to long-term
    pub max_short_term: usize,

    /// Minimum cosine similarity for recall hits
    pub relevance_threshold: f32,

    /// Entries concatenated by `summarize_recent`
    pub recent_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_short_term: 50,
            relevance_threshold: 0.35,
            recent_window: 5,
        }
    }
}

/// Two-tier memory store keyed by embedding similarity
pub struct MemoryStore {
    embedder: Arc<dyn EmbeddingModel>,
    short_term: VecDeque<MemoryRecord>,
    long_term: Vec<MemoryRecord>,
    next_sequence: u64,
    config: MemoryConfig,
}

impl MemoryStore {
    pub fn new(embedder: Arc<dyn EmbeddingModel>, config: MemoryConfig) -> Self {
        Self {
            embedder,
            short_term: VecDeque::with_capacity(config.max_short_term),
            long_term: Vec::new(),
            next_sequence: 0,
            config,
        }
    }

    /// Embed and append a short-term entry, evicting the oldest entry to
    /// long-term when the short-term bound is exceeded
    pub async fn add(&mut self, content: &str, metadata: HashMap<String, String>) -> Result<()> {
        let embedding = self.embedder.embed(content).await?;

        let record = MemoryRecord {
            content: content.to_string(),
            timestamp: Utc::now(),
            sequence: self.next_sequence,
            metadata,
            embedding,
            tier: MemoryTier::ShortTerm,
        };
        self.next_sequence += 1;
        self.short_term.push_back(record);

        if self.short_term.len() > self.config.max_short_term {
            // Oldest by insertion order, not relevance
            if let Some(mut evicted) = self.short_term.pop_front() {
                evicted.tier = MemoryTier::LongTerm;
                self.long_term.push(evicted);
            }
        }

        Ok(())
    }

    /// Recall the `k` most similar entries across both tiers
    ///
    /// Hits are filtered to similarity >= relevance_threshold, sorted by
    /// similarity descending with recency breaking ties.
    pub async fn recall(&self, query: &str, k: usize) -> Result<Vec<MemoryRecord>> {
        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<(f32, &MemoryRecord)> = self
            .short_term
            .iter()
            .chain(self.long_term.iter())
            .map(|r| (cosine_similarity(&query_embedding, &r.embedding), r))
            .filter(|(sim, _)| *sim >= self.config.relevance_threshold)
            .collect();

        scored.sort_by(|(sim_a, rec_a), (sim_b, rec_b)| {
            sim_b
                .partial_cmp(sim_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(rec_b.sequence.cmp(&rec_a.sequence))
        });

        Ok(scored.into_iter().take(k).map(|(_, r)| r.clone()).collect())
    }

    /// Verbatim concatenation of the most recent short-term entries
    ///
    /// Cheap fallback context; no model call involved.
    pub fn summarize_recent(&self) -> String {
        let start = self
            .short_term
            .len()
            .saturating_sub(self.config.recent_window);
        self.short_term
            .range(start..)
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn short_term_len(&self) -> usize {
        self.short_term.len()
    }

    pub fn long_term_len(&self) -> usize {
        self.long_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.short_term.is_empty() && self.long_term.is_empty()
    }

    /// Oldest long-term entry, if any (eviction order inspection)
    pub fn oldest_long_term(&self) -> Option<&MemoryRecord> {
        self.long_term.first()
    }
}
