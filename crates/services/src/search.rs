//! # Semantic Search
//!
//! Natural-language product lookup delegated to a hosted ranking model.
//! The feature is fail-soft: an unreachable store, a model error or a reply
//! that breaks the contract all produce an empty result and a `degraded`
//! warning, never a failed request.

use std::sync::Arc;

use domains::{Capability, Product, ProductRanker, ProductRepo, ProductSummary, RankedCandidate, Result};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::access::Actor;

/// Upper bound on products summarised into one model prompt.
pub const MAX_CANDIDATES: i64 = 100;
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticMatch {
    pub product: Product,
    pub relevance_score: i64,
    pub reasoning: String,
}

#[derive(Clone)]
pub struct SearchService {
    products: Arc<dyn ProductRepo>,
    ranker: Arc<dyn ProductRanker>,
}

impl SearchService {
    pub fn new(products: Arc<dyn ProductRepo>, ranker: Arc<dyn ProductRanker>) -> Self {
        Self { products, ranker }
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn semantic_search(&self, actor: &Actor, query: &str, limit: Option<usize>) -> Result<Vec<SemanticMatch>> {
        actor.require(Capability::AccessAi)?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT).max(1);

        let candidates = match self.products.list_products(true, Some(MAX_CANDIDATES)).await {
            Ok(products) if products.is_empty() => return Ok(Vec::new()),
            Ok(products) => products,
            Err(e) => {
                warn!(degraded = true, error = %e, "semantic search skipped, products unavailable");
                return Ok(Vec::new());
            }
        };

        let summaries: Vec<ProductSummary> = candidates
            .iter()
            .enumerate()
            .map(|(idx, p)| ProductSummary::from_product(idx, p))
            .collect();

        let ranked = match self.ranker.rank(query, &summaries, limit).await {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!(degraded = true, error = %e, "semantic search failed, returning no matches");
                return Ok(Vec::new());
            }
        };

        let matches = assemble(&candidates, ranked, limit);
        debug!(candidates = candidates.len(), matches = matches.len(), "semantic search ranked");
        Ok(matches)
    }
}

/// Maps ranked indices back onto the candidate list. Indices outside the
/// list are dropped; a score outside 0..=100 invalidates the whole answer.
fn assemble(candidates: &[Product], ranked: Vec<RankedCandidate>, limit: usize) -> Vec<SemanticMatch> {
    if let Some(bad) = ranked.iter().find(|r| !(0..=100).contains(&r.relevance_score)) {
        warn!(degraded = true, score = bad.relevance_score, "ranking reply out of contract, discarding");
        return Vec::new();
    }

    let mut matches: Vec<SemanticMatch> = ranked
        .into_iter()
        .filter_map(|r| {
            let product = usize::try_from(r.index).ok().and_then(|i| candidates.get(i))?;
            Some(SemanticMatch {
                product: product.clone(),
                relevance_score: r.relevance_score,
                reasoning: r.reasoning,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    matches.truncate(limit);
    matches
}
