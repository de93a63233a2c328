//! # Reaction Engine
//!
//! Like-style reactions on posts, documents, training material and comments.
//! A user holds at most one reaction per target; toggling flips presence.

use std::sync::Arc;

use chrono::Utc;
use domains::{DomainError, Reaction, ReactionRepo, ReactionToggle, Result, TargetRef};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::access::Actor;
use crate::degrade::degrade_read;
use crate::targets::TargetResolver;

#[derive(Clone)]
pub struct ReactionService {
    reactions: Arc<dyn ReactionRepo>,
    targets: TargetResolver,
}

impl ReactionService {
    pub fn new(reactions: Arc<dyn ReactionRepo>, targets: TargetResolver) -> Self {
        Self { reactions, targets }
    }

    /// Removes the caller's reaction if present, otherwise adds one.
    #[instrument(skip(self, actor), fields(actor = %actor.id(), %target))]
    pub async fn toggle(&self, actor: &Actor, target: TargetRef, reaction_type: Option<&str>) -> Result<ReactionToggle> {
        self.targets.ensure_visible(actor, target).await?;

        if let Some(existing) = self.reactions.find_reaction(target, actor.id()).await? {
            self.reactions.delete_reaction(existing.id).await?;
            debug!("reaction removed");
            return Ok(ReactionToggle { added: false });
        }

        let reaction = Reaction {
            id: Uuid::now_v7(),
            target,
            user_id: actor.id().to_string(),
            reaction_type: reaction_type
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(Reaction::DEFAULT_TYPE)
                .to_string(),
            created_at: Utc::now(),
        };

        match self.reactions.insert_reaction(&reaction).await {
            Ok(()) => {}
            // A concurrent toggle from the same user landed first; the row exists either way.
            Err(DomainError::Conflict(_)) => debug!("reaction already present"),
            Err(e) => return Err(e),
        }
        Ok(ReactionToggle { added: true })
    }

    /// Every reaction row on the target, regardless of type.
    pub async fn count(&self, target: TargetRef) -> Result<u64> {
        degrade_read("reactions.count", self.reactions.count_reactions(target).await)
    }

    pub async fn has_reacted(&self, actor: &Actor, target: TargetRef) -> Result<bool> {
        let found = self.reactions.find_reaction(target, actor.id()).await.map(|r| r.is_some());
        degrade_read("reactions.has_reacted", found)
    }
}
