use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Comment, CommentRepo, DomainError, Reaction, ReactionRepo, Result, TargetRef};
use uuid::Uuid;

use super::{claim, release, MemoryStore};

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn list_comments(&self, target: TargetRef) -> Result<Vec<Comment>> {
        self.check()?;
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.target == target && !c.is_deleted)
            .map(|c| c.clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.check()?;
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.check()?;
        self.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn update_comment_content(&self, id: Uuid, content: &str, at: DateTime<Utc>) -> Result<Option<Comment>> {
        self.check()?;
        let Some(mut comment) = self.comments.get_mut(&id) else {
            return Ok(None);
        };
        if comment.is_deleted {
            return Ok(None);
        }
        comment.content = content.to_string();
        comment.is_edited = true;
        comment.updated_at = at;
        Ok(Some(comment.clone()))
    }

    async fn soft_delete_comment(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        self.check()?;
        Ok(self
            .comments
            .get_mut(&id)
            .map(|mut comment| {
                comment.is_deleted = true;
                comment.updated_at = at;
            })
            .is_some())
    }
}

#[async_trait]
impl ReactionRepo for MemoryStore {
    async fn find_reaction(&self, target: TargetRef, user_id: &str) -> Result<Option<Reaction>> {
        self.check()?;
        let Some(id) = self.reaction_keys.get(&(target, user_id.to_string())).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.reactions.get(&id).map(|r| r.clone()))
    }

    async fn insert_reaction(&self, reaction: &Reaction) -> Result<()> {
        self.check()?;
        if !claim(&self.reaction_keys, (reaction.target, reaction.user_id.clone()), reaction.id) {
            return Err(DomainError::Conflict(format!("{} already reacted to {}", reaction.user_id, reaction.target)));
        }
        self.reactions.insert(reaction.id, reaction.clone());
        Ok(())
    }

    async fn delete_reaction(&self, id: Uuid) -> Result<bool> {
        self.check()?;
        let Some((_, reaction)) = self.reactions.remove(&id) else {
            return Ok(false);
        };
        release(&self.reaction_keys, &(reaction.target, reaction.user_id), id);
        Ok(true)
    }

    async fn count_reactions(&self, target: TargetRef) -> Result<u64> {
        self.check()?;
        Ok(self.reactions.iter().filter(|r| r.target == target).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use domains::TargetKind;

    fn target() -> TargetRef {
        TargetRef::new(TargetKind::Post, Uuid::now_v7())
    }

    #[tokio::test]
    async fn deleted_comments_leave_the_listing_and_cannot_be_edited() {
        let store = MemoryStore::new();
        let target = target();
        let keep = Comment::new(target, "a".into(), "first".into(), None, Utc::now());
        let gone = Comment::new(target, "b".into(), "second".into(), None, Utc::now());
        store.insert_comment(&keep).await.unwrap();
        store.insert_comment(&gone).await.unwrap();

        assert!(store.soft_delete_comment(gone.id, Utc::now()).await.unwrap());
        let listed = store.list_comments(target).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
        assert!(store.get_comment(gone.id).await.unwrap().unwrap().is_deleted);
        assert!(store.update_comment_content(gone.id, "x", Utc::now()).await.unwrap().is_none());

        let edited = store.update_comment_content(keep.id, "first!", Utc::now()).await.unwrap().unwrap();
        assert!(edited.is_edited);
    }

    fn like(target: TargetRef, user_id: &str) -> Reaction {
        Reaction {
            id: Uuid::now_v7(),
            target,
            user_id: user_id.into(),
            reaction_type: Reaction::DEFAULT_TYPE.into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn one_reaction_per_user_and_target() {
        let store = MemoryStore::new();
        let target = target();
        let like = like(target, "u");
        store.insert_reaction(&like).await.unwrap();
        let again = Reaction { id: Uuid::now_v7(), ..like.clone() };
        assert!(matches!(store.insert_reaction(&again).await, Err(DomainError::Conflict(_))));
        assert_eq!(store.count_reactions(target).await.unwrap(), 1);

        assert!(store.delete_reaction(like.id).await.unwrap());
        assert!(store.find_reaction(target, "u").await.unwrap().is_none());
    }

    #[test]
    fn racing_reactions_from_one_user_store_a_single_row() {
        let store = Arc::new(MemoryStore::new());
        let target = target();
        let gate = Arc::new(Barrier::new(8));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let (store, gate) = (store.clone(), gate.clone());
                thread::spawn(move || {
                    let reaction = like(target, "u");
                    gate.wait();
                    tokio_test::block_on(store.insert_reaction(&reaction)).is_ok()
                })
            })
            .collect();
        let stored = workers.into_iter().filter_map(|w| w.join().ok()).filter(|ok| *ok).count();

        assert_eq!(stored, 1);
        assert_eq!(tokio_test::block_on(store.count_reactions(target)).unwrap(), 1);
    }

    #[tokio::test]
    async fn a_removed_reaction_can_be_added_again() {
        let store = MemoryStore::new();
        let target = target();
        let first = like(target, "u");
        store.insert_reaction(&first).await.unwrap();
        store.delete_reaction(first.id).await.unwrap();

        let second = like(target, "u");
        store.insert_reaction(&second).await.unwrap();
        assert_eq!(store.find_reaction(target, "u").await.unwrap().map(|r| r.id), Some(second.id));
    }
}
