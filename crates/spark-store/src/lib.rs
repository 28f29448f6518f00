//! Collection store for the Spark idea journal.
//!
//! Holds the authoritative in-memory set of ideas and folders for the
//! session and keeps a durable copy in sync through an injected
//! [`JournalPort`]. Every mutation persists the touched collection before
//! returning, so callers never observe a partial-write window; the write
//! lock spans the mutation plus the save, which also keeps persistence
//! ordered relative to the mutation that triggered it.
//!
//! Mutations against unknown ids are no-ops (they return `None`/`false`),
//! keeping callers resilient to stale references.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use spark_models::{
    Folder, Idea, IdeaDraft, IdeaPatch, IdeaUpdate, UpdateDraft, UpdatePatch,
};

mod error;
mod port;

pub use error::{Error, Result};
pub use port::{JournalPort, JsonFilePort};

struct JournalState {
    ideas: Vec<Idea>,
    folders: Vec<Folder>,
}

/// The authoritative store: in-memory state plus a persistence port.
///
/// Constructed once per process and passed by reference (no ambient
/// singletons).
pub struct JournalStore {
    state: RwLock<JournalState>,
    port: Arc<dyn JournalPort>,
}

impl JournalStore {
    /// Open the store, loading both collections through the port.
    pub async fn open(port: Arc<dyn JournalPort>) -> Result<Self> {
        let ideas = port.load_ideas().await?;
        let folders = port.load_folders().await?;

        info!(
            ideas = ideas.len(),
            folders = folders.len(),
            "Journal store loaded"
        );

        Ok(Self {
            state: RwLock::new(JournalState { ideas, folders }),
            port,
        })
    }

    // ------------------------------------------------------------------
    // Reads (cloned snapshots)
    // ------------------------------------------------------------------

    /// All ideas in collection order (most recently created first).
    pub async fn ideas(&self) -> Vec<Idea> {
        self.state.read().await.ideas.clone()
    }

    /// All folders in creation order.
    pub async fn folders(&self) -> Vec<Folder> {
        self.state.read().await.folders.clone()
    }

    pub async fn get_idea(&self, id: &str) -> Option<Idea> {
        self.state
            .read()
            .await
            .ideas
            .iter()
            .find(|idea| idea.id == id)
            .cloned()
    }

    pub async fn get_folder(&self, id: &str) -> Option<Folder> {
        self.state
            .read()
            .await
            .folders
            .iter()
            .find(|folder| folder.id == id)
            .cloned()
    }

    // ------------------------------------------------------------------
    // Idea mutations
    // ------------------------------------------------------------------

    /// Create an idea from a draft: assigns id and timestamps, prepends to
    /// the collection, persists.
    pub async fn create_idea(&self, draft: IdeaDraft) -> Result<Idea> {
        let mut idea = Idea::new(draft.title, draft.content);
        idea.folder_id = draft.folder_id;
        idea.attachments = draft.attachments;

        let mut state = self.state.write().await;
        state.ideas.insert(0, idea.clone());
        self.port.save_ideas(&state.ideas).await?;

        debug!(idea_id = %idea.id, "Idea created");
        Ok(idea)
    }

    /// Replace the stored idea with a matching id by full value, refreshing
    /// `last_modified`. Unknown id is a no-op returning `None`.
    pub async fn replace_idea(&self, mut idea: Idea) -> Result<Option<Idea>> {
        idea.touch();

        let mut state = self.state.write().await;
        let Some(slot) = state.ideas.iter_mut().find(|i| i.id == idea.id) else {
            return Ok(None);
        };
        *slot = idea.clone();
        self.port.save_ideas(&state.ideas).await?;

        Ok(Some(idea))
    }

    /// Apply a partial patch to an idea. Unknown id is a no-op returning
    /// `None`.
    pub async fn patch_idea(&self, id: &str, patch: IdeaPatch) -> Result<Option<Idea>> {
        let mut state = self.state.write().await;
        let Some(idea) = state.ideas.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            idea.title = title;
        }
        if let Some(content) = patch.content {
            idea.content = content;
        }
        if let Some(status) = patch.status {
            idea.status = status;
        }
        if patch.uncategorize {
            idea.folder_id = None;
        } else if let Some(folder_id) = patch.folder_id {
            idea.folder_id = Some(folder_id);
        }
        if let Some(attachments) = patch.attachments {
            idea.attachments = attachments;
        }
        idea.touch();

        let updated = idea.clone();
        self.port.save_ideas(&state.ideas).await?;

        Ok(Some(updated))
    }

    /// Merge tags into an idea, skipping duplicates. The lookup, merge, and
    /// save all run under one write lock, so a mutation that landed while
    /// the caller was computing the tags is never overwritten. Unknown id
    /// is a no-op returning `None`.
    pub async fn merge_tags(&self, id: &str, tags: &[String]) -> Result<Option<Idea>> {
        let mut state = self.state.write().await;
        let Some(idea) = state.ideas.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };

        let mut added = false;
        for tag in tags {
            if !idea.tags.contains(tag) {
                idea.tags.push(tag.clone());
                added = true;
            }
        }

        if !added {
            return Ok(Some(idea.clone()));
        }

        idea.touch();
        let updated = idea.clone();
        self.port.save_ideas(&state.ideas).await?;

        Ok(Some(updated))
    }

    /// Delete an idea by id. Does not cascade to folders. Unknown id is a
    /// no-op returning `false`.
    pub async fn delete_idea(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.ideas.len();
        state.ideas.retain(|idea| idea.id != id);

        if state.ideas.len() == before {
            return Ok(false);
        }

        self.port.save_ideas(&state.ideas).await?;
        debug!(idea_id = %id, "Idea deleted");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Folder mutations
    // ------------------------------------------------------------------

    pub async fn create_folder(&self, name: impl Into<String>) -> Result<Folder> {
        let folder = Folder::new(name);

        let mut state = self.state.write().await;
        state.folders.push(folder.clone());
        self.port.save_folders(&state.folders).await?;

        debug!(folder_id = %folder.id, "Folder created");
        Ok(folder)
    }

    /// Delete a folder and, in the same logical transaction, reassign every
    /// idea referencing it to uncategorized. Both collections are updated
    /// under one write lock before any observer can read, so no idea ever
    /// references a non-existent folder. Unknown id is a no-op returning
    /// `false`.
    pub async fn delete_folder(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.folders.len();
        state.folders.retain(|folder| folder.id != id);

        if state.folders.len() == before {
            return Ok(false);
        }

        let mut reassigned = 0usize;
        for idea in state
            .ideas
            .iter_mut()
            .filter(|idea| idea.folder_id.as_deref() == Some(id))
        {
            idea.folder_id = None;
            idea.touch();
            reassigned += 1;
        }

        // Ideas are saved first: uncategorized ideas alongside a
        // still-existing folder is a consistent intermediate state if the
        // second save never lands, while the reverse leaves dangling
        // folder references on disk.
        self.port.save_ideas(&state.ideas).await?;
        self.port.save_folders(&state.folders).await?;

        info!(folder_id = %id, reassigned, "Folder deleted, ideas uncategorized");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Timeline mutations (these go through the same refresh-and-persist
    // path as idea updates so `last_modified` stays consistent)
    // ------------------------------------------------------------------

    /// Append a timeline entry to an idea. Unknown idea id is a no-op
    /// returning `None`.
    pub async fn add_update(
        &self,
        idea_id: &str,
        draft: UpdateDraft,
    ) -> Result<Option<IdeaUpdate>> {
        let mut entry = IdeaUpdate::new(draft.content, draft.kind);
        entry.attachments = draft.attachments;

        let mut state = self.state.write().await;
        let Some(idea) = state.ideas.iter_mut().find(|i| i.id == idea_id) else {
            return Ok(None);
        };

        idea.updates.push(entry.clone());
        idea.touch();
        self.port.save_ideas(&state.ideas).await?;

        Ok(Some(entry))
    }

    /// Edit a timeline entry in place. Unknown idea or update id is a
    /// no-op returning `None`.
    pub async fn edit_update(
        &self,
        idea_id: &str,
        update_id: &str,
        patch: UpdatePatch,
    ) -> Result<Option<IdeaUpdate>> {
        let mut state = self.state.write().await;
        let Some(idea) = state.ideas.iter_mut().find(|i| i.id == idea_id) else {
            return Ok(None);
        };
        let Some(entry) = idea.updates.iter_mut().find(|u| u.id == update_id) else {
            return Ok(None);
        };

        if let Some(content) = patch.content {
            entry.content = content;
        }
        if let Some(kind) = patch.kind {
            entry.kind = kind;
        }
        if let Some(attachments) = patch.attachments {
            entry.attachments = attachments;
        }

        let edited = entry.clone();
        idea.touch();
        self.port.save_ideas(&state.ideas).await?;

        Ok(Some(edited))
    }

    /// Remove a timeline entry by id. Unknown idea or update id is a no-op
    /// returning `None`; otherwise returns the idea after removal.
    pub async fn delete_update(&self, idea_id: &str, update_id: &str) -> Result<Option<Idea>> {
        let mut state = self.state.write().await;
        let Some(idea) = state.ideas.iter_mut().find(|i| i.id == idea_id) else {
            return Ok(None);
        };

        let before = idea.updates.len();
        idea.updates.retain(|u| u.id != update_id);
        if idea.updates.len() == before {
            return Ok(None);
        }

        idea.touch();
        let updated = idea.clone();
        self.port.save_ideas(&state.ideas).await?;

        Ok(Some(updated))
    }
}
