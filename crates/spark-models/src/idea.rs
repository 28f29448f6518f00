//! Idea model and its timeline of updates.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{new_id, now};

/// Media classification for an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Still images (image/*)
    Image,
    /// Video clips (video/*)
    Video,
    /// Anything else
    File,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Video => "video",
            AttachmentKind::File => "file",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "image" => Some(AttachmentKind::Image),
            "video" => Some(AttachmentKind::Video),
            "file" => Some(AttachmentKind::File),
            _ => None,
        }
    }

    /// Classify from a declared media type, e.g. "image/png" -> Image.
    pub fn from_media_type(media_type: &str) -> Self {
        if media_type.starts_with("image/") {
            AttachmentKind::Image
        } else if media_type.starts_with("video/") {
            AttachmentKind::Video
        } else {
            AttachmentKind::File
        }
    }

    /// Classify from the file name when no media type was declared.
    pub fn from_file_name(name: &str) -> Self {
        let guess = mime_guess::from_path(name).first_or_octet_stream();
        Self::from_media_type(guess.essence_str())
    }
}

impl Default for AttachmentKind {
    fn default() -> Self {
        AttachmentKind::File
    }
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An embedded media/file blob owned by one Idea or Update.
///
/// `content` is a base64 data URL, so a saved collection is fully
/// self-contained: no reference to an external file survives a save.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Attachment {
    pub id: String,
    pub kind: AttachmentKind,
    pub content: String,
    pub name: String,
}

impl Attachment {
    /// Encode raw file bytes into a self-contained attachment record.
    ///
    /// The kind is classified from the declared media type when present,
    /// otherwise guessed from the file name.
    pub fn encode(name: &str, media_type: Option<&str>, bytes: &[u8]) -> Self {
        let media_type = media_type
            .map(String::from)
            .unwrap_or_else(|| mime_guess::from_path(name).first_or_octet_stream().to_string());
        let kind = AttachmentKind::from_media_type(&media_type);
        let content = format!("data:{};base64,{}", media_type, BASE64.encode(bytes));

        Self {
            id: new_id(),
            kind,
            content,
            name: name.to_string(),
        }
    }
}

/// Kind of timeline entry on an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Regular progress note
    Update,
    /// A milestone reached
    Milestone,
    /// A change of direction
    Pivot,
}

impl UpdateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateKind::Update => "update",
            UpdateKind::Milestone => "milestone",
            UpdateKind::Pivot => "pivot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "update" => Some(UpdateKind::Update),
            "milestone" => Some(UpdateKind::Milestone),
            "pivot" => Some(UpdateKind::Pivot),
            _ => None,
        }
    }
}

impl Default for UpdateKind {
    fn default() -> Self {
        UpdateKind::Update
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    Active,
    Completed,
    Archived,
}

impl IdeaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaStatus::Active => "active",
            IdeaStatus::Completed => "completed",
            IdeaStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(IdeaStatus::Active),
            "completed" => Some(IdeaStatus::Completed),
            "archived" => Some(IdeaStatus::Archived),
            _ => None,
        }
    }

    pub fn all() -> &'static [IdeaStatus] {
        &[IdeaStatus::Active, IdeaStatus::Completed, IdeaStatus::Archived]
    }
}

impl Default for IdeaStatus {
    fn default() -> Self {
        IdeaStatus::Active
    }
}

impl std::fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A timestamped timeline entry on an idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IdeaUpdate {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub kind: UpdateKind,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl IdeaUpdate {
    /// Create a new timeline entry with a generated id and current timestamp.
    pub fn new(content: impl Into<String>, kind: UpdateKind) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
            timestamp: now(),
            kind,
            attachments: Vec::new(),
        }
    }
}

/// A single journaled idea, the primary entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Idea {
    pub id: String,
    pub title: String,
    pub content: String,
    /// AI-populated tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Timeline entries in insertion (append) order. Newest-first day
    /// grouping is a derived view, not the stored order.
    #[serde(default)]
    pub updates: Vec<IdeaUpdate>,
    #[serde(default)]
    pub status: IdeaStatus,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Owning folder, or None for "uncategorized". A dangling reference
    /// degrades to uncategorized, never an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl Idea {
    /// Create a new idea with generated id and matching timestamps.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            updates: Vec::new(),
            status: IdeaStatus::Active,
            created_at: now,
            last_modified: now,
            attachments: Vec::new(),
            folder_id: None,
        }
    }

    /// Refresh `last_modified`. Called on every mutation to the idea or
    /// any of its updates.
    pub fn touch(&mut self) {
        self.last_modified = now();
    }
}

/// Request model for creating an idea.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IdeaDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub folder_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Request model for patching an idea.
///
/// Tags are deliberately absent: they are AI-populated via the suggestion
/// flow and not manually edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<IdeaStatus>,
    /// Move the idea into this folder.
    pub folder_id: Option<String>,
    /// Clear the folder assignment (wins over `folder_id`).
    #[serde(default)]
    pub uncategorize: bool,
    /// Replace the attachment set. Draft-side removals only take effect
    /// here, when the containing save commits.
    pub attachments: Option<Vec<Attachment>>,
}

/// Request model for appending a timeline entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateDraft {
    pub content: String,
    #[serde(default)]
    pub kind: UpdateKind,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Request model for editing a timeline entry in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdatePatch {
    pub content: Option<String>,
    pub kind: Option<UpdateKind>,
    pub attachments: Option<Vec<Attachment>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_media_type() {
        assert_eq!(
            AttachmentKind::from_media_type("image/png"),
            AttachmentKind::Image
        );
        assert_eq!(
            AttachmentKind::from_media_type("video/mp4"),
            AttachmentKind::Video
        );
        assert_eq!(
            AttachmentKind::from_media_type("application/pdf"),
            AttachmentKind::File
        );
        assert_eq!(
            AttachmentKind::from_media_type("text/plain"),
            AttachmentKind::File
        );
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(
            AttachmentKind::from_file_name("diagram.png"),
            AttachmentKind::Image
        );
        assert_eq!(
            AttachmentKind::from_file_name("demo.mp4"),
            AttachmentKind::Video
        );
        assert_eq!(
            AttachmentKind::from_file_name("notes.pdf"),
            AttachmentKind::File
        );
        assert_eq!(
            AttachmentKind::from_file_name("no-extension"),
            AttachmentKind::File
        );
    }

    #[test]
    fn test_attachment_encode() {
        let attachment = Attachment::encode("pixel.png", Some("image/png"), &[1, 2, 3]);

        assert_eq!(attachment.kind, AttachmentKind::Image);
        assert_eq!(attachment.name, "pixel.png");
        assert!(attachment.content.starts_with("data:image/png;base64,"));
        // Content is self-contained text, embeddable in persisted JSON.
        assert!(attachment.content.ends_with("AQID"));
    }

    #[test]
    fn test_attachment_encode_guesses_media_type() {
        let attachment = Attachment::encode("clip.mp4", None, b"x");
        assert_eq!(attachment.kind, AttachmentKind::Video);
        assert!(attachment.content.starts_with("data:video/mp4;base64,"));
    }

    #[test]
    fn test_new_idea_timestamps() {
        let idea = Idea::new("Title", "Content");
        assert_eq!(idea.created_at, idea.last_modified);
        assert_eq!(idea.status, IdeaStatus::Active);
        assert!(idea.folder_id.is_none());
        assert!(!idea.id.is_empty());
    }

    #[test]
    fn test_touch_advances_last_modified() {
        let mut idea = Idea::new("Title", "Content");
        let before = idea.last_modified;
        idea.touch();
        assert!(idea.last_modified >= before);
        assert!(idea.created_at <= idea.last_modified);
    }

    #[test]
    fn test_idea_round_trip() {
        let mut idea = Idea::new("Round trip", "body");
        idea.tags = vec!["rust".to_string()];
        idea.updates.push(IdeaUpdate::new("first", UpdateKind::Update));
        idea.updates.push(IdeaUpdate::new("second", UpdateKind::Milestone));

        let json = serde_json::to_string(&idea).unwrap();
        let back: Idea = serde_json::from_str(&json).unwrap();

        assert_eq!(back, idea);
        // Insertion order of updates survives the round trip.
        assert_eq!(back.updates[0].content, "first");
        assert_eq!(back.updates[1].content, "second");
    }
}
