use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Text,
    Drawing,
    Collage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
}

/// Nota armazenada no MongoDB (collection `notes`).
///
/// Stored with the same camelCase keys the API returns, so the document can be
/// handed to clients (and push payloads) without a second projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    /// Dono da nota
    pub user_id: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub content: String,
    pub color: Option<String>,
    /// URLs only, inline images are uploaded before the note is persisted
    pub images: Option<Vec<String>>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub text_decoration_line: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub bookmarked: bool,
    /// Chave de ordenação lógica enviada pelo cliente (epoch ms)
    pub timestamp: i64,
    pub music_track: Option<MusicTrack>,
    /// Atribuído pelo servidor (epoch ms)
    pub created_at: i64,
}

/// Note fields as sent by the client, before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<NoteType>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub images: Option<Vec<String>>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub text_decoration_line: Option<String>,
    pub pinned: Option<bool>,
    pub bookmarked: Option<bool>,
    pub timestamp: Option<i64>,
    pub music_track: Option<MusicTrack>,
}

/// Partial update. Only the `Some` fields end up in the `$set`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub note_type: Option<NoteType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmarked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_track: Option<MusicTrack>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.note_type.is_none()
            && self.content.is_none()
            && self.color.is_none()
            && self.images.is_none()
            && self.font_family.is_none()
            && self.font_weight.is_none()
            && self.font_style.is_none()
            && self.text_decoration_line.is_none()
            && self.pinned.is_none()
            && self.bookmarked.is_none()
            && self.timestamp.is_none()
            && self.music_track.is_none()
    }

    /// Merge into an in-memory note (used by stores without a native `$set`).
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(t) = self.note_type {
            note.note_type = t;
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(color) = &self.color {
            note.color = Some(color.clone());
        }
        if let Some(images) = &self.images {
            note.images = Some(images.clone());
        }
        if let Some(v) = &self.font_family {
            note.font_family = Some(v.clone());
        }
        if let Some(v) = &self.font_weight {
            note.font_weight = Some(v.clone());
        }
        if let Some(v) = &self.font_style {
            note.font_style = Some(v.clone());
        }
        if let Some(v) = &self.text_decoration_line {
            note.text_decoration_line = Some(v.clone());
        }
        if let Some(pinned) = self.pinned {
            note.pinned = pinned;
        }
        if let Some(bookmarked) = self.bookmarked {
            note.bookmarked = bookmarked;
        }
        if let Some(ts) = self.timestamp {
            note.timestamp = ts;
        }
        if let Some(track) = &self.music_track {
            note.music_track = Some(track.clone());
        }
    }
}

/// Compact snapshot of a note shown in the partner widget
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct WidgetNote {
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub content: String,
    pub timestamp: i64,
    pub color: Option<String>,
}

impl From<&Note> for WidgetNote {
    fn from(note: &Note) -> Self {
        WidgetNote {
            note_type: note.note_type,
            content: note.content.clone(),
            timestamp: note.timestamp,
            color: note.color.clone(),
        }
    }
}
