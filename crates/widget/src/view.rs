use adapter::LinkMetadata;
use domain::text::escape_html;
use domain::CommentId;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const EMPTY_PLACEHOLDER: &str = r#"<p class="comments-empty">No comments yet.</p>"#;
pub const ERROR_PLACEHOLDER: &str = r#"<p class="comments-error">Could not load comments.</p>"#;
pub const LOADING_PLACEHOLDER: &str = r#"<p class="comments-loading">Loading comments…</p>"#;

pub type SharedView = Arc<Mutex<CommentListView>>;

// Tagged with the render pass that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub generation: u64,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSlot {
    pub id: SlotId,
    pub url: String,
    pub image: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PreviewSlot {
    pub fn new(id: SlotId, url: String) -> Self {
        Self {
            id,
            url,
            image: None,
            title: None,
            description: None,
        }
    }

    pub fn patch(&mut self, meta: &LinkMetadata) {
        if let Some(image) = &meta.image {
            self.image = Some(image.clone());
        }
        if let Some(title) = &meta.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &meta.description {
            self.description = Some(description.clone());
        }
    }

    pub fn to_html(&self) -> String {
        let url = escape_html(&self.url);
        let image = match &self.image {
            Some(src) => format!(
                r#"<img class="comment-preview-image" src="{}" alt="" loading="lazy">"#,
                escape_html(src)
            ),
            None => r#"<img class="comment-preview-image" alt="" hidden>"#.to_string(),
        };
        let title = self.title.as_deref().map(escape_html).unwrap_or_else(|| url.clone());
        let description = self.description.as_deref().map(escape_html).unwrap_or_default();
        format!(
            concat!(
                r#"<div class="comment-preview" data-slot="{}-{}">"#,
                r#"<a class="comment-preview-link" href="{}" target="_blank" rel="noopener noreferrer">"#,
                "{}",
                r#"<span class="comment-preview-title">{}</span>"#,
                r#"<span class="comment-preview-description">{}</span>"#,
                "</a></div>"
            ),
            self.id.generation, self.id.index, url, image, title, description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedComment {
    pub id: CommentId,
    pub style: Option<String>,
    pub inner_html: String,
    pub preview: Option<PreviewSlot>,
    pub entrance: Option<String>,
}

impl RenderedComment {
    pub fn to_html(&self) -> String {
        let declarations: Vec<&str> = [self.style.as_deref(), self.entrance.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        let style = if declarations.is_empty() {
            String::new()
        } else {
            format!(r#" style="{}""#, escape_html(&declarations.join(" ")))
        };
        let preview = self.preview.as_ref().map(PreviewSlot::to_html).unwrap_or_default();
        format!(
            r#"<div class="comment-item" data-id="{}"{}>{}{}</div>"#,
            escape_html(self.id.as_str()),
            style,
            self.inner_html,
            preview
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Empty,
    Failed,
    Items(Vec<RenderedComment>),
}

#[derive(Debug)]
pub struct CommentListView {
    generation: u64,
    state: ListState,
    stylesheets: Vec<String>,
}

impl Default for CommentListView {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentListView {
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: ListState::Loading,
            stylesheets: Vec::new(),
        }
    }

    pub fn shared() -> SharedView {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn items(&self) -> &[RenderedComment] {
        match &self.state {
            ListState::Items(items) => items,
            _ => &[],
        }
    }

    pub fn show_items(&mut self, items: Vec<RenderedComment>) {
        self.state = if items.is_empty() {
            ListState::Empty
        } else {
            ListState::Items(items)
        };
    }

    pub fn show_error(&mut self) {
        self.next_generation();
        self.state = ListState::Failed;
    }

    pub fn add_stylesheet(&mut self, href: String) {
        self.stylesheets.push(href);
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn slot(&self, id: SlotId) -> Option<&PreviewSlot> {
        if id.generation != self.generation {
            return None;
        }
        self.items()
            .get(id.index)
            .and_then(|item| item.preview.as_ref())
            .filter(|slot| slot.id == id)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut PreviewSlot> {
        if id.generation != self.generation {
            return None;
        }
        match &mut self.state {
            ListState::Items(items) => items
                .get_mut(id.index)
                .and_then(|item| item.preview.as_mut())
                .filter(|slot| slot.id == id),
            _ => None,
        }
    }

    pub fn apply_preview(&mut self, id: SlotId, meta: &LinkMetadata) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.patch(meta);
                true
            }
            None => false,
        }
    }

    pub fn to_html(&self) -> String {
        match &self.state {
            ListState::Loading => LOADING_PLACEHOLDER.to_string(),
            ListState::Empty => EMPTY_PLACEHOLDER.to_string(),
            ListState::Failed => ERROR_PLACEHOLDER.to_string(),
            ListState::Items(items) => items.iter().map(RenderedComment::to_html).collect(),
        }
    }

    pub fn head_html(&self) -> String {
        self.stylesheets
            .iter()
            .map(|href| format!(r#"<link rel="stylesheet" href="{}">"#, escape_html(href)))
            .collect()
    }
}
