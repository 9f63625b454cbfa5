use domain::text::{escape_html, first_url, linkify, ContrastText};
use domain::{Comment, CommentStyle, DisplayClock};
use tracing::debug;

use crate::animation::Stagger;
use crate::fonts::FontLoader;
use crate::view::{CommentListView, PreviewSlot, RenderedComment, SlotId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub slot: SlotId,
    pub url: String,
}

// Owns the per-page font cache.
#[derive(Debug)]
pub struct RenderPipeline {
    clock: DisplayClock,
    fonts: FontLoader,
    stagger: Option<Stagger>,
}

impl RenderPipeline {
    pub fn new(clock: DisplayClock) -> Self {
        Self {
            clock,
            fonts: FontLoader::new(),
            stagger: None,
        }
    }

    pub fn with_animation(mut self, stagger: Option<Stagger>) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn fonts(&self) -> &FontLoader {
        &self.fonts
    }

    pub fn render(&mut self, view: &mut CommentListView, comments: &[Comment]) -> Vec<PreviewRequest> {
        let generation = view.next_generation();

        let mut ordered: Vec<&Comment> = comments.iter().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut items = Vec::with_capacity(ordered.len());
        let mut requests = Vec::new();

        for comment in ordered {
            let Some(body) = comment.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) else {
                debug!("Skipping comment {} with empty body", comment.id);
                continue;
            };

            let index = items.len();
            let style = comment.style();
            let preview = first_url(body).map(|url| {
                let slot = SlotId { generation, index };
                requests.push(PreviewRequest {
                    slot,
                    url: url.clone(),
                });
                PreviewSlot::new(slot, url)
            });

            items.push(RenderedComment {
                id: comment.id.clone(),
                style: self.style_declarations(&style, view),
                inner_html: self.inner_html(comment, body),
                preview,
                entrance: None,
            });
        }

        if let Some(stagger) = self.stagger {
            for (i, item) in items.iter_mut().enumerate() {
                item.entrance = Some(stagger.declaration(i));
            }
        }

        view.show_items(items);
        requests
    }

    fn inner_html(&self, comment: &Comment, body: &str) -> String {
        format!(
            concat!(
                r#"<strong class="comment-author">{}</strong> "#,
                r#"<span class="comment-date">{}</span> "#,
                r#"<span class="comment-time">{}</span>"#,
                r#"<p class="comment-body">{}</p>"#
            ),
            escape_html(comment.author_display()),
            escape_html(&self.clock.long_date(&comment.created_at)),
            escape_html(&self.clock.time_12h(&comment.created_at)),
            linkify(body)
        )
    }

    fn style_declarations(&mut self, style: &CommentStyle, view: &mut CommentListView) -> Option<String> {
        let mut css = String::new();
        if let Some(color) = &style.background_color {
            css.push_str(&format!(
                "background-color: {}; color: {};",
                color,
                ContrastText::for_background(color.as_str()).css()
            ));
        }
        if let Some(font) = style.font_family {
            if let Some(href) = self.fonts.ensure(font) {
                view.add_stylesheet(href);
            }
            if !css.is_empty() {
                css.push(' ');
            }
            css.push_str(&format!("font-family: {};", font.css_stack()));
        }
        (!css.is_empty()).then_some(css)
    }
}
