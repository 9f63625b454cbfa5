pub mod animation;
pub mod fonts;
pub mod gate;
pub mod preview;
pub mod render;
pub mod section;
pub mod verification;
pub mod view;

#[cfg(test)]
mod testing;

pub use animation::Stagger;
pub use fonts::FontLoader;
pub use gate::{AuthAffordance, AuthState, CapabilityGate, FormUi, GateView, PageAction, Transition};
pub use preview::PreviewFetcher;
pub use render::{PreviewRequest, RenderPipeline};
pub use section::{CommentForm, CommentSection, SubmitOutcome};
pub use verification::{VerificationConfig, VerificationGate};
pub use view::{CommentListView, ListState, SharedView};
