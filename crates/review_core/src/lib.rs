//! Review-session core: folder sessions, cursor navigation, the
//! fetch-and-render pipeline, and input dispatch.

pub mod coordinator;
pub mod dispatcher;
pub mod display;
pub mod navigation;
pub mod runtime;
pub mod session;

pub use coordinator::{
    Controls, Effect, RequestToken, ReviewErrorKind, ReviewEvent, ReviewView, Reviewer,
};
pub use dispatcher::{intent_for_key, Focus, Intent, Key};
pub use display::{DisplaySurface, RenderError, RenderStyle};
pub use navigation::{advance_index, previous_index, resume_index, Advance, Back};
pub use runtime::ReviewRuntime;
pub use session::{FolderSession, Progress, SessionError, SessionManager};
