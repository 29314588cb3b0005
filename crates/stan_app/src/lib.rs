use crux_core::macros::effect;
use crux_core::render::RenderOperation;
pub use crux_core::Core;
pub use labware;

use crate::effects::clipboard::ClipboardOperation;
use crate::effects::session_storage::SessionStorageOperation;
use crate::effects::stan_core::StanCoreOperation;

pub mod effects;
pub mod entities;
pub mod entity_manager;
pub mod form;
pub mod graphql;
pub mod labware_scan;
pub mod mutations;
pub mod planner;
pub mod validation;

#[cfg(test)]
mod testing;

/// Every machine shares the same effects, so a single shell can drive any of them.
#[effect]
pub enum Effect {
    Render(RenderOperation),
    StanCore(StanCoreOperation),
    SessionStorage(SessionStorageOperation),
    Clipboard(ClipboardOperation),
}

/// The last event a machine rejected, and when; shown to the user until the next accepted event.
pub type RejectedEvent = (chrono::DateTime<chrono::Utc>, String);

pub(crate) fn rejected_event(error: &impl std::fmt::Display) -> RejectedEvent {
    (chrono::Utc::now(), error.to_string())
}
