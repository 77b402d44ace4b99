//! Event-driven triggered abilities: events, filters, and the APNAP router.

pub mod event;
pub mod filter;
pub mod router;

pub use event::{TriggerEvent, TriggerKind};
pub use filter::TriggerFilter;
pub use router::{route, scan, TriggeredAbility};
