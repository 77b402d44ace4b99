//! Trigger applicability predicates.
//!
//! Beyond the event kind, each ability declares a filter narrowing which
//! events it actually fires on. Filters are data, so catalog definitions
//! stay serializable and the engine stays free of per-card code.

use serde::{Deserialize, Serialize};

use crate::core::object::ObjectId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;

use super::event::TriggerEvent;

/// A predicate over (ability source, controller, event).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerFilter {
    /// Always fires.
    Always,

    /// The event's object is the ability's own source.
    SelfSource,

    /// The event's player is the ability's controller.
    OwnController,

    /// The event's player is an opponent of the ability's controller.
    Opponents,

    /// The event happened at the source's own location.
    AtSourceLocation,

    /// All sub-filters must accept.
    All(Vec<TriggerFilter>),

    /// Any sub-filter may accept.
    Any(Vec<TriggerFilter>),

    /// The sub-filter must reject.
    Not(Box<TriggerFilter>),
}

impl TriggerFilter {
    /// Evaluate this filter.
    #[must_use]
    pub fn matches(
        &self,
        state: &GameState,
        source: ObjectId,
        controller: PlayerId,
        event: &TriggerEvent,
    ) -> bool {
        match self {
            Self::Always => true,
            Self::SelfSource => event.object() == Some(source),
            Self::OwnController => event.player() == Some(controller),
            Self::Opponents => matches!(event.player(), Some(p) if p != controller),
            Self::AtSourceLocation => {
                let source_location = state
                    .object(source)
                    .ok()
                    .and_then(|object| object.location());
                source_location.is_some() && event.location() == source_location
            }
            Self::All(filters) => filters
                .iter()
                .all(|f| f.matches(state, source, controller, event)),
            Self::Any(filters) => filters
                .iter()
                .any(|f| f.matches(state, source, controller, event)),
            Self::Not(filter) => !filter.matches(state, source, controller, event),
        }
    }

    /// Combine with another filter under AND.
    #[must_use]
    pub fn and(self, other: TriggerFilter) -> Self {
        match self {
            Self::All(mut filters) => {
                filters.push(other);
                Self::All(filters)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Negate this filter.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}
