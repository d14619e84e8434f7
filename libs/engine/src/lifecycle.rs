//! Lifecycle rules: how one event moves a room between Waiting, Playing and Ended.

use serde_json::Value;

use crate::session::LifecycleState;

pub const ROOM_DELETED: &str = "room-deleted";
pub const GAME_ROOM_UPDATED: &str = "game-room-updated";
pub const GAME_ENDED: &str = "game-ended";

/// How a rule compares against an event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Exact(&'static str),
    Contains(&'static str),
}

impl NameMatch {
    pub fn matches(self, event_name: &str) -> bool {
        match self {
            NameMatch::Exact(name) => event_name == name,
            NameMatch::Contains(needle) => event_name.contains(needle),
        }
    }
}

/// One `(pattern, resulting state)` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleRule {
    pub pattern: NameMatch,
    pub target: LifecycleState,
}

const fn rule(pattern: NameMatch, target: LifecycleState) -> LifecycleRule {
    LifecycleRule { pattern, target }
}

/// Ordered lifecycle table; the first matching row wins.
pub const LIFECYCLE_RULES: &[LifecycleRule] = &[
    rule(NameMatch::Contains("game-started"), LifecycleState::Playing),
    rule(NameMatch::Contains("dice-rolled"), LifecycleState::Playing),
    rule(NameMatch::Contains("trade"), LifecycleState::Playing),
    rule(NameMatch::Contains("purchase"), LifecycleState::Playing),
    rule(NameMatch::Contains("auction"), LifecycleState::Playing),
    rule(NameMatch::Exact(GAME_ENDED), LifecycleState::Ended),
];

/// What the rules decided for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No rule applies, or the matched state is already current.
    Unchanged,
    /// The room announced its deletion; offer the consumer a removal control.
    OfferRemoval,
    /// The room switched maps.
    UpdateMap(String),
    /// The room moved to a new lifecycle state.
    Enter(LifecycleState),
    /// A rule matched but the room has already ended. Ended is terminal.
    IgnoredAfterEnded(LifecycleState),
}

/// Result of evaluating the rules against the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub next: LifecycleState,
    pub outcome: Outcome,
}

impl Decision {
    fn stay(current: LifecycleState, outcome: Outcome) -> Self {
        Self {
            next: current,
            outcome,
        }
    }
}

/// Evaluate the rules for one event. Pure; touches no session.
pub fn evaluate(current: LifecycleState, event_name: &str, payload: Option<&Value>) -> Decision {
    if event_name == ROOM_DELETED {
        return Decision::stay(current, Outcome::OfferRemoval);
    }

    if event_name == GAME_ROOM_UPDATED {
        if let Some(map_id) = updated_map_id(payload) {
            return Decision::stay(current, Outcome::UpdateMap(map_id.to_string()));
        }
    }

    let Some(rule) = LIFECYCLE_RULES.iter().find(|r| r.pattern.matches(event_name)) else {
        return Decision::stay(current, Outcome::Unchanged);
    };

    match (current, rule.target) {
        (from, to) if from == to => Decision::stay(current, Outcome::Unchanged),
        (LifecycleState::Ended, to) => Decision::stay(current, Outcome::IgnoredAfterEnded(to)),
        (_, to) => Decision {
            next: to,
            outcome: Outcome::Enter(to),
        },
    }
}

/// `payload.map.id` when it is a non-empty string.
fn updated_map_id(payload: Option<&Value>) -> Option<&str> {
    payload?
        .get("map")?
        .get("id")?
        .as_str()
        .filter(|id| !id.is_empty())
}
