// ── View-state synchronization ──
//
// Every panel folds backend push events into its own state the same
// way: decode the wire event into a `PanelEvent`, hand it to the panel's
// `Reducer`, then carry out the returned effects (notify the user, emit
// a follow-up command). Keyed result sets and monotonic progress are the
// shared building blocks.

pub mod decode;
mod keyed;
mod progress;

use serde_json::Value;

use crate::model::Notification;

pub use decode::{Inbound, decode};
pub use keyed::{Keyed, KeyedSet};
pub use progress::Progress;

/// Session lifecycle as the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// One inbound event, in the shape every panel understands.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent<T> {
    /// Session lifecycle transition. `target` names the profile or host
    /// the status is about, when the backend says.
    Status {
        state: SessionStatus,
        message: Option<String>,
        target: Option<String>,
    },
    /// Progress percentage for a long-running operation.
    Progress(f64),
    /// A single discovered or listed record, upserted by key.
    Item(T),
    /// Wholesale replacement of the result set.
    Listing { items: Vec<T>, total: usize },
    Complete { message: Option<String> },
    Stopped { message: Option<String> },
    /// Domain error. Ends the operation; keeps partial results.
    Error {
        message: String,
        target: Option<String>,
    },
    /// Informational message that changes no state by itself.
    Notice {
        message: String,
        target: Option<String>,
    },
    /// Back to the initial empty form.
    Reset,
}

/// An outbound push-channel message a reducer wants sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Emit {
    pub event: &'static str,
    pub payload: Value,
}

/// Side effect requested by a reducer. Reducers stay pure; the dashboard
/// performs these after the state has been published.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notification),
    Emit(Emit),
}

/// Folds [`PanelEvent`]s into a panel's view state.
pub trait Reducer {
    type Item;

    /// Apply one event. Must be called in arrival order.
    fn apply(&mut self, event: PanelEvent<Self::Item>) -> Vec<Effect>;

    /// The push channel dropped: end live sessions and in-progress
    /// operations. Panels decide what results survive.
    fn transport_lost(&mut self);
}
