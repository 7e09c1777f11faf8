use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::{
    properties::{Pid, Vid},
    redirect::UnresolvedEntity,
};

/// Whether a displayed pathway is the focus pathway or one of the context pathways composed
/// around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathwayRole {
    Focus,
    Context,
}

/// Notifications emitted by [crate::compose::PathwayComposer] to whoever renders the composed
/// view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewEvent {
    /// New focus VRep, or `None` when the focus was cleared
    FocusChanged(Option<Vid>),
    /// Displayed pathway, its role, and the full pathway it was bounded from (if bounded)
    PathwayAdded(Pid, PathwayRole, Option<Pid>),
    /// The focus was absent from this pathway, so it is shown unfiltered
    CouldNotFocus(Pid),
    PathwayRemoved(Pid),
    /// Node count, NodeEdge count, edges skipped for lack of a node
    CompositionCompleted(usize, usize, Vec<UnresolvedEntity>),
    /// The composition pass failed and nothing was committed
    PassAborted(String),
}

impl ViewEvent {
    /// The pathway this event concerns, if any.
    pub fn pathway(&self) -> Option<Pid> {
        match self {
            ViewEvent::PathwayAdded(pid, _, _) => Some(*pid),
            ViewEvent::CouldNotFocus(pid) => Some(*pid),
            ViewEvent::PathwayRemoved(pid) => Some(*pid),
            ViewEvent::FocusChanged(_)
            | ViewEvent::CompositionCompleted(_, _, _)
            | ViewEvent::PassAborted(_) => None,
        }
    }
}

impl Display for ViewEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ViewEvent::FocusChanged(_) => write!(f, "FocusChanged"),
            ViewEvent::PathwayAdded(_, _, _) => write!(f, "PathwayAdded"),
            ViewEvent::CouldNotFocus(_) => write!(f, "CouldNotFocus"),
            ViewEvent::PathwayRemoved(_) => write!(f, "PathwayRemoved"),
            ViewEvent::CompositionCompleted(_, _, _) => write!(f, "CompositionCompleted"),
            ViewEvent::PassAborted(_) => write!(f, "PassAborted"),
        }
    }
}
