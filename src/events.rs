use super::*;

/// What a registered listener does when its event reaches it.
///
/// Listeners are plain values rather than closures: an effect listener names
/// the effect and finds its element through [`EventState::target`] at
/// dispatch time, so nothing about the binding site is captured.
#[derive(Debug, Clone)]
pub enum ListenerAction {
    /// Apply the effect to the element the event was dispatched at.
    ApplyToTarget(Effect),
    /// Apply every effect to every member of the installed collections.
    ApplyAll(ClickEffects),
}

/// Registered actions per `(node, event type)`, in registration order.
#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    by_node: HashMap<(NodeId, String), Vec<ListenerAction>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node: NodeId, event_type: &str, action: ListenerAction) {
        self.by_node
            .entry((node, event_type.to_string()))
            .or_default()
            .push(action);
    }

    fn registered(&self, node: NodeId, event_type: &str) -> &[ListenerAction] {
        self.by_node
            .get(&(node, event_type.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A copy, so listeners may register more listeners while running.
    pub(crate) fn snapshot(&self, node: NodeId, event_type: &str) -> Vec<ListenerAction> {
        self.registered(node, event_type).to_vec()
    }

    pub(crate) fn count(&self, node: NodeId, event_type: &str) -> usize {
        self.registered(node, event_type).len()
    }
}

/// An event in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventState {
    pub event_type: String,
    /// The element the event was dispatched at.
    pub target: NodeId,
    /// The node whose listeners are currently running.
    pub current_target: NodeId,
}

impl EventState {
    /// Target phase when the listener's node is the target itself.
    pub fn phase(&self) -> &'static str {
        if self.target == self.current_target {
            "target"
        } else {
            "bubble"
        }
    }
}
