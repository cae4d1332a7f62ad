//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use cast_core::{ActorId, Notification, Notifier};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, strum::Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Cast lifecycle and combat results
    Cast,
    /// Skills becoming available again
    Cooldown,
    /// Companion actions and owner collection changes
    Companion,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Cast, Topic::Cooldown, Topic::Companion];

    /// Topic a notification is published on.
    pub fn of(notification: &Notification) -> Self {
        match notification {
            Notification::SkillAvailable { .. } => Topic::Cooldown,
            Notification::CompanionCast { .. } | Notification::CompanionsChanged { .. } => {
                Topic::Companion
            }
            _ => Topic::Cast,
        }
    }
}

/// A notification addressed to one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub recipient: ActorId,
    pub notification: Notification,
}

impl Event {
    pub fn topic(&self) -> Topic {
        Topic::of(&self.notification)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created up front and never change,
/// so publishing takes no lock.
#[derive(Clone)]
pub struct EventBus {
    cast: broadcast::Sender<Event>,
    cooldown: broadcast::Sender<Event>,
    companion: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            cast: broadcast::channel(capacity).0,
            cooldown: broadcast::channel(capacity).0,
            companion: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Cast => &self.cast,
            Topic::Cooldown => &self.cooldown,
            Topic::Companion => &self.companion,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Exposes the bus as the rules' notification sink.
#[derive(Clone)]
pub struct BusNotifier {
    bus: Arc<EventBus>,
}

impl BusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl Notifier for BusNotifier {
    fn notify(&self, recipient: ActorId, notification: Notification) {
        tracing::trace!(%recipient, event = notification.label(), "notify");
        self.bus.publish(Event {
            recipient,
            notification,
        });
    }
}

#[cfg(test)]
mod tests {
    use cast_core::{SkillFamilyId, SkillRef};

    use super::*;

    #[test]
    fn events_route_by_topic() {
        let bus = Arc::new(EventBus::with_capacity(8));
        let mut cast = bus.subscribe(Topic::Cast);
        let mut cooldown = bus.subscribe(Topic::Cooldown);
        let notifier = BusNotifier::new(Arc::clone(&bus));

        notifier.notify(
            ActorId(1),
            Notification::SkillAvailable {
                actor: ActorId(1),
                family: SkillFamilyId(7),
            },
        );
        notifier.notify(
            ActorId(1),
            Notification::CastCompleted {
                caster: ActorId(1),
                skill: SkillRef::new(7, 1),
            },
        );

        assert_eq!(cooldown.try_recv().unwrap().topic(), Topic::Cooldown);
        assert!(cooldown.try_recv().is_err());
        assert_eq!(cast.try_recv().unwrap().topic(), Topic::Cast);
    }

    #[test]
    fn events_encode_as_tagged_json() {
        let event = Event {
            recipient: ActorId(1),
            notification: Notification::SkillAvailable {
                actor: ActorId(1),
                family: SkillFamilyId(7),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "recipient": 1,
                "notification": { "type": "skill_available", "actor": 1, "family": 7 }
            })
        );
        assert_eq!(serde_json::to_value(Topic::Cooldown).unwrap(), "cooldown");
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event {
            recipient: ActorId(1),
            notification: Notification::CompanionsChanged { owner: ActorId(1) },
        });
        assert_eq!(Topic::ALL.len(), 3);
    }
}
