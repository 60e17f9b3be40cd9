use comms::event::{Event, Participant};
use tokio::sync::mpsc;

#[derive(Debug)]
struct Member {
    participant: Participant,
    outbox: mpsc::UnboundedSender<Event>,
}

/// [ParticipantRegistry] keeps the members of a room in the order they joined,
/// alongside the channel each member's connection reads its events from.
///
/// Members are keyed by connection id, the same username may appear more than once.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    members: Vec<Member>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        ParticipantRegistry {
            members: Vec::new(),
        }
    }

    /// Add a connection to the room, returns false if the connection was already a member
    pub fn insert(&mut self, participant: Participant, outbox: mpsc::UnboundedSender<Event>) -> bool {
        if self.contains(&participant.socket_id) {
            return false;
        }

        self.members.push(Member {
            participant,
            outbox,
        });

        true
    }

    /// Removes the member with the given connection id, returns the removed participant
    /// Does nothing and returns None if the connection is not a member
    pub fn remove(&mut self, socket_id: &str) -> Option<Participant> {
        let idx = self
            .members
            .iter()
            .position(|member| member.participant.socket_id == socket_id)?;

        Some(self.members.remove(idx).participant)
    }

    pub fn contains(&self, socket_id: &str) -> bool {
        self.members
            .iter()
            .any(|member| member.participant.socket_id == socket_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Snapshot of the members in join order
    pub fn participants(&self) -> Vec<Participant> {
        self.members
            .iter()
            .map(|member| member.participant.clone())
            .collect()
    }

    /// Deliver an event to a single member. Returns false if there is no such member
    pub fn send_to(&self, socket_id: &str, event: Event) -> bool {
        match self
            .members
            .iter()
            .find(|member| member.participant.socket_id == socket_id)
        {
            // a closed outbox means the connection is on its way out, it will leave shortly
            Some(member) => member.outbox.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver an event to every member, except the one with `except` connection id if given
    pub fn send_to_all(&self, event: &Event, except: Option<&str>) {
        for member in self.members.iter() {
            if except.is_some_and(|socket_id| socket_id == member.participant.socket_id) {
                continue;
            }

            let _ = member.outbox.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(socket_id: &str, username: &str) -> Participant {
        Participant {
            socket_id: socket_id.into(),
            username: username.into(),
        }
    }

    #[test]
    fn keeps_join_order_and_rejects_duplicate_connections() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut registry = ParticipantRegistry::new();

        assert!(registry.insert(participant("s1", "ada"), tx.clone()));
        assert!(registry.insert(participant("s2", "ada"), tx.clone()));
        assert!(!registry.insert(participant("s1", "ada"), tx));

        assert_eq!(
            registry.participants(),
            vec![participant("s1", "ada"), participant("s2", "ada")]
        );
    }

    #[test]
    fn remove_only_touches_the_matching_connection() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut registry = ParticipantRegistry::new();
        registry.insert(participant("s1", "ada"), tx.clone());
        registry.insert(participant("s2", "grace"), tx);

        assert_eq!(registry.remove("s3"), None);
        assert_eq!(registry.remove("s1"), Some(participant("s1", "ada")));
        assert_eq!(registry.participants(), vec![participant("s2", "grace")]);
        assert!(!registry.is_empty());
    }

    #[test]
    fn send_to_all_skips_the_excluded_connection() {
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let mut registry = ParticipantRegistry::new();
        registry.insert(participant("s1", "ada"), tx1);
        registry.insert(participant("s2", "grace"), tx2);

        let event = Event::CodeChange(comms::event::CodeChangeEvent {
            code: Some("x".into()),
        });
        registry.send_to_all(&event, Some("s1"));

        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), event);
    }
}
