use tracing::{debug, info, warn};

use super::session::{ClientEvent, Envelope, GameSession, Notification, SessionPhase};
use super::{Mark, Outcome, Rejection, Slot};

pub type ConnectionId = u64;

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("endpoint is closed")]
pub struct EndpointClosed;

/// Remote side of a connection as seen by the registry.
/// Dropping an endpoint disconnects it.
#[cfg_attr(test, mockall::automock)]
pub trait Endpoint {
    fn notify(&self, notification: Notification) -> Result<(), EndpointClosed>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotAssignment {
    pub slot: Slot,
    pub mark: Mark,
}

impl From<Slot> for SlotAssignment {
    fn from(slot: Slot) -> Self {
        Self {
            slot,
            mark: slot.mark(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegistryPhase {
    Empty,
    AwaitingSecondPlayer,
    InProgress,
}

#[derive(Debug)]
struct Seat<E> {
    id: ConnectionId,
    endpoint: E,
}

/// Admits endpoints into the single game session and routes their events.
#[derive(Debug)]
pub struct SessionRegistry<E> {
    seats: [Option<Seat<E>>; 2],
    session: Option<GameSession>,
}

impl<E> Default for SessionRegistry<E> {
    fn default() -> Self {
        Self {
            seats: [None, None],
            session: None,
        }
    }
}

fn seat_index(slot: Slot) -> usize {
    match slot {
        Slot::First => 0,
        Slot::Second => 1,
    }
}

fn seat_slot(index: usize) -> Slot {
    if index == 0 {
        Slot::First
    } else {
        Slot::Second
    }
}

impl<E> SessionRegistry<E> {
    pub fn phase(&self) -> RegistryPhase {
        match (&self.session, &self.seats[0]) {
            (Some(_), _) => RegistryPhase::InProgress,
            (None, Some(_)) => RegistryPhase::AwaitingSecondPlayer,
            (None, None) => RegistryPhase::Empty,
        }
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Slot occupied by connection `id`.
    pub fn slot_of(&self, id: ConnectionId) -> Option<Slot> {
        self.seats
            .iter()
            .position(|seat| matches!(seat, Some(seat) if seat.id == id))
            .map(seat_slot)
    }

    fn release(&mut self, slot: Slot) -> Option<E> {
        self.seats[seat_index(slot)].take().map(|seat| seat.endpoint)
    }
}

impl<E: Endpoint> SessionRegistry<E> {
    /// Puts the endpoint into the first free slot, the game starts as soon as both are filled.
    pub fn connect(
        &mut self,
        id: ConnectionId,
        endpoint: E,
    ) -> Result<SlotAssignment, Rejection> {
        let rejection = if self.slot_of(id).is_some() {
            Some(Rejection::AlreadyConnected(id))
        } else if self.seats.iter().all(Option::is_some) {
            Some(Rejection::SessionFull)
        } else {
            None
        };
        if let Some(rejection) = rejection {
            info!(connection = id, %rejection, "connection rejected");
            let reject = Notification::Reject {
                reason: rejection.to_string(),
            };
            if let Err(err) = endpoint.notify(reject) {
                debug!(connection = id, "failed to send rejection: {}", err);
            }
            return Err(rejection);
        }

        let index = self
            .seats
            .iter()
            .position(Option::is_none)
            .ok_or(Rejection::SessionFull)?;
        let slot = seat_slot(index);
        self.seats[index] = Some(Seat { id, endpoint });
        info!(connection = id, %slot, "player joined");

        if slot == Slot::Second {
            let session = GameSession::new();
            let envelopes = session.start();
            self.session = Some(session);
            info!("game started");
            self.dispatch(envelopes);
        }
        Ok(slot.into())
    }

    /// Routes `event` from connection `id` into the live session.
    pub fn handle(&mut self, id: ConnectionId, event: ClientEvent) {
        let Some(slot) = self.slot_of(id) else {
            debug!(connection = id, ?event, "event from a connection without slot");
            return;
        };
        debug!(connection = id, %slot, ?event, "handling event");

        let Some(session) = self.session.as_mut() else {
            self.handle_before_start(slot, event);
            return;
        };
        let envelopes = session.handle(slot, event);
        let phase = session.phase();
        self.dispatch(envelopes);
        if let SessionPhase::Terminated(outcome) = phase {
            self.finish(outcome);
        }
    }

    fn handle_before_start(&mut self, slot: Slot, event: ClientEvent) {
        match event {
            ClientEvent::TurnTaken { .. } => self.dispatch(vec![Envelope::to_slot(
                slot,
                Notification::MoveRejected {
                    reason: "game has not started".to_string(),
                },
            )]),
            ClientEvent::TurnError { .. } | ClientEvent::Resign | ClientEvent::Disconnect => {
                info!(%slot, "player left before the game started");
                drop(self.release(slot));
            }
        }
    }

    /// Announces `outcome`, disconnects both endpoints and frees the slots.
    fn finish(&mut self, outcome: Outcome) {
        info!(%outcome, "game over");
        self.dispatch(vec![Envelope::to_both(Notification::GameOver { outcome })]);
        self.session = None;
        for slot in [Slot::First, Slot::Second] {
            drop(self.release(slot));
        }
    }

    fn dispatch(&self, envelopes: Vec<Envelope>) {
        for Envelope { to, notification } in envelopes {
            for slot in [Slot::First, Slot::Second] {
                if !to.includes(slot) {
                    continue;
                }
                let Some(seat) = &self.seats[seat_index(slot)] else {
                    continue;
                };
                if let Err(err) = seat.endpoint.notify(notification.clone()) {
                    warn!(connection = seat.id, %slot, "failed to notify: {}", err);
                }
            }
        }
    }
}
