//! Room actor implementation with async message handling.

use tokio::sync::{mpsc, oneshot};

use super::{
    RoomId, UserId,
    config::RoomConfig,
    errors::RoomError,
    messages::{
        RoomMessage, RoomNotification, RoomResponse, RoomStateResponse, Seats, SubscriberId,
        Subscription,
    },
};
use crate::game::{Column, DropOutcome, MatchSnapshot, TurnAuthority};

/// Inbox depth per room
pub const INBOX_CAPACITY: usize = 100;

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    /// Create a new room handle
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// True once the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> Result<(), RoomError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RoomError::Closed(self.room_id))
    }

    /// Send a request and wait for the actor's reply
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
    ) -> Result<T, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| RoomError::NoResponse(self.room_id))
    }

    pub async fn join(&self, user_id: UserId) -> Result<RoomResponse, RoomError> {
        self.request(|response| RoomMessage::Join { user_id, response })
            .await
    }

    pub async fn leave(&self, user_id: UserId) -> Result<RoomResponse, RoomError> {
        self.request(|response| RoomMessage::Leave { user_id, response })
            .await
    }

    pub async fn drop_piece(
        &self,
        user_id: UserId,
        column: Column,
    ) -> Result<RoomResponse, RoomError> {
        self.request(|response| RoomMessage::Drop {
            user_id,
            column,
            response,
        })
        .await
    }

    pub async fn rematch(&self, user_id: UserId) -> Result<RoomResponse, RoomError> {
        self.request(|response| RoomMessage::Rematch { user_id, response })
            .await
    }

    pub async fn snapshot(&self) -> Result<MatchSnapshot, RoomError> {
        self.request(|response| RoomMessage::GetSnapshot { response })
            .await
    }

    pub async fn state(&self) -> Result<RoomStateResponse, RoomError> {
        self.request(|response| RoomMessage::GetState { response })
            .await
    }

    /// Register `sender` for broadcasts.
    ///
    /// The returned snapshot is the state just before the first notification `sender` will see.
    /// If `sender` fills up, the room drops the subscription and the receiver is closed.
    pub async fn subscribe(
        &self,
        user_id: UserId,
        sender: mpsc::Sender<RoomNotification>,
    ) -> Result<Subscription, RoomError> {
        self.request(|response| RoomMessage::Subscribe {
            user_id,
            sender,
            response,
        })
        .await
    }

    pub async fn unsubscribe(&self, subscriber_id: SubscriberId) -> Result<(), RoomError> {
        self.send(RoomMessage::Unsubscribe { subscriber_id }).await
    }

    pub async fn close(&self) -> Result<RoomResponse, RoomError> {
        self.request(|response| RoomMessage::Close { response })
            .await
    }
}

struct Subscriber {
    id: SubscriberId,
    user_id: UserId,
    sender: mpsc::Sender<RoomNotification>,
}

/// Room actor owning a single match.
pub struct RoomActor {
    id: RoomId,

    config: RoomConfig,

    /// Sole owner of board and turn state
    authority: TurnAuthority,

    inbox: mpsc::Receiver<RoomMessage>,

    seats: Seats,

    /// Kept in subscription order; broadcasts go out in this order
    subscribers: Vec<Subscriber>,

    next_subscriber_id: SubscriberId,

    matches_played: usize,

    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Returns
    ///
    /// * `(RoomActor, RoomHandle)` - Actor and handle for sending messages
    pub fn new(id: RoomId, config: RoomConfig) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            id,
            authority: TurnAuthority::new(config.game.clone()),
            config,
            inbox,
            seats: Seats::default(),
            subscribers: Vec::new(),
            next_subscriber_id: 1,
            matches_played: 0,
            is_closed: false,
        };

        (actor, RoomHandle::new(sender, id))
    }

    /// Run the room actor event loop until closed or every handle is dropped
    pub async fn run(mut self) {
        log::info!("Room {} '{}' starting", self.id, self.config.name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Room {} '{}' closed", self.id, self.config.name);
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join { user_id, response } => {
                let result = self.handle_join(user_id);
                let _ = response.send(result);
            }

            RoomMessage::Leave { user_id, response } => {
                let result = self.handle_leave(user_id);
                let _ = response.send(result);
            }

            RoomMessage::Drop {
                user_id,
                column,
                response,
            } => {
                let result = self.handle_drop(user_id, column);
                let _ = response.send(result);
            }

            RoomMessage::Rematch { user_id, response } => {
                let result = self.handle_rematch(user_id);
                let _ = response.send(result);
            }

            RoomMessage::GetSnapshot { response } => {
                let _ = response.send(self.authority.snapshot());
            }

            RoomMessage::GetState { response } => {
                let _ = response.send(self.get_state());
            }

            RoomMessage::Subscribe {
                user_id,
                sender,
                response,
            } => {
                let subscription = self.handle_subscribe(user_id, sender);
                let id = subscription.id;
                if response.send(subscription).is_err() {
                    self.subscribers.retain(|subscriber| subscriber.id != id);
                }
            }

            RoomMessage::Unsubscribe { subscriber_id } => {
                self.subscribers
                    .retain(|subscriber| subscriber.id != subscriber_id);
                log::debug!(
                    "Subscription {} to room {} ended",
                    subscriber_id,
                    self.id
                );
            }

            RoomMessage::Close { response } => {
                self.is_closed = true;
                self.broadcast(RoomNotification::Closed);
                let _ = response.send(RoomResponse::Success);
            }
        }
    }

    fn handle_subscribe(
        &mut self,
        user_id: UserId,
        sender: mpsc::Sender<RoomNotification>,
    ) -> Subscription {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push(Subscriber {
            id,
            user_id,
            sender,
        });
        log::debug!(
            "User {} subscribed to room {} as {}",
            user_id,
            self.id,
            id
        );

        Subscription {
            id,
            snapshot: self.authority.snapshot(),
            seats: self.seats,
        }
    }

    fn handle_join(&mut self, user_id: UserId) -> RoomResponse {
        if let Some(player) = self.seats.seat_of(user_id) {
            return RoomResponse::Seated { player };
        }

        match self.seats.assign(user_id) {
            Some(player) => {
                log::info!("User {} took {} in room {}", user_id, player, self.id);
                self.broadcast(RoomNotification::SeatsChanged(self.seats));
                RoomResponse::Seated { player }
            }
            None => RoomResponse::RoomFull,
        }
    }

    fn handle_leave(&mut self, user_id: UserId) -> RoomResponse {
        match self.seats.release(user_id) {
            Some(player) => {
                // The match carries on; whoever joins next takes over this seat
                log::info!("User {} left {} in room {}", user_id, player, self.id);
                self.broadcast(RoomNotification::SeatsChanged(self.seats));
                RoomResponse::Success
            }
            None => RoomResponse::NotSeated,
        }
    }

    fn handle_drop(&mut self, user_id: UserId, column: Column) -> RoomResponse {
        let Some(player) = self.seats.seat_of(user_id) else {
            return RoomResponse::NotSeated;
        };

        let outcome = self.authority.request_drop(player, column);
        if outcome.accepted {
            self.on_accepted(&outcome);
        }

        RoomResponse::Outcome(outcome)
    }

    fn on_accepted(&mut self, outcome: &DropOutcome) {
        if outcome.is_terminal() {
            self.matches_played += 1;
            log::info!(
                "Room {} match {} over: {}",
                self.id,
                self.matches_played,
                self.authority.status()
            );
        }

        self.broadcast(RoomNotification::Outcome(outcome.clone()));
    }

    fn handle_rematch(&mut self, user_id: UserId) -> RoomResponse {
        if self.seats.seat_of(user_id).is_none() {
            return RoomResponse::NotSeated;
        }

        if !self.authority.is_terminal() {
            return RoomResponse::Error("Match is still in progress".to_string());
        }

        self.authority = TurnAuthority::new(self.config.game.clone());
        log::info!(
            "Room {} rematch requested by user {}, {} starts",
            self.id,
            user_id,
            self.authority.current_player()
        );
        let snapshot = self.authority.snapshot();
        self.broadcast(RoomNotification::Rematch(snapshot.clone()));

        RoomResponse::Rematched(snapshot)
    }

    fn get_state(&self) -> RoomStateResponse {
        let config = self.authority.config();

        RoomStateResponse {
            room_id: self.id,
            room_name: self.config.name.clone(),
            seats: self.seats,
            subscriber_count: self.subscribers.len(),
            status: self.authority.status(),
            current_player: self.authority.current_player(),
            moves_played: self.authority.moves_played(),
            matches_played: self.matches_played,
            rows: config.rows,
            columns: config.columns,
            pieces_to_win: config.pieces_to_win,
            allow_diagonal: config.allow_diagonal,
        }
    }

    /// Deliver the same notification to every subscriber, in subscription order.
    ///
    /// A subscriber that cannot take it is dropped rather than skipped, so every stream that
    /// stays open is gap free.
    fn broadcast(&mut self, notification: RoomNotification) {
        let room_id = self.id;
        self.subscribers.retain(|subscriber| {
            match subscriber.sender.try_send(notification.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscription {} (user {}) to room {} is lagging, dropping it",
                        subscriber.id,
                        subscriber.user_id,
                        room_id
                    );
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!(
                        "Subscription {} (user {}) to room {} disconnected",
                        subscriber.id,
                        subscriber.user_id,
                        room_id
                    );
                    false
                }
            }
        });
    }
}
