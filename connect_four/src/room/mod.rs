//! Match rooms: one async actor per match.
//!
//! Each [`RoomActor`] runs in its own Tokio task, owns exactly one
//! [`TurnAuthority`](crate::game::TurnAuthority), and handles its mpsc inbox one message at a
//! time. That inbox is the only path to the authority, so concurrent drop requests from
//! different connections are applied strictly one after another.
//!
//! Callers never share the actor itself. They hold a cloneable [`RoomHandle`], usually looked
//! up through the [`RoomManager`].
//!
//! ## Example
//!
//! ```no_run
//! use connect_four::room::{RoomActor, RoomConfig, RoomResponse};
//!
//! # async fn demo() -> Result<(), connect_four::room::RoomError> {
//! let (actor, handle) = RoomActor::new(1, RoomConfig::default());
//! tokio::spawn(actor.run());
//!
//! let alice = handle.join(10).await?;
//! let bob = handle.join(20).await?;
//! assert!(alice.is_success() && bob.is_success());
//!
//! if let RoomResponse::Outcome(outcome) = handle.drop_piece(10, 3).await? {
//!     println!("landed on row {:?}", outcome.landing_row);
//! }
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;

/// Room identifier, unique per manager.
pub type RoomId = i64;

/// Identity supplied by the session layer. Rooms bind it to a seat.
pub type UserId = i64;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use errors::RoomError;
pub use manager::{RoomManager, RoomMetadata};
pub use messages::{
    RoomMessage, RoomNotification, RoomResponse, RoomStateResponse, Seats, SubscriberId,
    Subscription,
};
