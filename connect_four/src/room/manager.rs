//! Room manager for spawning and managing multiple room actors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, mpsc};

use super::{
    RoomId, UserId,
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    errors::RoomError,
    messages::{RoomNotification, RoomResponse, RoomStateResponse, SubscriberId, Subscription},
};
use crate::game::{Column, MatchSnapshot};

/// Room metadata for discovery
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomMetadata {
    pub id: RoomId,
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub pieces_to_win: usize,
    pub allow_diagonal: bool,
    pub created_at: DateTime<Utc>,
}

struct RoomEntry {
    handle: RoomHandle,
    metadata: RoomMetadata,
}

/// Room manager for managing multiple room instances.
///
/// Cloning is cheap; clones share the same room table.
#[derive(Clone, Default)]
pub struct RoomManager {
    rooms: Arc<RwLock<HashMap<RoomId, RoomEntry>>>,
    next_room_id: Arc<RwLock<RoomId>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config, then create and spawn a new room
    pub async fn create_room(&self, config: RoomConfig) -> Result<RoomId, RoomError> {
        config.validate()?;

        let mut next_id = self.next_room_id.write().await;
        *next_id += 1;
        let room_id = *next_id;
        drop(next_id);

        let metadata = RoomMetadata {
            id: room_id,
            name: config.name.clone(),
            rows: config.game.rows,
            columns: config.game.columns,
            pieces_to_win: config.game.pieces_to_win,
            allow_diagonal: config.game.allow_diagonal,
            created_at: Utc::now(),
        };

        let (actor, handle) = RoomActor::new(room_id, config);

        let mut rooms = self.rooms.write().await;
        rooms.insert(room_id, RoomEntry { handle, metadata });
        drop(rooms);

        tokio::spawn(actor.run());

        log::info!("Created and spawned room {}", room_id);

        Ok(room_id)
    }

    /// Get a room handle
    pub async fn get_room(&self, room_id: RoomId) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(&room_id).map(|entry| entry.handle.clone())
    }

    async fn room(&self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        self.get_room(room_id)
            .await
            .ok_or(RoomError::NotFound(room_id))
    }

    /// List open rooms, oldest first
    pub async fn list_rooms(&self) -> Vec<RoomMetadata> {
        let rooms = self.rooms.read().await;
        let mut list: Vec<RoomMetadata> = rooms
            .values()
            .filter(|entry| !entry.handle.is_closed())
            .map(|entry| entry.metadata.clone())
            .collect();
        list.sort_by_key(|metadata| metadata.id);
        list
    }

    /// Close a room and forget it
    pub async fn close_room(&self, room_id: RoomId) -> Result<(), RoomError> {
        let entry = self
            .rooms
            .write()
            .await
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        // A room whose actor already stopped is still removed
        if let Err(e) = entry.handle.close().await {
            log::debug!("Room {} was already stopped: {}", room_id, e);
        }

        log::info!("Closed room {}", room_id);

        Ok(())
    }

    pub async fn join_room(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<RoomResponse, RoomError> {
        self.room(room_id).await?.join(user_id).await
    }

    pub async fn leave_room(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<RoomResponse, RoomError> {
        self.room(room_id).await?.leave(user_id).await
    }

    pub async fn drop_piece(
        &self,
        room_id: RoomId,
        user_id: UserId,
        column: Column,
    ) -> Result<RoomResponse, RoomError> {
        self.room(room_id).await?.drop_piece(user_id, column).await
    }

    pub async fn rematch(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<RoomResponse, RoomError> {
        self.room(room_id).await?.rematch(user_id).await
    }

    pub async fn get_room_state(&self, room_id: RoomId) -> Result<RoomStateResponse, RoomError> {
        self.room(room_id).await?.state().await
    }

    pub async fn get_snapshot(&self, room_id: RoomId) -> Result<MatchSnapshot, RoomError> {
        self.room(room_id).await?.snapshot().await
    }

    pub async fn subscribe(
        &self,
        room_id: RoomId,
        user_id: UserId,
        sender: mpsc::Sender<RoomNotification>,
    ) -> Result<Subscription, RoomError> {
        self.room(room_id).await?.subscribe(user_id, sender).await
    }

    pub async fn unsubscribe(
        &self,
        room_id: RoomId,
        subscriber_id: SubscriberId,
    ) -> Result<(), RoomError> {
        self.room(room_id).await?.unsubscribe(subscriber_id).await
    }

    /// Get active room count
    pub async fn active_room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }
}
