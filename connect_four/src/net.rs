//! Wire protocol shared by the server and any client.
//!
//! Messages are JSON objects tagged by a `type` field. The server is authoritative: clients
//! only ever name a column, and learn everything else from what the server sends back.

/// Client and server message types.
pub mod messages;

/// Protocol versioning for client compatibility checks.
pub mod protocol_version;
