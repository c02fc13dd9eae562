//! Real-time Delivery Module
//!
//! Everything between an accepted message and the sockets that receive it.
//!
//! # Architecture
//!
//! - **`hub`** - Per-channel broadcast senders (personal and group topics)
//! - **`router`** - Persist a message, then publish it on its channels
//! - **`messenger`** - Validate, authorize and route user-authored sends
//! - **`session`** - Per-connection frame handling and subscriptions
//! - **`websocket`** - `GET /ws` upgrade and socket pump
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs       - Module exports and documentation
//! ├── hub.rs       - ChannelHub and Channel
//! ├── router.rs    - MessageRouter
//! ├── messenger.rs - Messenger (send pipeline)
//! ├── session.rs   - Session state machine
//! └── websocket.rs - WebSocket transport
//! ```
//!
//! # Delivery Guarantees
//!
//! A message is broadcast only after it has been persisted. Each subscriber
//! of a channel sees that channel's messages in publish order; subscribers
//! that fall more than the channel capacity behind skip ahead and the gap is
//! logged. A member removed from a group stops receiving its channel right
//! after the removal, whether or not the notice could be stored.

pub mod hub;
pub mod messenger;
pub mod router;
pub mod session;
pub mod websocket;

pub use hub::{Channel, ChannelHub, HubEvent};
pub use messenger::Messenger;
pub use router::MessageRouter;
pub use session::{Reply, Session};
pub use websocket::ws_handler;
