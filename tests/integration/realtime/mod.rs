//! Real-time integration tests
//!
//! Session tests drive `Session` directly with management calls going
//! through the router. WebSocket tests run the full transport on a real
//! listener.

mod session_test;
mod websocket_test;
