//! Domain services used by the websocket and HTTP routes.

pub mod room;
