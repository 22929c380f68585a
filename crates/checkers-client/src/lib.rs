pub mod client_controller;
pub mod game_state;
pub mod net_client;
pub mod selection;
pub mod transport;

#[cfg(feature = "native")]
pub mod ws_transport;
