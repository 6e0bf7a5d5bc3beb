//! Seams the request pipeline is assembled from.

mod connectivity;
mod session_listener;
mod token_store;
mod transport;

pub use connectivity::{ConnectivityFlag, ConnectivityGate};
pub use session_listener::{NoopSessionListener, SessionListener};
pub use token_store::TokenStore;
pub use transport::Transport;
