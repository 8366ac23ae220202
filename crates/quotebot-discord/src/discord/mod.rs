//! Discord HTTP-interactions transport

pub mod interaction;
pub mod rest;
pub mod verify;

pub use interaction::{CommandSpec, Interaction, command_catalog};
pub use rest::DiscordRestClient;
pub use verify::verify_signature;
