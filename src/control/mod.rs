//! The control channel: length-prefixed JSON over one TCP connection per call.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::ControlClient;
pub use protocol::{ErrorKind, MAX_FRAME_LEN, Request, Response, Status};
pub use server::{ControlServer, dispatch};
