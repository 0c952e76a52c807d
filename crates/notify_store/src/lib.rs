//! A store of pending desktop notifications, and the `org.freedesktop.Notifications` service that
//! exposes it on the session bus.
//!
//! The [`NotificationStore`] is usable on its own (it doesn't need a bus connection); the
//! [`NotificationServer`] wraps it and serves it to other processes.

pub mod names;
pub mod proxy;

mod util;

mod error;
pub use error::*;

mod notification;
pub use notification::*;

mod server;
pub use server::*;

mod store;
pub use store::*;
