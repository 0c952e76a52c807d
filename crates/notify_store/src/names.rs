//! Well-known names used on the bus.

pub const NOTIFICATIONS_BUS: &str = "org.freedesktop.Notifications";
pub const NOTIFICATIONS_OBJECT: &str = "/org/freedesktop/Notifications";
