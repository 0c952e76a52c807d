use std::time::Duration;

/// Expiry used when a client asks for the server default (a timeout of `-1`).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Capabilities advertised through `GetCapabilities`, in this order.
pub const CAPABILITIES: [&str; 3] = ["body", "body-markup", "icon-static"];

/// How long a notification should stay around before it expires on its own.
///
/// On the wire this is the `expire_timeout` argument of [`Notify`], an `i32` in milliseconds where
/// `-1` asks for the server default and `0` means the notification never expires.
///
/// [`Notify`]: https://specifications.freedesktop.org/notification-spec/latest/protocol.html#command-notify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Let the server pick, which is [`DEFAULT_TIMEOUT`].
    #[default]
    Default,
    /// Never expire; the notification lives until it is closed.
    Never,
    /// Expire after the given duration.
    After(Duration),
}

impl Timeout {
    /// The effective expiry, or `None` if no timer should be scheduled.
    pub fn resolve(self) -> Option<Duration> {
        match self {
            Timeout::Default => Some(DEFAULT_TIMEOUT),
            Timeout::Never => None,
            Timeout::After(duration) if duration.is_zero() => None,
            Timeout::After(duration) => Some(duration),
        }
    }
}

impl From<i32> for Timeout {
    fn from(millis: i32) -> Self {
        match millis {
            0 => Timeout::Never,
            // only -1 is defined, anything else below zero gets the default as well
            m if m < 0 => Timeout::Default,
            m => Timeout::After(Duration::from_millis(m as u64)),
        }
    }
}

/// Why a notification went away. The discriminants are the codes sent in the
/// `NotificationClosed` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u32)]
pub enum CloseReason {
    #[display("expired")]
    Expired = 1,
    #[display("closed programmatically")]
    ProgrammaticallyClosed = 2,
    #[display("dismissed by the user")]
    UserDismissed = 3,
    #[display("reserved")]
    Reserved = 4,
}

impl CloseReason {
    pub fn code(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct UnknownCloseReason(pub u32);

impl TryFrom<u32> for CloseReason {
    type Error = UnknownCloseReason;

    fn try_from(code: u32) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(CloseReason::Expired),
            2 => Ok(CloseReason::ProgrammaticallyClosed),
            3 => Ok(CloseReason::UserDismissed),
            4 => Ok(CloseReason::Reserved),
            other => Err(UnknownCloseReason(other)),
        }
    }
}

/// Recognised values of the `urgency` hint. Parses from its name, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display, derive_more::FromStr)]
pub enum Urgency {
    #[display("low")]
    Low,
    #[default]
    #[display("normal")]
    Normal,
    #[display("critical")]
    Critical,
}

impl Urgency {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Urgency::Low),
            1 => Some(Urgency::Normal),
            2 => Some(Urgency::Critical),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Urgency::Low => 0,
            Urgency::Normal => 1,
            Urgency::Critical => 2,
        }
    }
}

/// The subset of the `hints` dictionary that the store keeps. Unknown hints are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hints {
    pub urgency: Urgency,
    pub category: Option<String>,
    pub desktop_entry: Option<String>,
}

/// An action a client attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub key: String,
    pub label: String,
}

/// Everything a client passes to `Notify`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationRequest {
    pub app_name: String,
    /// Id of the notification to replace, or `0` to create a new one.
    pub replaces_id: u32,
    pub icon_name: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<Action>,
    pub hints: Hints,
    pub timeout: Timeout,
}

impl NotificationRequest {
    /// A request for a new notification with the given summary and everything else left at its
    /// default.
    pub fn new(summary: impl Into<String>) -> Self {
        NotificationRequest { summary: summary.into(), ..Default::default() }
    }
}

/// A snapshot of a live notification, as handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u32,
    pub app_name: String,
    pub icon_name: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<Action>,
    pub hints: Hints,
    /// When the notification expires, relative to when it was (last) posted. `None` for
    /// notifications that never expire.
    pub timeout: Option<Duration>,
}

impl Notification {
    pub(crate) fn from_request(id: u32, request: NotificationRequest) -> Self {
        let NotificationRequest { app_name, replaces_id: _, icon_name, summary, body, actions, hints, timeout } = request;
        Notification { id, app_name, icon_name, summary, body, actions, hints, timeout: timeout.resolve() }
    }
}

/// The identity reported through `GetServerInformation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerInformation {
    pub name: &'static str,
    pub vendor: &'static str,
    pub version: &'static str,
    pub spec_version: &'static str,
}

pub const SERVER_INFORMATION: ServerInformation = ServerInformation {
    name: "Matchbox Panel Notification Manager",
    vendor: "OpenedHand",
    version: env!("CARGO_PKG_VERSION"),
    spec_version: "1.0",
};

/// Lifecycle events emitted by the [`NotificationStore`][crate::NotificationStore].
///
/// For any given id, `Added` comes first, followed by any number of `Updated`, and at most one
/// `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Added(Notification),
    Updated(Notification),
    Closed { id: u32, reason: CloseReason },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timeout_from_wire() {
        assert_eq!(Timeout::from(-1), Timeout::Default);
        assert_eq!(Timeout::from(-20), Timeout::Default);
        assert_eq!(Timeout::from(0), Timeout::Never);
        assert_eq!(Timeout::from(1500), Timeout::After(Duration::from_millis(1500)));
    }

    #[test]
    fn test_timeout_resolve() {
        assert_eq!(Timeout::Default.resolve(), Some(Duration::from_millis(3000)));
        assert_eq!(Timeout::Never.resolve(), None);
        assert_eq!(Timeout::After(Duration::ZERO).resolve(), None);
        assert_eq!(Timeout::After(Duration::from_secs(5)).resolve(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_close_reason_codes() {
        assert_eq!(CloseReason::Expired.code(), 1);
        assert_eq!(CloseReason::ProgrammaticallyClosed.code(), 2);
        assert_eq!(CloseReason::UserDismissed.code(), 3);
        assert_eq!(CloseReason::Reserved.code(), 4);
        assert_eq!(CloseReason::try_from(3), Ok(CloseReason::UserDismissed));
        assert_eq!(CloseReason::try_from(7), Err(UnknownCloseReason(7)));
    }

    #[test]
    fn test_parse_urgency() {
        assert_eq!("critical".parse::<Urgency>().ok(), Some(Urgency::Critical));
        assert_eq!("Low".parse::<Urgency>().ok(), Some(Urgency::Low));
        assert_eq!(Urgency::from_byte(0), Some(Urgency::Low));
        assert_eq!(Urgency::from_byte(9), None);
        assert!("urgent".parse::<Urgency>().is_err());
    }
}
