use crate::*;

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedReceiver;
use zbus::{interface, zvariant::Value, SignalContext};

/// An instance of [`org.freedesktop.Notifications`], serving a [`NotificationStore`] to the rest of
/// the session. It doesn't display anything; observers of the store (see
/// [`NotificationStore::subscribe`]) are responsible for that.
///
/// [`org.freedesktop.Notifications`]: https://specifications.freedesktop.org/notification-spec/latest/protocol.html
#[derive(Debug)]
pub struct NotificationServer {
    store: NotificationStore,
    tasks: tokio::task::JoinSet<()>,
}

/// Implementation of the `org.freedesktop.Notifications` service.
///
/// Methods correspond to methods on the DBus service that can be called by clients, while signals
/// are events that we generate that clients listen to.
#[interface(name = "org.freedesktop.Notifications")]
impl NotificationServer {
    /// Notify method
    #[allow(clippy::too_many_arguments)]
    async fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: Vec<&str>,
        hints: HashMap<&str, Value<'_>>,
        expire_timeout: i32,
    ) -> u32 {
        let request = NotificationRequest {
            app_name: app_name.to_owned(),
            replaces_id,
            icon_name: app_icon.to_owned(),
            summary: summary.to_owned(),
            body: body.to_owned(),
            actions: parse_actions(&actions),
            hints: parse_hints(&hints),
            timeout: Timeout::from(expire_timeout),
        };
        self.store.notify(request)
    }

    /// CloseNotification method
    async fn close_notification(&self, id: u32) -> zbus::fdo::Result<()> {
        if self.store.close(id, CloseReason::ProgrammaticallyClosed) {
            Ok(())
        } else {
            log::info!("asked to close unknown notification {}", id);
            Err(Error::UnknownId(id).into())
        }
    }

    /// GetCapabilities method
    async fn get_capabilities(&self) -> Vec<String> {
        self.store.capabilities().iter().map(|cap| cap.to_string()).collect()
    }

    /// GetServerInformation method
    #[zbus(out_args("name", "vendor", "version", "spec_version"))]
    async fn get_server_information(&self) -> (String, String, String, String) {
        let info = self.store.server_information();
        (info.name.to_owned(), info.vendor.to_owned(), info.version.to_owned(), info.spec_version.to_owned())
    }

    /// NotificationClosed signal
    #[zbus(signal)]
    async fn notification_closed(ctxt: &SignalContext<'_>, id: u32, reason: u32) -> zbus::Result<()>;
}

impl NotificationServer {
    pub fn new(store: NotificationStore) -> Self {
        NotificationServer { store, tasks: Default::default() }
    }

    /// Attach and run the server (in the background) on a connection, and claim the well-known
    /// bus name.
    ///
    /// Fails with [`Error::NameTaken`] if another notification manager already owns the bus name,
    /// in which case we don't try to take over.
    pub async fn attach_to(self, con: &zbus::Connection) -> Result<()> {
        self.serve_on(con).await?;

        let flags = [zbus::fdo::RequestNameFlags::DoNotQueue];
        match con.request_name_with_flags(names::NOTIFICATIONS_BUS, flags.into_iter().collect()).await {
            Ok(reply) => check_name_reply(reply, con).await,
            Err(zbus::Error::NameTaken) => check_name_reply(zbus::fdo::RequestNameReply::Exists, con).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Export the server object on a connection without asking for a bus name. This is all a
    /// peer-to-peer connection needs.
    pub async fn serve_on(mut self, con: &zbus::Connection) -> Result<()> {
        let ctxt = SignalContext::new(con, names::NOTIFICATIONS_OBJECT)?.into_owned();
        self.tasks.spawn(forward_closed_signals(self.store.subscribe(), ctxt));

        if !con.object_server().at(names::NOTIFICATIONS_OBJECT, self).await? {
            return Err(zbus::Error::Failure(format!(
                "Object already exists at {} on this connection -- is the notification manager already running?",
                names::NOTIFICATIONS_OBJECT
            ))
            .into());
        }
        Ok(())
    }
}

/// Turn the reply to our `DoNotQueue` name request into a result. Anything but owning the name
/// means another notification manager is running; our object is withdrawn again in that case.
async fn check_name_reply(reply: zbus::fdo::RequestNameReply, con: &zbus::Connection) -> Result<()> {
    use zbus::fdo::RequestNameReply::*;
    match reply {
        PrimaryOwner | AlreadyOwner => Ok(()),
        Exists | InQueue => {
            con.object_server().remove::<NotificationServer, _>(names::NOTIFICATIONS_OBJECT).await?;
            Err(Error::NameTaken(names::NOTIFICATIONS_BUS.to_owned()))
        }
    }
}

/// Send a `NotificationClosed` signal for every notification that leaves the store.
async fn forward_closed_signals(
    mut events: UnboundedReceiver<NotificationEvent>,
    ctxt: SignalContext<'static>,
) {
    while let Some(event) = events.recv().await {
        if let NotificationEvent::Closed { id, reason } = event {
            crate::print_result_err!(
                format!("while signaling NotificationClosed for {}", id),
                NotificationServer::notification_closed(&ctxt, id, reason.code()).await,
            );
        }
    }
}

/// Decode the flat `[key, label, key, label, ...]` action list. A trailing key without a label is
/// dropped.
fn parse_actions(actions: &[&str]) -> Vec<Action> {
    actions
        .chunks_exact(2)
        .map(|pair| Action { key: pair[0].to_owned(), label: pair[1].to_owned() })
        .collect()
}

fn parse_hints(hints: &HashMap<&str, Value<'_>>) -> Hints {
    let string_hint = |name: &str| match hints.get(name) {
        Some(Value::Str(s)) => Some(s.as_str().to_owned()),
        Some(other) => {
            log::debug!("ignoring {} hint of unexpected type: {:?}", name, other);
            None
        }
        None => None,
    };

    let urgency = match hints.get("urgency") {
        Some(Value::U8(b)) => Urgency::from_byte(*b).unwrap_or_else(|| {
            log::debug!("ignoring unknown urgency {}", b);
            Urgency::default()
        }),
        _ => Urgency::default(),
    };

    Hints { urgency, category: string_hint("category"), desktop_entry: string_hint("desktop-entry") }
}
