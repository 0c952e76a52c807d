use std::collections::HashMap;

use anyhow::{Context, Result};
use futures::StreamExt;
use notify_store::{proxy::NotificationsProxy, CloseReason};
use zbus::zvariant::Value;

use crate::opts::ActionClient;

/// Connect to the notification manager on the session bus and perform the given action.
pub async fn handle_client_action(action: ActionClient) -> Result<()> {
    let con = zbus::Connection::session().await.context("Cannot connect to the session bus")?;
    let proxy = NotificationsProxy::new(&con).await?;

    match action {
        ActionClient::Send { summary, body, icon, app_name, replaces_id, timeout, urgency } => {
            let urgency = urgency.map(|u| Value::U8(u.as_byte()));
            let mut hints = HashMap::new();
            if let Some(urgency) = &urgency {
                hints.insert("urgency", urgency);
            }

            log::debug!("Sending notification {:?} (replaces {})", summary, replaces_id);
            let id = proxy
                .notify(&app_name, replaces_id, &icon, &summary, &body, &[], hints, timeout)
                .await
                .context("Failed to send notification")?;
            println!("{}", id);
        }
        ActionClient::Close { id } => {
            proxy.close_notification(id).await.with_context(|| format!("Failed to close notification {}", id))?;
        }
        ActionClient::Capabilities => {
            for capability in proxy.get_capabilities().await? {
                println!("{}", capability);
            }
        }
        ActionClient::ServerInfo => {
            let (name, vendor, version, spec_version) = proxy.get_server_information().await?;
            println!("name: {}\nvendor: {}\nversion: {}\nspec version: {}", name, vendor, version, spec_version);
        }
        ActionClient::Watch => {
            let mut closed = proxy.receive_notification_closed().await?;
            while let Some(signal) = closed.next().await {
                let args = signal.args()?;
                match CloseReason::try_from(args.reason) {
                    Ok(reason) => println!("{} closed: {}", args.id, reason),
                    Err(_) => println!("{} closed: unknown reason {}", args.id, args.reason),
                }
            }
        }
    }
    Ok(())
}
