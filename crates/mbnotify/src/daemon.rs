use anyhow::{Context, Result};
use notify_store::{names, NotificationEvent, NotificationServer, NotificationStore};

use crate::application_lifecycle;

/// Serve the notification manager on the session bus until the process is asked to exit.
///
/// If another notification manager already owns the bus name, we leave it alone and return
/// successfully.
pub async fn run() -> Result<()> {
    let mut exit = application_lifecycle::exit_receiver();
    application_lifecycle::install_signal_handler();

    let store = NotificationStore::new();
    let mut events = store.subscribe();

    let con = zbus::Connection::session().await.context("Cannot connect to the session bus")?;
    match NotificationServer::new(store.clone()).attach_to(&con).await {
        Ok(()) => log::info!("Notification manager running as {}", names::NOTIFICATIONS_BUS),
        Err(notify_store::Error::NameTaken(name)) => {
            eprintln!("Notification manager already running on {}, not taking over", name);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to register the notification manager"),
    }

    loop {
        tokio::select! {
            _ = exit.recv() => break,
            event = events.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            }
        }
    }

    log::info!("main loop finished, dropping {} pending notifications", store.len());
    Ok(())
}

fn log_event(event: &NotificationEvent) {
    match event {
        NotificationEvent::Added(n) => {
            log::info!("[{}] {} ({}): {}", n.id, n.app_name, n.hints.urgency, n.summary);
            log::debug!("[{}] body: {:?}, icon: {:?}, expires after: {:?}", n.id, n.body, n.icon_name, n.timeout);
        }
        NotificationEvent::Updated(n) => log::info!("[{}] updated: {}", n.id, n.summary),
        NotificationEvent::Closed { id, reason } => log::info!("[{}] {}", id, reason),
    }
}
