//! Module concerned with handling the global application lifecycle of mbnotify.
//! Currently, this only means handling application exit by providing a global
//! `exit_receiver()` function whose receiver can be awaited to receive an event in case of application termination.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tokio::sync::broadcast;

pub static APPLICATION_EXIT_SENDER: Lazy<broadcast::Sender<()>> = Lazy::new(|| broadcast::channel(2).0);

/// Notify all listening tasks of the termination of the mbnotify process.
pub fn send_exit() -> Result<()> {
    (APPLICATION_EXIT_SENDER).send(()).context("Failed to send exit lifecycle event")?;
    Ok(())
}

/// Subscribe to the exit lifecycle event. The receiver yields once on application termination;
/// take it before anything could send the event, so that it can't be missed.
pub fn exit_receiver() -> broadcast::Receiver<()> {
    (APPLICATION_EXIT_SENDER).subscribe()
}

/// Route SIGINT and SIGTERM into an exit lifecycle event.
pub fn install_signal_handler() {
    simple_signal::set_handler(&[simple_signal::Signal::Int, simple_signal::Signal::Term], move |_| {
        log::info!("Shutting down notification manager...");
        if let Err(e) = send_exit() {
            log::error!("Failed to send application shutdown event to workers: {:?}", e);
            std::process::exit(1);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_reaches_early_subscribers() {
        let mut exit = exit_receiver();
        send_exit().unwrap();
        assert!(exit.recv().await.is_ok());
    }
}
