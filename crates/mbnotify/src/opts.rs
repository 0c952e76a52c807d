use clap::{Parser, Subcommand};
use notify_store::Urgency;

/// Struct that gets generated from `RawOpt`.
#[derive(Debug, PartialEq)]
pub struct Opt {
    pub log_debug: bool,
    pub action: Action,
}

#[derive(Parser, Debug, PartialEq)]
#[command(version, about)]
pub(super) struct RawOpt {
    /// Write out debug logs.
    #[arg(long = "debug", global = true)]
    log_debug: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Action {
    /// Generate a shell completion script
    ShellCompletions {
        #[arg(short, long)]
        shell: clap_complete::shells::Shell,
    },

    /// Run the notification manager on the session bus.
    #[command(name = "daemon", alias = "d")]
    Daemon,

    #[command(flatten)]
    Client(ActionClient),
}

/// Actions that talk to whichever notification manager is running on the session bus.
#[derive(Subcommand, Debug, PartialEq)]
pub enum ActionClient {
    /// Post a notification and print its id
    #[command(name = "send", alias = "s")]
    Send {
        summary: String,

        #[arg(default_value = "")]
        body: String,

        /// Icon name or path
        #[arg(short, long, default_value = "")]
        icon: String,

        #[arg(short, long, default_value = "mbnotify")]
        app_name: String,

        /// Id of a notification to replace instead of creating a new one
        #[arg(short, long, default_value_t = 0)]
        replaces_id: u32,

        /// Expiry in milliseconds. -1 uses the server default, 0 never expires.
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        timeout: i32,

        /// One of low, normal, critical
        #[arg(short, long)]
        urgency: Option<Urgency>,
    },

    /// Close the notification with the given id
    #[command(name = "close", alias = "c")]
    Close { id: u32 },

    /// Print the capabilities of the running notification manager
    #[command(name = "capabilities")]
    Capabilities,

    /// Print name, vendor and version of the running notification manager
    #[command(name = "server-info")]
    ServerInfo,

    /// Print notifications as they are closed
    #[command(name = "watch")]
    Watch,
}

impl Opt {
    pub fn from_env() -> Self {
        let raw: RawOpt = RawOpt::parse();
        raw.into()
    }
}

impl From<RawOpt> for Opt {
    fn from(other: RawOpt) -> Self {
        let RawOpt { action, log_debug } = other;
        Opt { action, log_debug }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Opt {
        RawOpt::try_parse_from(std::iter::once("mbnotify").chain(args.iter().copied())).unwrap().into()
    }

    #[test]
    fn test_parse_send_defaults() {
        assert_eq!(
            parse(&["send", "Hello"]),
            Opt {
                log_debug: false,
                action: Action::Client(ActionClient::Send {
                    summary: "Hello".to_string(),
                    body: String::new(),
                    icon: String::new(),
                    app_name: "mbnotify".to_string(),
                    replaces_id: 0,
                    timeout: -1,
                    urgency: None,
                }),
            }
        );
    }

    #[test]
    fn test_parse_send_with_options() {
        let opt = parse(&["--debug", "s", "Battery low", "10% left", "-t", "-1", "-r", "4", "--urgency", "critical"]);
        assert!(opt.log_debug);
        match opt.action {
            Action::Client(ActionClient::Send { body, timeout, replaces_id, urgency, .. }) => {
                assert_eq!(body, "10% left");
                assert_eq!(timeout, -1);
                assert_eq!(replaces_id, 4);
                assert_eq!(urgency, Some(Urgency::Critical));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_parse_daemon_and_close() {
        assert_eq!(parse(&["d"]).action, Action::Daemon);
        assert_eq!(parse(&["close", "12"]).action, Action::Client(ActionClient::Close { id: 12 }));
        assert!(RawOpt::try_parse_from(["mbnotify", "close", "twelve"]).is_err());
        assert!(RawOpt::try_parse_from(["mbnotify", "send", "x", "--urgency", "urgent"]).is_err());
    }
}
