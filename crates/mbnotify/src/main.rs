use anyhow::{Context, Result};
use clap::CommandFactory as _;

mod application_lifecycle;
mod client;
mod daemon;
mod opts;

fn main() {
    let opts: opts::Opt = opts::Opt::from_env();

    let log_level_filter = if opts.log_debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init_timed();
    } else {
        pretty_env_logger::formatted_timed_builder()
            .filter(Some("mbnotify"), log_level_filter)
            .filter(Some("notify_store"), log_level_filter)
            .init();
    }

    if let opts::Action::ShellCompletions { shell } = opts.action {
        clap_complete::generate(shell, &mut opts::RawOpt::command(), "mbnotify", &mut std::io::stdout());
        return;
    }

    if let Err(err) = run(opts) {
        log::error!("{:?}", err);
        std::process::exit(1);
    }
}

fn run(opts: opts::Opt) -> Result<()> {
    // everything that touches the store runs on this one thread
    let rt = tokio::runtime::Builder::new_current_thread()
        .thread_name("mbnotify")
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")?;

    match opts.action {
        opts::Action::ShellCompletions { .. } => unreachable!(),
        opts::Action::Daemon => {
            log::info!("Initializing notification manager");
            rt.block_on(daemon::run())
        }
        opts::Action::Client(action) => rt.block_on(client::handle_client_action(action)),
    }
}
