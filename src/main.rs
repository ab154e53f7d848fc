mod action;
mod app;
mod auth;
mod cache;
mod config;
mod detail;
mod editor;
mod error;
mod event;
mod feed;
mod gh;
mod github;
mod input;
mod markdown;
mod suggest;
mod task;
mod tui;
mod types;
mod ui;

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::{App, Target};
use crate::error::PerchError;
use crate::event::Event;
use crate::github::GitHub;
use crate::tui::EventHandler;

/// Inspect and act on a GitHub issue or pull request from the terminal.
#[derive(Debug, Parser)]
#[command(name = "perch", version, about)]
struct Args {
    /// Issue or PR number
    number: u64,

    /// Repository as "owner/repo"; defaults to the config file or the
    /// current checkout's origin remote
    #[arg(short = 'R', long = "repo")]
    repo: Option<String>,

    /// Treat the number as a pull request
    #[arg(long)]
    pr: bool,
}

fn resolve_target(args: &Args) -> Result<Target, PerchError> {
    let repo = args
        .repo
        .clone()
        .or_else(|| config::Config::load().default_repo)
        .or_else(config::detect_repo)
        .ok_or_else(|| {
            PerchError::Api("no repository given; pass -R owner/repo".to_string())
        })?;

    let (owner, name) = repo
        .split_once('/')
        .ok_or_else(|| PerchError::Api(format!("invalid repository \"{}\"", repo)))?;

    Ok(Target {
        owner: owner.to_string(),
        repo: name.to_string(),
        number: args.number,
        is_pr: args.pr,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Restore the terminal before the panic message prints.
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let args = Args::parse();
    let target = resolve_target(&args)?;

    let token = auth::load_token()?;
    let github = GitHub::new(token)?;

    let result = run(github, target).await;

    tui::restore()?;

    result
}

async fn run(github: GitHub, target: Target) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(Arc::new(github), target, action_tx.clone());

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16);
    let mut events = EventHandler::new(tick_rate, render_rate);

    if let Some(action) = app.handle_event(Event::Init) {
        action_tx.send(action)?;
    }

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &mut app))?;
                    }
                    _ => {
                        if let Some(action) = app.handle_event(event) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                match action {
                    // The editor owns the terminal for its lifetime, so
                    // the whole loop blocks here on purpose. The input
                    // pump is stopped first; the editor must be the only
                    // reader of the tty.
                    Action::SuspendForEditor(context) => {
                        drop(events);
                        tui::restore()?;
                        let captured = editor::run(&context);
                        terminal = tui::resume()?;
                        events = EventHandler::new(tick_rate, render_rate);

                        match captured {
                            Ok(body) => {
                                action_tx.send(Action::EditorFinished { body, context })?;
                            }
                            Err(e) => {
                                action_tx.send(e.into())?;
                            }
                        }
                    }
                    other => app.update(other),
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
