//! Citescope Explorer
//!
//! Interactive front end for the paper backend. Reads commands from stdin,
//! delivers them to a [`GraphSession`], and prints search results, the
//! citation neighbourhood of the open paper, and chat replies as they stream.

mod events;
mod session;
mod telemetry;
mod view;

use citescope_common::{
    api::HttpPaperApi,
    config::AppConfig,
    metrics,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, error, info};

use crate::events::UiEvent;
use crate::session::{Flow, GraphSession};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    config.validate()?;

    // Initialize tracing
    telemetry::init(&config.observability);
    info!("Starting Citescope Explorer v{}", citescope_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();

    let api = HttpPaperApi::new(&config.api)?;
    info!(base_url = %api.base_url(), "Paper backend configured");

    let (mut session, mut updates) = GraphSession::new(Arc::new(api), config.clone());

    println!("{}", view::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let event = match line.parse::<UiEvent>() {
                    Ok(event) => event,
                    Err(e) => {
                        println!("{}", view::error(&e));
                        continue;
                    }
                };
                if dispatch(&mut session, event).await == Flow::Quit {
                    break;
                }
            }
            Some(update) = updates.recv() => {
                print!("{}", view::chat_update(&update));
                std::io::stdout().flush()?;
            }
            _ = &mut shutdown => break,
        }
    }

    session.cancel_chat().await;
    info!("Explorer shutdown complete");
    Ok(())
}

/// Deliver one event and print what changed
async fn dispatch(session: &mut GraphSession, event: UiEvent) -> Flow {
    let shown = event.clone();
    let flow = match session.handle(event).await {
        Ok(flow) => flow,
        Err(e) => {
            println!("{}", view::error(&e));
            return Flow::Continue;
        }
    };

    match shown {
        UiEvent::Search(_) => {
            if let Some(results) = session.search_results() {
                println!("{}", view::search_results(results));
            }
        }
        UiEvent::OpenPaper(_) | UiEvent::NodeClicked(_) => {
            debug!(paper_id = ?session.focal_id(), "Focal paper changed");
            if let Some(paper) = session.paper() {
                println!("{}", view::paper(paper));
            }
            println!("{}", view::graph(session.render_graph(), session.is_loading_graph()));
            print!("{}", view::transcript(&*session.transcript().read().await));
        }
        UiEvent::ShowGraph => {
            let graph = session.render_graph();
            println!("{}", view::graph(graph, session.is_loading_graph()));
            match serde_json::to_string_pretty(graph) {
                Ok(json) => println!("{}", json),
                Err(e) => println!("{}", view::error(&e.into())),
            }
        }
        UiEvent::ShowTranscript => {
            print!("{}", view::transcript(&*session.transcript().read().await));
        }
        UiEvent::Help => println!("{}", view::HELP),
        UiEvent::SendMessage(_) | UiEvent::CancelChat | UiEvent::Quit => {}
    }
    flow
}

/// Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
