//! Plain-text rendering of session state

use citescope_chat::{ChatUpdate, Role, StreamState, Transcript};
use citescope_common::errors::AppError;
use citescope_common::models::{PaperDetail, SearchResponse};
use citescope_graph::RenderGraph;
use std::fmt::Write as _;

pub const HELP: &str = "\
commands:
  search <query>     find papers
  open <id>          open a paper and load its citation graph
  click <id>         navigate to a paper shown in the graph
  chat <message>     ask about the open paper
  cancel             stop the reply currently streaming
  graph              print the citation graph
  transcript         print the conversation
  help               show this help
  quit               exit";

pub fn search_results(response: &SearchResponse) -> String {
    let mut out = format!(
        "FOUND {} RESULTS IN {:.2}ms [{}]\n",
        response.results.len(),
        response.took_ms,
        response.method
    );
    for hit in &response.results {
        let _ = writeln!(out, "\n[{}] {}", hit.id, hit.title);
        let _ = writeln!(
            out,
            "  {} | {} | {:.1}% match",
            hit.category.as_deref().unwrap_or("-"),
            hit.published.as_deref().unwrap_or("-"),
            hit.match_percent()
        );
        let _ = writeln!(out, "  {}", hit.preview());
    }
    out
}

pub fn paper(paper: &PaperDetail) -> String {
    let mut out = format!("{}\n{}\n", paper.title, paper.authors);
    if let Some(url) = paper.pdf_url() {
        let _ = writeln!(out, "{}", url);
    }
    let _ = writeln!(out, "\n{}", paper.summary());
    out
}

pub fn graph(graph: &RenderGraph, loading: bool) -> String {
    if loading {
        return "Loading citation graph...".to_string();
    }
    if graph.is_empty() {
        return "No citation graph for this paper.".to_string();
    }

    let mut out = format!("{}\n", graph.stats_line());
    for node in &graph.nodes {
        let marker = if node.is_focal { "*" } else { " " };
        let _ = write!(
            out,
            "{} {:<12} ({:>7.1}, {:>7.1})  {}",
            marker, node.id, node.position.x, node.position.y, node.label
        );
        if let Some(subtitle) = &node.subtitle {
            let _ = write!(out, "  [{}]", subtitle);
        }
        out.push('\n');
    }
    for edge in graph.dangling_edges() {
        let _ = writeln!(out, "  dangling {} -> {}", edge.source, edge.target);
    }
    out
}

pub fn transcript(transcript: &Transcript) -> String {
    let mut out = String::new();
    for message in transcript.messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Ai => "ai",
        };
        let _ = writeln!(out, "{:>3}: {}", who, message.text);
    }
    out
}

/// Inline text for a live chat update
pub fn chat_update(update: &ChatUpdate) -> String {
    match update {
        ChatUpdate::Delta { text, .. } => text.clone(),
        ChatUpdate::Finished { state: StreamState::Done, .. } => "\n".to_string(),
        ChatUpdate::Finished { state, .. } => format!("\n[reply {}]\n", state.as_str()),
    }
}

pub fn error(e: &AppError) -> String {
    match e {
        AppError::Validation { message, .. } => format!("! {}", message),
        other => format!("! {} ({:?})", other, other.code()),
    }
}
