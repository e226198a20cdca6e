//! WCSS command-line front end
//!
//! Styles a tag tree given as JSON and prints the resulting render tree.
//!
//! - wcss page.json                    # Coloured summary
//! - wcss page.json --json             # Render tree and report as JSON
//! - wcss page.json --css extra.css    # Apply an extra sheet on top

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use wcss_css::{
    CssContext, Diagnostic, EngineConfig, HttpFetcher, SessionOptions, StyleReport, style_document,
};
use wcss_dom::TagTree;
use wcss_dom::builder::{BuildOptions, build_render_tree};
use wcss_dom::render::{RenderId, RenderNode, RenderTree, StyleState};

/// WCSS - style an HTML4/XHTML-MP tag tree the way a handset browser would
#[derive(Parser, Debug)]
#[command(name = "wcss")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Style a document and print the render tree
    wcss page.json

    # Resolve relative links against a base URL
    wcss page.json --base-url http://example.com/wap/

    # Only handheld rules, no images, JSON output
    wcss page.json --media handheld --no-images --json
"#)]
struct Cli {
    /// Tag tree in JSON form
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Extra style sheet applied after the document's own (repeatable)
    #[arg(long = "css", value_name = "FILE")]
    css: Vec<PathBuf>,

    /// Base URL for relative links
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Supported media types, comma separated
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    media: Option<Vec<String>>,

    /// Engine configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Concurrent fetches per phase
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Do not fetch images
    #[arg(long)]
    no_images: bool,

    /// Print the render tree and report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress diagnostics
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let text = fs::read_to_string(&cli.document)
        .with_context(|| format!("reading {}", cli.document.display()))?;
    let mut doc = TagTree::from_json(&text)?;
    let options = BuildOptions {
        visited: config.visited.iter().cloned().collect(),
    };
    let mut render = build_render_tree(&mut doc, &options);

    let mut ctx = config.to_context();
    if cli.base_url.is_some() {
        ctx.set_base_url(cli.base_url.clone());
    }
    install_handler(&mut ctx, cli.quiet);

    let session = SessionOptions {
        max_workers: config.max_fetch_workers,
        user_sheets: cli
            .css
            .iter()
            .map(|path| read_sheet(path))
            .collect::<anyhow::Result<_>>()?,
    };
    let report = style_document(&mut doc, &mut render, &mut ctx, &HttpFetcher, &session)?;

    if cli.json {
        let output = serde_json::json!({ "report": report, "render": render });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report);
        print_render_tree(&render);
    }
    Ok(())
}

/// The configuration file, if any, with command-line overrides on top.
fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(media) = &cli.media {
        config.media.clone_from(media);
    }
    if let Some(workers) = cli.workers {
        config.max_fetch_workers = workers;
    }
    if cli.no_images {
        config.show_images = false;
    }
    Ok(config)
}

fn read_sheet(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Print diagnostics as they arrive, or swallow them with `--quiet`.
fn install_handler(ctx: &mut CssContext, quiet: bool) {
    if quiet {
        ctx.set_handler(|_| true);
        return;
    }
    ctx.set_handler(|diagnostic: &Diagnostic| {
        eprintln!(
            "{} {} {}",
            format!("[{}]", diagnostic.code).yellow(),
            diagnostic.subject.bold(),
            diagnostic.message
        );
        true
    });
}

fn print_report(report: &StyleReport) {
    println!("{}", "=== Style Report ===".bold());
    println!(
        "{} external, {} embedded sheets, {} rules",
        report.external_sheets, report.embedded_sheets, report.rules
    );
    println!(
        "{} of {} images attached",
        report.images_attached, report.images_requested
    );
    for url in &report.failed {
        println!("{} {url}", "failed:".red());
    }
    println!();
}

fn print_render_tree(render: &RenderTree) {
    println!("{}", "=== Render Tree ===".bold());
    let mut stack = vec![(RenderTree::ROOT, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        println!("{}{}", "  ".repeat(depth), describe(id, &render[id]));
        stack.extend(render.children(id).iter().rev().map(|&child| (child, depth + 1)));
    }
}

/// One line per renderable: kind, text and the unselected style.
fn describe(id: RenderId, node: &RenderNode) -> String {
    let mut line = format!("{} {}", format!("{:?}", node.kind).cyan(), format!("#{}", id.0).dimmed());
    if let Some(text) = &node.text {
        line.push_str(&format!(" {}", format!("{text:?}").green()));
    }
    let style = node.style(StyleState::Unselected);
    if let Some(color) = style.fg_color {
        line.push_str(&format!(" color=#{color:06x}"));
    }
    if let Some(color) = style.bg_color {
        line.push_str(&format!(" background=#{color:06x}"));
    }
    if style.border.is_some() {
        line.push_str(" border");
    }
    if !style.decoration.is_empty() {
        line.push_str(&format!(" decoration={:?}", style.decoration));
    }
    if !node.flags.is_empty() {
        line.push_str(&format!(" {}", format!("{:?}", node.flags).magenta()));
    }
    if let Some(image) = &node.image {
        let state = if image.data.is_some() { "loaded" } else { "pending" };
        line.push_str(&format!(" img={} ({state})", image.src));
    }
    line
}
