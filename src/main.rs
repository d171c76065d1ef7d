//! collections-tree - Arrange site collections into folder/file trees.
//!
//! Usage:
//!   collections-tree build MANIFEST     Build trees and print them as JSON
//!   collections-tree stats MANIFEST     Show file/folder counts per tree
//!   collections-tree --help             Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use collections_tree_build::{
    FileRule, Manifest, TreeNode, TreeOptions, TreeOutcome, build_trees, load_options,
};

#[derive(Parser)]
#[command(
    name = "collections-tree",
    version,
    about = "Arrange site collections into folder/file trees",
    long_about = "collections-tree reads a build manifest (files and named collections) \
                  and arranges each collection's paths into a nested tree of folders \
                  and files, ready for templates."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build every collection tree and print it
    Build {
        /// Manifest JSON file
        manifest: PathBuf,

        #[command(flatten)]
        options: OptionArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Show statistics for every collection tree
    Stats {
        /// Manifest JSON file
        manifest: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(Args)]
struct OptionArgs {
    /// Options JSON file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rewrite file extensions to this one
    #[arg(short, long, conflicts_with = "no_extension")]
    extension: Option<String>,

    /// Keep file extensions as they are
    #[arg(long)]
    no_extension: bool,

    /// Record field holding each collection entry's path
    #[arg(long)]
    sort_key: Option<String>,

    /// Rewrite paths through this permalink pattern (e.g. "blog/:title")
    #[arg(long)]
    permalink: Option<String>,

    /// File-vs-folder rule: extension, last-segment or index-file
    #[arg(long)]
    file_rule: Option<FileRule>,

    /// Terminate folder paths with '/'
    #[arg(long)]
    trailing_slash: bool,

    /// Drop repeated paths before building
    #[arg(long)]
    dedupe: bool,
}

impl OptionArgs {
    fn resolve(&self) -> Result<TreeOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path).context("Failed to load options")?,
            None => TreeOptions::default(),
        };

        if let Some(ext) = &self.extension {
            options.extension = Some(ext.trim_start_matches('.').to_string());
        }
        if self.no_extension {
            options.extension = None;
        }
        if let Some(key) = &self.sort_key {
            options.sort_key.clone_from(key);
        }
        if let Some(pattern) = &self.permalink {
            options.permalinks = true;
            options.pattern = Some(pattern.clone());
        }
        if let Some(rule) = self.file_rule {
            options.file_rule = rule;
        }
        options.trailing_slash |= self.trailing_slash;
        options.dedupe |= self.dedupe;

        options.validate().context("Invalid options")?;
        Ok(options)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Json,
    Text,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            manifest,
            options,
            output,
            format,
        } => {
            run_build(&manifest, &options.resolve()?, output, format)?;
        }
        Command::Stats { manifest, options } => {
            run_stats(&manifest, &options.resolve()?)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build(manifest_path: &Path, options: &TreeOptions) -> Result<TreeOutcome> {
    let manifest = Manifest::from_path(manifest_path).context("Failed to read manifest")?;
    let outcome = build_trees(&manifest, options.clone()).context("Invalid options")?;

    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(outcome)
}

/// Build trees and print them.
fn run_build(
    manifest_path: &Path,
    options: &TreeOptions,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let outcome = build(manifest_path, options)?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome.to_metadata()?)?,
        OutputFormat::Text => {
            let mut out = String::new();
            for (name, forest) in &outcome.trees {
                out.push_str(&format!("{name}\n"));
                for node in forest {
                    render_node(&mut out, node, 1);
                }
            }
            out
        }
    };

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, rendered)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Wrote {}", output_path.display());
        }
        None => {
            println!("{}", rendered.trim_end());
        }
    }

    Ok(())
}

/// Print per-tree statistics.
fn run_stats(manifest_path: &Path, options: &TreeOptions) -> Result<()> {
    let outcome = build(manifest_path, options)?;

    if outcome.is_empty() {
        println!(" No trees built.");
        return Ok(());
    }

    println!("{}", "─".repeat(60));
    println!(" {:<20} {:>8} {:>8} {:>6}", "Tree", "Files", "Folders", "Depth");
    println!("{}", "─".repeat(60));
    for (name, forest) in &outcome.trees {
        let stats = forest.stats();
        println!(
            " {:<20} {:>8} {:>8} {:>6}",
            truncate(name, 20),
            stats.total_files,
            stats.total_folders,
            stats.max_depth
        );
    }
    println!("{}", "─".repeat(60));

    Ok(())
}

/// Append a node and its children as indented text.
fn render_node(out: &mut String, node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if node.is_folder() { "/" } else { "" };
    out.push_str(&format!(
        "{indent}{}{marker}  {}  [{}]\n",
        node.basename, node.title, node.path
    ));
    for child in &node.children {
        render_node(out, child, depth + 1);
    }
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_node() {
        let mut folder = TreeNode::new_folder("blog", "blog", "Blog");
        folder
            .children
            .push(TreeNode::new_file("post", "html", "blog/post.html", "Post"));

        let mut out = String::new();
        render_node(&mut out, &folder, 0);
        assert_eq!(out, "blog/  Blog  [blog]\n  post  Post  [blog/post.html]\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("articles", 20), "articles");
        assert_eq!(truncate("a-very-long-collection-name", 10), "a-very-...");
    }

    #[test]
    fn test_option_flags_override() {
        let cli = Cli::parse_from([
            "collections-tree",
            "build",
            "m.json",
            "--no-extension",
            "--file-rule",
            "index-file",
            "--permalink",
            "blog/:title",
        ]);
        let Command::Build { options, .. } = cli.command else {
            panic!("expected build command");
        };
        let options = options.resolve().unwrap();
        assert_eq!(options.extension, None);
        assert_eq!(options.file_rule, FileRule::IndexFile);
        assert!(options.permalinks);
        assert_eq!(options.active_pattern(), Some("blog/:title"));
    }
}
