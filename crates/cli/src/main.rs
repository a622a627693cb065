use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use sift_core::{ExtractedArticle, Extractor, ExtractorConfig, JsonConfig, MarkdownConfig, TextConfig};
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Markdown,
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: markdown, text, json", s)),
        }
    }
}

/// Extract the readable article from an HTML page
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(version)]
#[command(about = "Extract readable articles from HTML pages", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<String>,

    /// Source URL of the page (enables site rules and image URL resolution)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Output format (markdown, text, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Include TOML frontmatter (Markdown only); adds a header in text mode
    #[arg(long)]
    frontmatter: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Wrap text output at this many columns (0 = no wrapping)
    #[arg(long, default_value = "0", value_name = "COLS")]
    width: usize,

    /// Maximum number of parsed nodes
    #[arg(long, default_value = "5000", value_name = "NUM")]
    max_nodes: usize,

    /// Maximum element nesting depth
    #[arg(long, default_value = "500", value_name = "NUM")]
    max_depth: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "sift=debug,sift_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

/// Read the page from stdin or a file. URLs are refused: this tool never
/// touches the network.
fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        return Ok(buffer);
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        bail!(
            "sift does not fetch pages; save the page first and pass its URL with --url, e.g. \
             `curl -sL {input} | sift - --url {input}`"
        );
    }

    fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
}

/// The `--url` value, or a `file://` URL for a local input
fn source_url(args: &Args, input: &str) -> String {
    if let Some(url) = &args.url {
        return url.clone();
    }
    if input == "-" {
        return String::new();
    }
    fs::canonicalize(Path::new(input))
        .ok()
        .and_then(|path| Url::from_file_path(path).ok())
        .map(String::from)
        .unwrap_or_default()
}

fn render(article: &ExtractedArticle, args: &Args) -> anyhow::Result<String> {
    let output = match args.format {
        OutputFormat::Markdown => {
            let config = MarkdownConfig { include_frontmatter: args.frontmatter, ..Default::default() };
            sift_core::convert_to_markdown(article, &config)
        }
        OutputFormat::Text => {
            let config = TextConfig { line_width: args.width, include_header: args.frontmatter };
            let mut text = sift_core::convert_to_text(article, &config);
            text.push('\n');
            text
        }
        OutputFormat::Json => {
            let config = JsonConfig { pretty: args.pretty };
            let mut json = sift_core::convert_to_json(article, &config).context("Failed to render JSON")?;
            json.push('\n');
            json
        }
    };
    Ok(output)
}

fn run(args: &Args, input: &str) -> anyhow::Result<()> {
    let started = Instant::now();

    if args.verbose {
        echo::print_banner();
        let source = if input == "-" { "stdin".to_string() } else { format!("file {input}") };
        echo::print_step(1, 3, &format!("Reading from {source}"));
    }

    let html = read_input(input)?;
    let url = source_url(args, input);
    tracing::debug!(input, url = url.as_str(), bytes = html.len(), "read input");

    if args.verbose {
        echo::print_detail("Size", &echo::format_size(html.len()));
        if !url.is_empty() {
            echo::print_detail("URL", &url);
        }
        echo::print_step(2, 3, "Extracting main content");
    }

    let config = ExtractorConfig::builder().max_nodes(args.max_nodes).max_depth(args.max_depth).build();
    let extract_started = Instant::now();
    let article = Extractor::with_config(config).extract(&html, &url).context("Failed to extract article")?;
    let extract_time = extract_started.elapsed();

    if args.verbose {
        echo::print_timing("Extraction", extract_time);
        echo::print_extraction_details(&article);
    }
    if !article.stage.is_confident() {
        echo::print_warning("No clear article container found; output is a best-effort match");
    }

    let output = render(&article, args)?;

    if args.verbose {
        echo::print_step(3, 3, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
        echo::print_timing("Total", started.elapsed());
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display()));
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "sift", &mut io::stdout());
        return;
    }

    let Some(input) = args.input.as_deref() else {
        echo::print_error("No input given");
        std::process::exit(2);
    };

    if let Err(e) = run(&args, input) {
        echo::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_args_parse() {
        let argv = ["sift", "page.html", "-f", "json", "--pretty", "--url", "https://a.b/c"];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.input.as_deref(), Some("page.html"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.pretty);
        assert_eq!(args.max_nodes, 5000);
    }

    #[test]
    fn test_input_required_without_completions() {
        assert!(Args::try_parse_from(["sift"]).is_err());
        assert!(Args::try_parse_from(["sift", "--completions", "bash"]).is_ok());
    }

    #[test]
    fn test_http_input_is_rejected() {
        let err = read_input("https://example.com/post").unwrap_err();
        assert!(err.to_string().contains("--url"));
    }

    #[test]
    fn test_clap_command_is_valid() {
        Args::command().debug_assert();
    }
}
