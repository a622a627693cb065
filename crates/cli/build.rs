use std::{env, fs, path::PathBuf};

use clap_complete::Shell;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("sift")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract readable articles from HTML pages")
        .arg(clap::arg!([INPUT] "Local HTML file, or '-' for stdin"))
        .arg(clap::arg!(--url <URL> "Source URL of the page (enables site rules and image URL resolution)"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (markdown, text, json)")
                .value_name("FORMAT")
                .default_value("markdown")
                .value_parser(["markdown", "text", "json"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--frontmatter "Include TOML frontmatter (Markdown only); adds a header in text mode"))
        .arg(clap::arg!(--pretty "Pretty-print JSON output"))
        .arg(clap::arg!(--width <COLS> "Wrap text output at this many columns (0 = no wrapping)").default_value("0"))
        .arg(clap::arg!(--max_nodes <NUM> "Maximum number of parsed nodes").default_value("5000"))
        .arg(clap::arg!(--max_depth <NUM> "Maximum element nesting depth").default_value("500"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Print a shell completion script and exit")
                .value_name("SHELL")
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"]),
        );

    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
        clap_complete::generate_to(shell, &mut cmd, "sift", &completions_dir).unwrap();
    }

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
