//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("sift")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

const ARTICLE_URL: &str = "https://blog.example.com/posts/arenas";

#[test]
fn test_cli_file_input() {
    cmd()
        .arg(get_fixture_path("semantic_article.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsers build trees"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("semantic_article.html")).unwrap();
    cmd()
        .args(["-", "--url", ARTICLE_URL])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("## Why indices"));
}

#[test]
fn test_cli_markdown_format() {
    cmd()
        .args(["-f", "markdown", "--url", ARTICLE_URL, &get_fixture_path("semantic_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("![Nodes stored side by side](https://blog.example.com/images/arena.png)"))
        .stdout(predicate::str::contains("```\nstruct NodeId(usize);"));
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", "--width", "40", &get_fixture_path("semantic_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("- No reference counting"))
        .stdout(predicate::str::contains("##").not());
}

#[test]
fn test_cli_json_format() {
    let output = cmd()
        .args(["-f", "json", "--url", ARTICLE_URL, &get_fixture_path("semantic_article.html")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "Understanding Arena Allocation");
    assert_eq!(json["author"], "Ada Lovelace");
    assert_eq!(json["stage"], "semantic");
    assert!(json["blocks"].as_array().is_some_and(|blocks| !blocks.is_empty()));
}

#[test]
fn test_cli_json_pretty() {
    cmd()
        .args(["-f", "json", "--pretty", &get_fixture_path("semantic_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n  \""));
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.md");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(get_fixture_path("semantic_article.html"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("Parsers build trees"));
}

#[test]
fn test_cli_frontmatter() {
    cmd()
        .args(["--frontmatter", "--url", ARTICLE_URL, &get_fixture_path("semantic_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("+++\ntitle = \"Understanding Arena Allocation\""))
        .stdout(predicate::str::contains("site = \"The Systems Blog\""));
}

#[test]
fn test_cli_site_rule_from_url() {
    cmd()
        .args(["-f", "json", "--url", "https://paulgraham.com/trees.html", &get_fixture_path("paulgraham.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""stage":"site_rule""#))
        .stdout(predicate::str::contains(r#""author":"Paul Graham""#));
}

#[test]
fn test_cli_rejects_urls() {
    cmd()
        .arg("https://example.com/article")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_cli_invalid_file() {
    cmd().arg("nonexistent.html").assert().failure();
}

#[test]
fn test_cli_empty_content() {
    cmd()
        .arg(get_fixture_path("empty_content.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty after preprocessing"));
}

#[test]
fn test_cli_max_depth() {
    let html = format!("<body>{}deep</body>", "<div>".repeat(50));
    cmd()
        .args(["--max-depth", "10", "-"])
        .write_stdin(html)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nesting depth exceeds limit of 10"));
}

#[test]
fn test_cli_unicode_content() {
    cmd()
        .arg(get_fixture_path("unicode_heavy.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("日本語の文章"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("semantic_article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Sift"))
        .stderr(predicate::str::contains("Extraction Details"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sift"));
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "html", &get_fixture_path("semantic_article.html")])
        .assert()
        .failure();
}
