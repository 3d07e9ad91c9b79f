// ABOUTME: CLI binary for ReadX.
// ABOUTME: Reads saved tweet or article pages from files or stdin and outputs the reading view in various formats.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use readx_core::{
    ArticleSelectors, JsonFileStore, NormalizedContent, OutputFormat, Reader, ReaderSettings,
    SettingsStore, Theme, TweetSelectors,
};
use serde::Deserialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "readx")]
#[command(about = "Extract a tweet or article from a saved page and render a reading view")]
struct Args {
    /// Output format: html (default), markdown/md, text/txt, json
    #[arg(short = 'f', long = "format", default_value = "html")]
    format: String,

    /// Output the normalized content as JSON (same as -f json)
    #[arg(long = "json")]
    json_output: bool,

    /// Wrap HTML output in a complete reading-mode document
    #[arg(long = "page")]
    page: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Reader settings JSON file; created on first save
    #[arg(long = "settings")]
    settings: Option<PathBuf>,

    /// Override the settings theme: light or dark
    #[arg(long = "theme")]
    theme: Option<String>,

    /// Register a user font in the settings file
    #[arg(long = "add-font", requires = "settings")]
    add_font: Option<String>,

    /// Remove a user font from the settings file
    #[arg(long = "remove-font", requires = "settings")]
    remove_font: Option<String>,

    /// JSON file overriding the tweet and/or article selector tables
    #[arg(long = "selectors")]
    selectors: Option<PathBuf>,

    /// Base URL for resolving relative links and media
    #[arg(long = "base-url", conflicts_with = "no_base_url")]
    base_url: Option<String>,

    /// Leave relative URLs unresolved
    #[arg(long = "no-base-url")]
    no_base_url: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Enable debug logging (RUST_LOG is honored as well)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// HTML files to read; none or `-` reads stdin
    #[arg()]
    inputs: Vec<PathBuf>,
}

/// Optional selector table overrides loaded with `--selectors`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SelectorOverrides {
    tweet: Option<TweetSelectors>,
    article: Option<ArticleSelectors>,
}

fn init_logging(verbose: bool) {
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if verbose || has_rust_log {
        let mut filter = EnvFilter::from_default_env();
        if verbose {
            if let Ok(directive) = "readx_core=debug".parse() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("error reading stdin: {}", e))?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|e| format!("error reading file {:?}: {}", path, e))
}

fn load_selectors(path: &Path) -> Result<SelectorOverrides, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("error reading selectors {:?}: {}", path, e))?;
    serde_json::from_str(&raw).map_err(|e| format!("error parsing selectors {:?}: {}", path, e))
}

/// Load settings, apply font edits and theme override. Edits are saved back to the store.
fn load_settings(args: &Args) -> Result<ReaderSettings, String> {
    let Some(path) = &args.settings else {
        let mut settings = ReaderSettings::default();
        if let Some(theme) = &args.theme {
            settings.theme = Theme::from(theme.as_str());
        }
        return Ok(settings);
    };

    let store = JsonFileStore::new(path);
    let mut settings = store.load().map_err(|e| e.to_string())?;

    let mut changed = false;
    if let Some(font) = &args.add_font {
        settings.add_user_font(font).map_err(|e| e.to_string())?;
        changed = true;
    }
    if let Some(font) = &args.remove_font {
        if !settings.remove_user_font(font) {
            return Err(format!("font not found: {}", font));
        }
        changed = true;
    }
    if changed {
        store.save(&settings).map_err(|e| e.to_string())?;
    }

    if let Some(theme) = &args.theme {
        settings.theme = Theme::from(theme.as_str());
    }
    Ok(settings)
}

fn build_reader(args: &Args, settings: ReaderSettings) -> Result<Reader, String> {
    let mut builder = Reader::builder().settings(settings);

    if let Some(path) = &args.selectors {
        let overrides = load_selectors(path)?;
        if let Some(tweet) = overrides.tweet {
            builder = builder.tweet_selectors(tweet);
        }
        if let Some(article) = overrides.article {
            builder = builder.article_selectors(article);
        }
    }

    if args.no_base_url {
        builder = builder.no_base_url();
    } else if let Some(raw) = &args.base_url {
        let url = Url::parse(raw).map_err(|e| format!("invalid --base-url {:?}: {}", raw, e))?;
        builder = builder.base_url(url);
    }

    Ok(builder.build())
}

/// Format output based on the requested format.
///
/// JSON output serializes the normalized record(s); every other format
/// renders each record and separates them with blank lines.
fn format_output(
    reader: &Reader,
    results: &[NormalizedContent],
    format: OutputFormat,
    page: bool,
) -> Result<String, String> {
    if format == OutputFormat::Json {
        let json = if results.len() == 1 {
            serde_json::to_string_pretty(&results[0])
        } else {
            serde_json::to_string_pretty(results)
        };
        return json.map_err(|e| format!("error serializing JSON: {}", e));
    }

    let rendered: Result<Vec<String>, String> = results
        .iter()
        .map(|content| {
            if page && format == OutputFormat::Html {
                Ok(reader.render_page(content))
            } else {
                reader
                    .format(content, format)
                    .map_err(|e| format!("error formatting output: {}", e))
            }
        })
        .collect();
    Ok(rendered?.join("\n\n"))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = match load_settings(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let reader = match build_reader(&args, settings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let format = if args.json_output {
        OutputFormat::Json
    } else {
        OutputFormat::from(args.format.as_str())
    };

    let inputs: Vec<PathBuf> = if args.inputs.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.inputs.clone()
    };

    let start = Instant::now();
    let mut results: Vec<NormalizedContent> = Vec::new();
    let mut had_error = false;

    for input in &inputs {
        let html = match read_input(input) {
            Ok(html) => html,
            Err(e) => {
                eprintln!("{}", e);
                had_error = true;
                continue;
            }
        };
        match reader.extract_html(&html) {
            Ok(content) => results.push(content),
            Err(e) => {
                tracing::debug!(error = %e, input = ?input, "extraction failed");
                eprintln!("error: {:?}: {} ({})", input, e.user_message(), e.reason());
                had_error = true;
            }
        }
    }

    let elapsed = start.elapsed();

    if !results.is_empty() {
        match format_output(&reader, &results, format, args.page) {
            Ok(output_str) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, &output_str) {
                        eprintln!("error writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output_str);
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
