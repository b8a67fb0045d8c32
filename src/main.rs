use std::path::PathBuf;
use std::process;

use clap::Parser;

use topshelf::builders::write_archive_to_path;
use topshelf::core::{
    default_output_file_name, print_error_message, print_info_message, Layout, Replacement,
    ShelfError, ShelfOptions,
};
use topshelf::crawler::Crawler;
use topshelf::env::{generate_env_docs, EnvConfig};
use topshelf::logging::init_logging;
use topshelf::utils::url::Url;

#[derive(Parser, Debug)]
#[command(name = "topshelf", version)]
#[command(about = "Turns a tree of linked web pages into an EPUB e-book")]
#[command(after_help = generate_env_docs())]
struct Cli {
    /// Output file [default: Author-Title.epub]
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Write the e-book even if some files could not be downloaded
    #[arg(short = 'c', long = "continue")]
    keep_going: bool,

    /// Follow every link instead of the book navigation of each page
    #[arg(short = 'r', long)]
    raw: bool,

    /// Fetch the first page for its links without putting it in the book
    #[arg(short = 's', long)]
    skip: bool,

    /// Only download URLs matching this regular expression
    #[arg(short = 'a', long, value_name = "REGEX")]
    accept: Option<String>,

    /// Never download URLs matching this regular expression
    #[arg(short = 'd', long = "delete", value_name = "REGEX")]
    reject: Option<String>,

    /// Replace SEARCH (a regular expression) by REPLACEMENT in every page
    /// before it is parsed; `$1` refers to a capture group
    #[arg(long, num_args = 2, value_names = ["SEARCH", "REPLACEMENT"])]
    replace: Vec<String>,

    /// Print pages after the replacements were applied
    #[arg(long)]
    show: bool,

    /// Set a metadata field (title, lang, ident, subject, description,
    /// relation, creator, publisher, date, rights)
    #[arg(short = 'm', long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    metadata: Vec<(String, String)>,

    /// Maximum number of link levels followed below a page in raw layout
    #[arg(short = 'l', long, value_name = "N")]
    recursion_limit: Option<usize>,

    /// Extension given to documents whose URL has none
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// Read options from a TOML file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// User-Agent header sent with every request
    #[arg(short = 'u', long)]
    user_agent: Option<String>,

    /// Network timeout in seconds
    #[arg(short = 't', long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Pages to start from
    #[arg(required = true, value_name = "URL")]
    urls: Vec<String>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{s}\""))
}

/// Options file first, then environment, then flags
fn build_options(cli: &Cli, env_config: &EnvConfig) -> Result<ShelfOptions, ShelfError> {
    let mut options = match &cli.config {
        Some(path) => ShelfOptions::from_toml_file(path)?,
        None => ShelfOptions::default(),
    };
    env_config.apply_to(&mut options);

    if cli.raw {
        options.layout = Layout::Raw;
    }
    if cli.skip {
        options.skip_first = true;
    }
    if cli.keep_going {
        options.ignore_errors = true;
    }
    if cli.show {
        options.show_replaced = true;
    }
    if cli.accept.is_some() {
        options.accept = cli.accept.clone();
    }
    if cli.reject.is_some() {
        options.reject = cli.reject.clone();
    }
    if cli.recursion_limit.is_some() {
        options.recursion_limit = cli.recursion_limit;
    }
    if cli.extension.is_some() {
        options.document_extension = cli.extension.clone();
    }
    if cli.user_agent.is_some() {
        options.user_agent = cli.user_agent.clone();
    }
    if let Some(timeout) = cli.timeout {
        options.timeout = timeout;
    }
    for pair in cli.replace.chunks(2) {
        if let [search, replace] = pair {
            options.replacements.push(Replacement {
                search: search.clone(),
                replace: replace.clone(),
            });
        }
    }
    for (key, value) in &cli.metadata {
        options.metadata.insert(key.clone(), value.clone());
    }

    Ok(options)
}

fn parse_urls(urls: &[String]) -> Result<Vec<Url>, ShelfError> {
    urls.iter()
        .map(|url| {
            Url::parse(url).map_err(|source| ShelfError::InvalidUrl {
                url: url.clone(),
                source,
            })
        })
        .collect()
}

fn run(cli: Cli) -> Result<(), ShelfError> {
    let env_config = EnvConfig::from_env().map_err(|e| ShelfError::Config(e.to_string()))?;
    let options = build_options(&cli, &env_config)?;
    let urls = parse_urls(&cli.urls)?;

    for url in &urls {
        print_info_message(&format!("E-Book URL: {url}"));
    }

    let ignore_errors = options.ignore_errors;
    let mut crawler = Crawler::with_http(options)?;
    crawler.crawl(&urls);
    let had_errors = crawler.had_errors();
    let book = crawler.into_book()?;

    let output = cli.output.clone().unwrap_or_else(|| {
        PathBuf::from(default_output_file_name(
            book.metadata.creator.as_deref(),
            book.metadata.title.as_deref(),
            &urls[0],
        ))
    });

    if had_errors {
        print_error_message(&format!("Errors downloading E-Book: {}", output.display()));
        if !ignore_errors {
            return Err(ShelfError::IncompleteBook);
        }
    } else {
        print_info_message(&format!("Downloaded E-Book: {}", output.display()));
    }

    write_archive_to_path(&book, &output)
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        print_error_message(&format!("Error: {e}"));
        process::exit(1);
    }
}
