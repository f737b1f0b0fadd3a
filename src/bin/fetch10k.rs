use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgar10k::logging::setup_logging;
use edgar10k::{
    CompanyDirectory, Edgar, EdgarConfig, Filing10KResult, FilingOperations, StaticDirectory,
    TenKLookup,
};
use std::ffi::OsString;
use std::process::ExitCode;

const MAX_LISTED: usize = 10;

#[derive(Debug, Parser)]
#[command(name = "fetch10k", version)]
#[command(about = "Fetch the most recent 10-K filing of a public company from SEC EDGAR")]
#[command(arg_required_else_help = true, args_conflicts_with_subcommands = true)]
#[command(after_help = "\
EXAMPLES:
  fetch10k AAPL              Look up by ticker symbol
  fetch10k Apple             Look up by company name
  fetch10k 320193            Look up by CIK
  fetch10k search micro      List matching companies

ENVIRONMENT:
  EDGAR_USER_AGENT    Identifying user agent sent to SEC.gov (\"AppName you@example.com\")
  EDGAR_TIMEOUT_SECS  Per-request timeout (default 30)
  EDGAR_MAX_RETRIES   Retries after transient failures (default 0)
  RUST_LOG            Log filter (default warn)

Only filing metadata is shown; financial statement data is not parsed.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Ticker symbol, company name or CIK
    #[arg(num_args = 1..)]
    identifier: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List companies whose ticker or name matches the query
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

fn print_report<F: FilingOperations>(report: &Filing10KResult, filings: &F) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("COMPANY: {}", report.company.display_name);
    println!("CIK: {}", report.company.registry_id);
    if let Some(ticker) = &report.company.ticker_symbol {
        println!("TICKER: {ticker}");
    }
    println!("{rule}");

    if let Some(filing) = &report.latest_filing {
        println!("\nLATEST 10-K FILING");
        println!("{}", "-".repeat(40));
        println!("Filing Date:      {}", filing.filing_date);
        println!("Form Type:        {}", filing.form_type);
        println!("Accession Number: {}", filing.accession_number);
        println!("Primary Document: {}", filing.primary_document);
        println!("File Size:        {:.1} KB", filing.size_bytes as f64 / 1024.0);
        if let Some(report_date) = &filing.report_date {
            println!("Report Date:      {report_date}");
        }
        if let Some(url) = report.document_url(filings) {
            println!("Document URL:     {url}");
        }
    }

    println!("\nNOTE: only filing metadata is shown; financial data would require XBRL parsing.");
    println!("{rule}");
}

fn print_search<F: FilingOperations, D: CompanyDirectory>(lookup: &TenKLookup<F, D>, query: &str) {
    println!("Searching for companies matching: \"{query}\"");
    let companies = match lookup.search(query) {
        Ok(companies) => companies,
        Err(e) => {
            eprintln!("Error searching for companies: {e}");
            return;
        }
    };

    if companies.is_empty() {
        println!("No companies found matching your search.");
        return;
    }

    println!("\nFound {} companies:", companies.len());
    for (index, company) in companies.iter().take(MAX_LISTED).enumerate() {
        println!(
            "{}. {} ({}) - CIK: {}",
            index + 1,
            company.display_name,
            company.ticker_symbol.as_deref().unwrap_or("N/A"),
            company.registry_id
        );
    }
    if companies.len() > MAX_LISTED {
        println!("... and {} more results.", companies.len() - MAX_LISTED);
    }
}

/// Accepts the `search` keyword in any letter case.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    if let Some(keyword) = args.get_mut(1).filter(|a| a.eq_ignore_ascii_case("search")) {
        *keyword = OsString::from("search");
    }
    args
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = EdgarConfig::from_env().context("invalid EDGAR_* configuration")?;
    let edgar = Edgar::with_config(config).context("failed to create Edgar client")?;
    let lookup = TenKLookup::new(edgar, StaticDirectory::new());

    if let Some(Command::Search { query }) = cli.command {
        print_search(&lookup, query.join(" ").trim());
        return Ok(ExitCode::SUCCESS);
    }

    let input = cli.identifier.join(" ");
    let input = input.trim();
    println!("Fetching 10-K data for: {input}");

    match lookup.most_recent_10k(input).await {
        Ok(report) => {
            print_report(&report, lookup.filings());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error fetching 10-K data: {e}");
            println!("\nTrying to find similar companies...");
            print_search(&lookup, input);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    setup_logging("warn");

    match run(Cli::parse_from(normalize_args(std::env::args_os()))).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Application error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn identifier_words_are_collected() {
        let cli = Cli::try_parse_from(["fetch10k", "Johnson", "&", "Johnson"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.identifier.join(" "), "Johnson & Johnson");
    }

    #[test]
    fn search_subcommand() {
        let cli = Cli::try_parse_from(["fetch10k", "search", "micro", "soft"]).unwrap();
        match cli.command {
            Some(Command::Search { query }) => assert_eq!(query, vec!["micro", "soft"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_keyword_ignores_case() {
        for keyword in ["SEARCH", "Search"] {
            let args = normalize_args(["fetch10k", keyword, "apple"].map(OsString::from));
            let cli = Cli::try_parse_from(args).unwrap();
            match cli.command {
                Some(Command::Search { query }) => assert_eq!(query, vec!["apple"]),
                other => panic!("unexpected command for {keyword}: {other:?}"),
            }
        }
    }

    #[test]
    fn search_as_later_word_stays_identifier() {
        let args = normalize_args(["fetch10k", "Deep", "Search"].map(OsString::from));
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.identifier, vec!["Deep", "Search"]);
    }

    #[test]
    fn search_requires_query() {
        assert!(Cli::try_parse_from(["fetch10k", "search"]).is_err());
    }

    #[test]
    fn no_arguments_shows_help() {
        let err = Cli::try_parse_from(["fetch10k"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }
}
