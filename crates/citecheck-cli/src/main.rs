use std::io::Write;
use std::path::{Path, PathBuf};

use citecheck_core::config_file::{self, ConfigFile};
use citecheck_core::{Citation, CitationList, Config, CrossRefClient, recompute, resolve_segments};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod output;

use output::ColorMode;

/// Citation checker - match in-text citations against a reference list
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match the in-text citations of an answer and report completeness
    Check {
        /// Path to the answer text
        #[arg(long)]
        answer: PathBuf,

        /// Path to the JSON citation list
        #[arg(long)]
        citations: PathBuf,

        /// Print the derived counts as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Look up a DOI on CrossRef and print the formatted citation
    Lookup {
        /// DOI, bare or as a https://doi.org/ URL
        doi: String,

        /// Print the BibTeX record instead of the reference line
        #[arg(long)]
        bibtex: bool,

        #[command(flatten)]
        crossref: CrossRefArgs,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Look up a DOI and append it to a JSON citation list
    Add {
        doi: String,

        /// Path to the JSON citation list (created if missing)
        #[arg(long)]
        citations: PathBuf,

        /// Question the citation belongs to
        #[arg(long, default_value = "default")]
        question_id: String,

        #[command(flatten)]
        crossref: CrossRefArgs,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the in-text marker to use for each citation
    Suggest {
        /// Path to the JSON citation list
        #[arg(long)]
        citations: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(clap::Args, Debug)]
struct CrossRefArgs {
    /// Contact address for the CrossRef polite pool
    #[arg(long)]
    mailto: Option<String>,

    /// CrossRef request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let file_config = config_file::load_config();

    match cli.command {
        Command::Check {
            answer,
            citations,
            json,
            no_color,
        } => check(
            &answer,
            &citations,
            json,
            color_mode(no_color, &file_config),
        ),
        Command::Lookup {
            doi,
            bibtex,
            crossref,
            no_color,
        } => {
            let config = resolve_config(crossref, &file_config);
            lookup(&doi, bibtex, config, color_mode(no_color, &file_config)).await
        }
        Command::Add {
            doi,
            citations,
            question_id,
            crossref,
            no_color,
        } => {
            let config = resolve_config(crossref, &file_config);
            add(
                &doi,
                &citations,
                &question_id,
                config,
                color_mode(no_color, &file_config),
            )
            .await
        }
        Command::Suggest {
            citations,
            no_color,
        } => suggest(&citations, color_mode(no_color, &file_config)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn color_mode(no_color: bool, file_config: &ConfigFile) -> ColorMode {
    let configured = file_config
        .display
        .as_ref()
        .and_then(|d| d.color)
        .unwrap_or(true);
    ColorMode(!no_color && configured)
}

/// CLI flags > env vars > config file > defaults.
fn resolve_config(args: CrossRefArgs, file_config: &ConfigFile) -> Config {
    resolve_config_with(
        args,
        std::env::var("CROSSREF_MAILTO").ok(),
        std::env::var("CROSSREF_TIMEOUT").ok(),
        file_config,
    )
}

fn resolve_config_with(
    args: CrossRefArgs,
    env_mailto: Option<String>,
    env_timeout: Option<String>,
    file_config: &ConfigFile,
) -> Config {
    let mut config = Config::default().apply_file(file_config);

    let non_empty = |m: &String| !m.trim().is_empty();
    if let Some(mailto) = args
        .mailto
        .filter(non_empty)
        .or_else(|| env_mailto.filter(non_empty))
    {
        config.crossref_mailto = Some(mailto);
    }

    let env_timeout = env_timeout.and_then(|v| match v.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            tracing::warn!(value = %v, "ignoring unparseable CROSSREF_TIMEOUT");
            None
        }
    });
    if let Some(secs) = args.timeout.or(env_timeout) {
        config.timeout_secs = secs;
    }

    tracing::debug!(?config, "resolved CrossRef configuration");
    config
}

fn read_citations(path: &Path) -> anyhow::Result<CitationList> {
    if !path.exists() {
        anyhow::bail!("Citation list not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid citation list {}: {}", path.display(), e))
}

fn write_citations(path: &Path, list: &CitationList) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(list)?;
    std::fs::write(path, content + "\n")?;
    Ok(())
}

fn check(answer: &Path, citations: &Path, json: bool, color: ColorMode) -> anyhow::Result<()> {
    if !answer.exists() {
        anyhow::bail!("Answer file not found: {}", answer.display());
    }
    let text = std::fs::read_to_string(answer)?;
    let list = read_citations(citations)?;
    let derived = recompute(&text, list.as_slice());

    let mut writer = std::io::stdout();
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&derived)?)?;
        return Ok(());
    }

    let segments = resolve_segments(&text, list.as_slice());
    output::print_marker_report(&mut writer, &segments, color)?;
    output::print_completeness(&mut writer, &derived, color)?;
    Ok(())
}

async fn lookup(doi: &str, bibtex: bool, config: Config, color: ColorMode) -> anyhow::Result<()> {
    let client = CrossRefClient::new(config);
    let new = client
        .lookup(doi)
        .await
        .map_err(|e| anyhow::anyhow!("{} [{}]", e, e.kind()))?;

    let mut writer = std::io::stdout();
    if bibtex {
        writeln!(writer, "{}", new.bibtex)?;
    } else {
        let citation = Citation::from_new(new, "", "", "");
        output::print_citation(&mut writer, &citation, color)?;
    }
    Ok(())
}

async fn add(
    doi: &str,
    citations: &Path,
    question_id: &str,
    config: Config,
    color: ColorMode,
) -> anyhow::Result<()> {
    let mut list = if citations.exists() {
        read_citations(citations)?
    } else {
        CitationList::new()
    };

    // Checked before the lookup so a duplicate costs no request.
    if list.contains_doi(doi) {
        anyhow::bail!(
            "This citation has already been added (DOI {}) [duplicate-citation]",
            citecheck_core::clean_doi(doi)
        );
    }

    let client = CrossRefClient::new(config);
    let new = client
        .lookup(doi)
        .await
        .map_err(|e| anyhow::anyhow!("{} [{}]", e, e.kind()))?;

    let citation = Citation::from_new(
        new,
        next_citation_id(&list),
        question_id,
        chrono::Utc::now().to_rfc3339(),
    );
    let added = list
        .insert(citation)
        .map_err(|e| anyhow::anyhow!("{} [{}]", e, e.kind()))?
        .clone();
    write_citations(citations, &list)?;

    let mut writer = std::io::stdout();
    output::print_added(&mut writer, &added, list.len(), color)?;
    Ok(())
}

fn suggest(citations: &Path, color: ColorMode) -> anyhow::Result<()> {
    let list = read_citations(citations)?;
    let mut writer = std::io::stdout();
    output::print_suggestions(&mut writer, list.as_slice(), color)?;
    Ok(())
}

/// Smallest `c<N>` id not already taken in the list.
fn next_citation_id(list: &CitationList) -> String {
    (1..)
        .map(|n| format!("c{}", n))
        .find(|id| list.as_slice().iter().all(|c| &c.id != id))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use citecheck_core::config_file::CrossRefConfig;

    fn flags(mailto: Option<&str>, timeout: Option<u64>) -> CrossRefArgs {
        CrossRefArgs {
            mailto: mailto.map(String::from),
            timeout,
        }
    }

    fn file(mailto: &str, timeout_secs: u64) -> ConfigFile {
        ConfigFile {
            crossref: Some(CrossRefConfig {
                mailto: Some(mailto.to_string()),
                timeout_secs: Some(timeout_secs),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let config = resolve_config_with(flags(None, None), None, None, &ConfigFile::default());
        assert_eq!(config.crossref_mailto, None);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(
            config.crossref_base_url,
            citecheck_core::DEFAULT_CROSSREF_BASE_URL
        );
    }

    #[test]
    fn config_file_overrides_defaults() {
        let config = resolve_config_with(flags(None, None), None, None, &file("file@example.org", 7));
        assert_eq!(config.crossref_mailto.as_deref(), Some("file@example.org"));
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn env_overrides_config_file() {
        let config = resolve_config_with(
            flags(None, None),
            Some("env@example.org".into()),
            Some("5".into()),
            &file("file@example.org", 7),
        );
        assert_eq!(config.crossref_mailto.as_deref(), Some("env@example.org"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn flags_override_env() {
        let config = resolve_config_with(
            flags(Some("flag@example.org"), Some(3)),
            Some("env@example.org".into()),
            Some("5".into()),
            &file("file@example.org", 7),
        );
        assert_eq!(config.crossref_mailto.as_deref(), Some("flag@example.org"));
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn unparseable_env_timeout_falls_through() {
        let config = resolve_config_with(
            flags(None, None),
            None,
            Some("ten".into()),
            &file("file@example.org", 7),
        );
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn blank_mailto_falls_through() {
        let config = resolve_config_with(
            flags(Some("  "), None),
            Some(String::new()),
            None,
            &file("file@example.org", 7),
        );
        assert_eq!(config.crossref_mailto.as_deref(), Some("file@example.org"));
    }
}
