//! yearreview - AI coding assistant Year in Review CLI
//!
//! Collects usage logs from local tools, pre-fetched directories and remote
//! machines, merges them, and writes a static HTML report.

mod report;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use yearreview_core::analytics::ReportPeriod;
use yearreview_core::format::{format_duration_ms, format_number, format_number_full};
use yearreview_core::ingest::{CollectOptions, DataPathSpec};
use yearreview_core::{aggregate, AggregatedView, AliasMap, Config, Error, SourceCollector, Tool};

use report::{generate_html_report, ReportContext};

#[derive(Parser, Debug)]
#[command(name = "yearreview")]
#[command(about = "Year in Review for your AI coding assistants")]
#[command(version)]
struct Args {
    /// Include a remote machine's data (user@host, fetched with rsync); repeatable
    #[arg(long, value_name = "REMOTE")]
    remote: Vec<String>,

    /// Include a remote machine and skip local data
    #[arg(long, value_name = "REMOTE")]
    remote_only: Vec<String>,

    /// Include a pre-fetched Claude Code directory, optionally named (PATH[:NAME]); repeatable
    #[arg(long, value_name = "PATH[:NAME]")]
    data_path: Vec<String>,

    /// Merge sources under one name (e.g. "laptop=me,desktop=me")
    #[arg(long, value_name = "MAP")]
    merge_sources: Option<String>,

    /// Print the aggregated data as JSON instead of writing a report
    #[arg(long)]
    json: bool,

    /// Year drawn in the report calendar (default: current year)
    #[arg(long)]
    year: Option<i32>,

    /// Local tools to scan (comma-separated: claude_code,codex,opencode)
    #[arg(long, value_delimiter = ',')]
    tools: Vec<Tool>,

    /// Where to write the HTML report
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Open the written report in the default browser
    #[arg(long)]
    open: bool,

    /// Config file (default: ~/.config/yearreview/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn collect_options(&self) -> CollectOptions {
        let mut remotes = self.remote.clone();
        remotes.extend(self.remote_only.iter().cloned());

        CollectOptions {
            remotes,
            data_paths: self.data_path.iter().map(|s| DataPathSpec::parse(s)).collect(),
            remote_only: !self.remote_only.is_empty(),
            tools: if self.tools.is_empty() {
                Tool::ALL.to_vec()
            } else {
                self.tools.clone()
            },
        }
    }

    fn period(&self) -> ReportPeriod {
        self.year
            .map(ReportPeriod::Year)
            .unwrap_or_else(ReportPeriod::current_year)
    }

    fn aliases(&self, config: &Config) -> AliasMap {
        let mut aliases = config.aliases.clone();
        if let Some(map) = &self.merge_sources {
            // Parsing alias pairs cannot fail
            if let Ok(flag) = map.parse::<AliasMap>() {
                aliases.extend(flag);
            }
        }
        aliases
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    let _log_guard = yearreview_core::logging::init(&config.logging).ok();

    let options = args.collect_options();
    if !options.remotes.is_empty() {
        eprintln!("Fetching data from {} remote(s)...", options.remotes.len());
    }

    let collector = SourceCollector::from_config(options.clone(), &config);
    if !options.remote_only {
        let installed: Vec<_> = collector
            .installed_tools()
            .iter()
            .map(|t| t.display_name())
            .collect();
        if !installed.is_empty() {
            eprintln!("Scanning local data: {}", installed.join(", "));
        }
    }
    let records = match collector.collect() {
        Ok(records) => records,
        Err(Error::NoData) => {
            eprintln!("No usage data found.");
            eprintln!("Expected data in ~/.claude, ~/.codex or ~/.local/share/opencode");
            if !options.remotes.is_empty() {
                eprintln!("Remote fetch may have failed - check SSH connectivity");
            }
            anyhow::bail!(Error::NoData);
        }
        Err(e) => return Err(e).context("failed to collect usage data"),
    };

    let aliases = args.aliases(&config);
    eprintln!("Aggregating data from {} source(s)...", records.len());
    let view = aggregate(records, &aliases);

    if args.json {
        println!("{}", view.to_json_pretty()?);
        return Ok(());
    }

    let ctx = ReportContext {
        period: args.period(),
        today: Local::now().date_naive(),
    };
    let html = generate_html_report(&view, &ctx);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.report.output_path());
    std::fs::write(&output, html)
        .with_context(|| format!("failed to write report to {}", output.display()))?;
    tracing::info!(path = %output.display(), "Report written");

    print_terminal(&view, &output);
    if args.open {
        open_report(&output);
    }
    Ok(())
}

/// Program that opens a file with the desktop's default handler.
fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

fn open_report(path: &std::path::Path) {
    let result = std::process::Command::new(opener())
        .arg(path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn();
    if let Err(e) = result {
        tracing::warn!(error = %e, path = %path.display(), "Could not open report");
        eprintln!("Could not open the report automatically: {}", e);
    }
}

fn print_terminal(view: &AggregatedView, output: &std::path::Path) {
    println!();
    println!("Report generated: {}", output.display());
    println!();

    if view.sources.len() > 1 {
        println!("SOURCES");
        for source in &view.sources {
            let stats = view.per_source_stats.get(source).copied().unwrap_or_default();
            println!(
                "   {:<20} {:>10} tokens  {:>4} days  {:>5} sessions",
                source,
                format_number(stats.tokens),
                stats.days,
                stats.sessions
            );
        }
        println!();
    }

    println!("SUMMARY");
    println!(
        "   Tokens:   {:<14} Sessions: {}",
        format_number_full(view.total_tokens),
        view.total_sessions
    );
    println!(
        "   Messages: {:<14} Days active: {}",
        view.total_messages, view.streaks.total_days
    );
    if let Some(longest) = &view.longest_session {
        println!(
            "   Longest session: {} ({} messages)",
            format_duration_ms(longest.duration_ms),
            longest.message_count
        );
    }
    println!();

    println!("STREAKS");
    println!(
        "   Current:  {} day{}",
        view.streaks.current_streak,
        if view.streaks.current_streak == 1 { "" } else { "s" }
    );
    println!(
        "   Longest:  {} day{}",
        view.streaks.longest_streak,
        if view.streaks.longest_streak == 1 { "" } else { "s" }
    );
    println!();

    let models = view.models_by_tokens();
    if !models.is_empty() {
        println!("TOP MODELS");
        for (i, (name, usage)) in models.iter().take(5).enumerate() {
            println!("   {}. {:<32} {}", i + 1, name, format_number(usage.total));
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_only_implies_remote() {
        let args = Args::parse_from(["yearreview", "--remote", "a@x", "--remote-only", "b@y"]);
        let options = args.collect_options();
        assert_eq!(options.remotes, vec!["a@x".to_string(), "b@y".to_string()]);
        assert!(options.remote_only);
    }

    #[test]
    fn test_tools_flag() {
        let args = Args::parse_from(["yearreview", "--tools", "codex,opencode"]);
        assert_eq!(args.collect_options().tools, vec![Tool::Codex, Tool::OpenCode]);

        let args = Args::parse_from(["yearreview"]);
        assert_eq!(args.collect_options().tools, Tool::ALL.to_vec());
        assert!(!args.collect_options().remote_only);
    }

    #[test]
    fn test_open_flag() {
        assert!(Args::parse_from(["yearreview", "--open"]).open);
        assert!(!Args::parse_from(["yearreview"]).open);
        assert!(["open", "xdg-open"].contains(&opener()));
    }

    #[test]
    fn test_year_flag_picks_period() {
        let args = Args::parse_from(["yearreview", "--year", "2023"]);
        assert_eq!(args.period(), ReportPeriod::Year(2023));

        let args = Args::parse_from(["yearreview"]);
        assert_eq!(args.period(), ReportPeriod::current_year());
    }

    #[test]
    fn test_data_path_flag() {
        let args = Args::parse_from(["yearreview", "--data-path", "/backup/.claude:work"]);
        let options = args.collect_options();
        assert_eq!(options.data_paths.len(), 1);
        assert_eq!(options.data_paths[0].name(), "work");
    }

    #[test]
    fn test_merge_flag_overrides_config_aliases() {
        let mut config = Config::default();
        config.aliases.insert("laptop", "old");
        config.aliases.insert("desktop", "me");

        let args = Args::parse_from(["yearreview", "--merge-sources", "laptop=me"]);
        let aliases = args.aliases(&config);
        assert_eq!(aliases.resolve("laptop"), "me");
        assert_eq!(aliases.resolve("desktop"), "me");
    }
}
