use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use issuescout_api::GitHubClient;
use issuescout_cache::{LanguageStore, RequestCache};
use issuescout_core::bounty_feed::{BountyFeed, BountyFeedConfig};
use issuescout_core::contributor_feed::ContributorTracker;
use issuescout_core::freshness::Freshness;
use issuescout_core::language::filter_by_language;
use issuescout_core::live_feed::LiveFeed;
use issuescout_core::matcher::IssueMatch;
use issuescout_core::personalized::PersonalizedFeed;
use issuescout_core::repo_languages::RepoLanguages;
use issuescout_core::validate::sanitize_search_query;
use issuescout_core::{
    difficulty, Config, DifficultyLevel, FilterSelection, GitHubIssueSource, Issue, IssueSearch,
    LastActivity, NaturalLanguage,
};
use issuescout_api::ScheduleConfig;

#[derive(Parser)]
#[command(name = "issuescout")]
#[command(version, about = "Find open GitHub issues worth picking up", long_about = None)]
struct Cli {
    /// GitHub personal access token; raises the search rate limits a lot
    #[arg(long, env = "GITHUB_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search open, unassigned issues
    Search {
        /// Free-text search term
        term: Option<String>,

        /// Difficulty filter: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Programming language (language: qualifier)
        #[arg(long)]
        language: Option<String>,

        /// Issue category labels; repeatable. "all" disables the filter
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Extra labels to require; repeatable
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Issue type label (bug, enhancement, ...)
        #[arg(long = "type")]
        issue_type: Option<String>,

        /// Framework keyword (react, django, ...)
        #[arg(long)]
        framework: Option<String>,

        /// Activity window: last-week, last-month, last-3months, active
        #[arg(long)]
        activity: Option<String>,

        /// Only show issues written in these languages (en, zh, ...); repeatable
        #[arg(long = "lang")]
        natural_languages: Vec<String>,

        /// Show repository languages next to each result (extra API calls)
        #[arg(long)]
        repo_languages: bool,

        /// Print raw JSON instead of the formatted list
        #[arg(long)]
        json: bool,
    },
    /// Show the bounty feed
    Bounty {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,

        /// Seconds between refreshes in watch mode
        #[arg(long, default_value_t = 120)]
        interval: u64,
    },
    /// Personalized recommendations for a GitHub user
    For {
        /// GitHub username to build the profile from
        username: String,

        /// How many recommendations to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Topics to favor in the ranking; repeatable
        #[arg(long = "topic")]
        topics: Vec<String>,
    },
    /// Contributor stats for a GitHub user
    Profile {
        /// GitHub username
        username: String,

        /// Print raw JSON instead of the formatted view
        #[arg(long)]
        json: bool,
    },
    /// Live feed of public GitHub activity
    Live {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,

        /// How many activities to show
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "issuescout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    // CLI/env token wins over the config file
    let token = cli.token.or_else(|| config.github.token.clone());
    let client = GitHubClient::with_base_url(token, config.github.api_url.clone());

    match cli.command {
        Commands::Search {
            term,
            difficulty,
            language,
            categories,
            labels,
            issue_type,
            framework,
            activity,
            natural_languages,
            repo_languages,
            json,
        } => {
            let selection = FilterSelection {
                search_term: term.map(|t| sanitize_search_query(&t)),
                labels,
                categories,
                language,
                difficulty: difficulty
                    .as_deref()
                    .map(str::parse::<DifficultyLevel>)
                    .transpose()?,
                issue_type,
                framework,
                last_activity: activity
                    .as_deref()
                    .map(str::parse::<LastActivity>)
                    .transpose()?,
            };

            let allowed: Vec<NaturalLanguage> = natural_languages
                .iter()
                .map(|l| l.parse())
                .collect::<Result<_, _>>()?;

            run_search(&config, client, selection, &allowed, repo_languages, json).await?;
        }
        Commands::Bounty { watch, interval } => {
            run_bounty(&config, client, watch, interval).await?;
        }
        Commands::For {
            username,
            limit,
            topics,
        } => {
            run_personalized(&config, client, &username, limit, topics).await?;
        }
        Commands::Profile { username, json } => {
            run_profile(client, &username, json).await?;
        }
        Commands::Live { watch, limit } => {
            run_live(&config, client, watch, limit).await?;
        }
    }

    Ok(())
}

async fn run_search(
    config: &Config,
    client: GitHubClient,
    selection: FilterSelection,
    allowed: &[NaturalLanguage],
    with_repo_languages: bool,
    json: bool,
) -> anyhow::Result<()> {
    let query = selection.build();
    tracing::info!("Query: {}", query);

    let client = Arc::new(client);
    let cache = Arc::new(RequestCache::with_default_ttl(Duration::from_secs(
        config.cache.request_ttl_minutes * 60,
    )));
    let search = IssueSearch::new(
        Box::new(GitHubIssueSource::new((*client).clone())),
        cache,
        config.feeds.per_page,
    );

    let outcome = search.search(&query).await?;
    let issues = filter_by_language(outcome.issues, allowed);

    if json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }

    if issues.is_empty() {
        println!("No open unassigned issues matched. Try loosening the filters.");
        return Ok(());
    }

    let languages = if with_repo_languages {
        let store = LanguageStore::open(
            Config::language_db_path()?
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("language db path is not valid UTF-8"))?,
        )?
        .with_ttl_secs(config.cache.language_ttl_hours as i64 * 3600);
        Some(RepoLanguages::new(client, store))
    } else {
        None
    };

    println!(
        "{} of {} matching issues{}:\n",
        issues.len(),
        outcome.total_count,
        if outcome.from_cache { " (cached)" } else { "" }
    );
    for (i, issue) in issues.iter().enumerate() {
        let repo_langs = match &languages {
            Some(lookup) => lookup.languages_for(&issue.repository_url).await,
            None => vec![],
        };
        print_issue(i + 1, issue, &repo_langs);
    }

    Ok(())
}

fn print_issue(index: usize, issue: &Issue, repo_languages: &[String]) {
    let freshness = Freshness::calculate(issue.updated_at, issue.created_at);
    let difficulty = difficulty::detect_difficulty(&issue.labels)
        .map(|d| format!(" [{}]", d.label()))
        .unwrap_or_default();

    println!("{:>3}. {}{}", index, issue.title, difficulty);
    if let Some(repo) = issue.repo_full_name() {
        if repo_languages.is_empty() {
            println!("     {} | {} | {} comments", repo, freshness.description, issue.comments);
        } else {
            println!(
                "     {} ({}) | {} | {} comments",
                repo,
                repo_languages.join(", "),
                freshness.description,
                issue.comments
            );
        }
    }
    if !issue.labels.is_empty() {
        let names: Vec<&str> = issue.labels.iter().map(|l| l.name.as_str()).collect();
        println!("     labels: {}", names.join(", "));
    }
    println!("     {}\n", issue.html_url);
}

async fn run_bounty(
    config: &Config,
    client: GitHubClient,
    watch: bool,
    interval: u64,
) -> anyhow::Result<()> {
    let feed = BountyFeed::new(
        Box::new(GitHubIssueSource::new(client)),
        BountyFeedConfig {
            per_page: config.feeds.per_page,
            capacity: config.feeds.capacity,
            schedule: ScheduleConfig {
                inter_query_delay_ms: config.feeds.inter_query_delay_ms,
                rate_limit_cooldown_ms: config.feeds.rate_limit_cooldown_ms,
            },
        },
    );

    let outcome = feed.refresh(false).await?;
    if outcome.fallback_used {
        println!("(none of these passed bounty verification, showing raw results)\n");
    }
    print_bounty_items(&feed.items());

    if !watch {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    ticker.tick().await; // first tick fires immediately
    loop {
        ticker.tick().await;
        match feed.refresh(true).await {
            Ok(outcome) if outcome.new_items > 0 => {
                println!("\n--- {} new bounty issues ---\n", outcome.new_items);
                print_bounty_items(&feed.items());
            }
            Ok(_) => tracing::debug!("no new bounty issues"),
            Err(e) => tracing::warn!("bounty refresh failed: {}", e),
        }
    }
}

fn print_bounty_items(items: &[Issue]) {
    if items.is_empty() {
        println!("No bounty issues right now.");
        return;
    }
    for (i, issue) in items.iter().enumerate() {
        print_issue(i + 1, issue, &[]);
    }
}

async fn run_personalized(
    config: &Config,
    client: GitHubClient,
    username: &str,
    limit: usize,
    topics: Vec<String>,
) -> anyhow::Result<()> {
    let client = Arc::new(client);
    let feed = PersonalizedFeed::new(
        Box::new(GitHubIssueSource::new((*client).clone())),
        client,
        limit.max(1).min(config.feeds.per_page as usize),
    );

    let mut profile = feed.load_profile(username).await?;
    profile.preferred_topics = topics;
    if profile.languages.is_empty() {
        println!(
            "{} has no public repos with detected languages; results are unranked.\n",
            username
        );
    } else {
        println!(
            "Matching against: {}\n",
            profile.languages.join(", ")
        );
    }

    let matches = feed.recommendations(Some(&profile)).await?;
    if matches.is_empty() {
        println!("Nothing matched the profile. Try again later, the pool rotates.");
        return Ok(());
    }

    for (i, m) in matches.iter().enumerate() {
        print_match(i + 1, m);
    }
    Ok(())
}

fn print_match(index: usize, m: &IssueMatch) {
    if m.match_score > 0 {
        println!("{:>3}. [{:>3}%] {}", index, m.match_score, m.issue.title);
    } else {
        println!("{:>3}. {}", index, m.issue.title);
    }
    if let Some(repo) = m.issue.repo_full_name() {
        println!("     {}", repo);
    }
    for reason in &m.reasons {
        println!("     - {}", reason);
    }
    println!("     {}\n", m.issue.html_url);
}

async fn run_profile(client: GitHubClient, username: &str, json: bool) -> anyhow::Result<()> {
    let tracker = ContributorTracker::new(Arc::new(client));
    let stats = tracker.fetch(username).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{} ({})", stats.username, stats.html_url);
    println!(
        "impact {}/100 | {} contributions across {} repos (last ~90 days)",
        stats.impact_score, stats.total_contributions, stats.repositories
    );
    println!(
        "issues: {} opened, {} closed | PRs: {} opened, {} merged | {} commits | {} reviews",
        stats.issues_opened,
        stats.issues_closed,
        stats.prs_opened,
        stats.prs_merged,
        stats.commits,
        stats.reviews
    );
    println!(
        "streak: {} days (longest {})\n",
        stats.current_streak, stats.longest_streak
    );

    if !stats.achievements.is_empty() {
        println!("Achievements:");
        for a in &stats.achievements {
            println!("  {} {} - {}", a.icon, a.title, a.description);
        }
        println!();
    }

    for day in stats.timeline.iter().take(7) {
        println!("{}:", day.date);
        for c in &day.contributions {
            println!("  {} ({})", c.title, c.repository);
        }
    }

    Ok(())
}

async fn run_live(
    config: &Config,
    client: GitHubClient,
    watch: bool,
    limit: usize,
) -> anyhow::Result<()> {
    let feed = LiveFeed::new(Arc::new(client), limit);

    let activities = feed.refresh().await?;
    print_activities(&activities);

    if !watch {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.feeds.live_poll_secs.max(1)));
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match feed.refresh().await {
            Ok(activities) => {
                println!("\n--- refreshed ---\n");
                print_activities(&activities);
            }
            Err(e) => tracing::warn!("live refresh failed: {}", e),
        }
    }
}

fn print_activities(activities: &[issuescout_core::live_feed::Activity]) {
    if activities.is_empty() {
        println!("The firehose is quiet. That usually means a rate limit.");
        return;
    }
    for a in activities {
        let title = a.title.as_deref().unwrap_or("");
        println!(
            "{} {} {} {} {}",
            a.created_at.format("%H:%M:%S"),
            a.actor,
            a.action,
            a.repo,
            title
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_subcommand_accepts_repeated_topics() {
        let cli = Cli::try_parse_from([
            "issuescout", "for", "octocat", "--topic", "cli", "--topic", "parser",
        ])
        .unwrap();

        match cli.command {
            Commands::For {
                username,
                limit,
                topics,
            } => {
                assert_eq!(username, "octocat");
                assert_eq!(limit, 10);
                assert_eq!(topics, vec!["cli", "parser"]);
            }
            _ => panic!("parsed the wrong subcommand"),
        }
    }
}
