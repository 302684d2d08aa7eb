//! EcoNexus CLI: run the maintenance daemon or operate on the proposal store.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use econexus_governance::{
    NewProposal, ProposalFilter, ProposalStore, ProposalUpdate, RateLimitProfile,
};
use econexus_node::{DaoNode, NodeConfig};
use econexus_types::{Clock, ProposalId, ProposalStatus, SystemClock, VoteChoice, WalletAddress};
use econexus_utils::{format_duration_ms, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "econexus", about = "EcoNexus DAO proposal store")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "ECONEXUS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the LMDB environment.
    #[arg(long, global = true, env = "ECONEXUS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "ECONEXUS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "ECONEXUS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Rate-limit preset: "standard" or "development".
    #[arg(long, global = true, env = "ECONEXUS_RATE_LIMITS")]
    rate_limits: Option<RateLimitProfile>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run periodic maintenance until SIGINT/SIGTERM.
    Run,
    /// Print the effective configuration as TOML.
    Config,
    /// Submit a new proposal.
    Submit(SubmitArgs),
    /// Cast a vote.
    Vote {
        id: ProposalId,
        choice: VoteChoice,
        #[arg(long)]
        voter: WalletAddress,
        /// Transaction id recorded with the vote. Generated when absent.
        #[arg(long)]
        tx_id: Option<String>,
    },
    /// List proposals.
    List {
        #[arg(long)]
        status: Option<ProposalStatus>,
        #[arg(long)]
        creator: Option<WalletAddress>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Only proposals marked as favorites.
        #[arg(long)]
        favorites: bool,
    },
    /// Show one proposal.
    Show { id: ProposalId },
    /// Vote tally of one proposal.
    Votes { id: ProposalId },
    /// Whether `voter` has voted on each of the given proposals.
    State {
        #[arg(long)]
        voter: WalletAddress,
        #[arg(required = true)]
        ids: Vec<ProposalId>,
    },
    /// Voting history of an address, most recent first.
    History { voter: WalletAddress },
    /// Submission limits and current usage of an address.
    Limits { address: WalletAddress },
    /// Expire overdue proposals and remove old unpreserved ones.
    Cleanup {
        /// Retention in days. Defaults to the configured value.
        #[arg(long)]
        days: Option<u64>,
    },
    /// Compact storage if it exceeds the budget.
    Compact,
    /// Delete a proposal (creator only, no votes yet).
    Delete {
        id: ProposalId,
        #[arg(long)]
        requester: WalletAddress,
    },
    /// Edit a proposal (creator only, no votes yet).
    Update(UpdateArgs),
    /// Dashboard counts.
    Stats {
        #[arg(long)]
        user: Option<WalletAddress>,
    },
    /// Estimated environmental impact of active and passed proposals.
    Impact,
    /// Manage favorite proposals.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Remove stored data.
    Reset {
        #[arg(value_enum)]
        target: ResetTarget,
    },
}

#[derive(clap::Args)]
struct SubmitArgs {
    /// Proposal id. Defaults to the current time in milliseconds.
    #[arg(long)]
    id: Option<ProposalId>,
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    creator: WalletAddress,
    #[arg(long)]
    funding: f64,
    #[arg(long, default_value = "other")]
    category: String,
    /// Voting period in days from now.
    #[arg(long, default_value_t = 7)]
    days: u64,
    #[arg(long)]
    ai_score: Option<f64>,
    #[arg(long)]
    expected_impact: Option<String>,
    #[arg(long)]
    location: Option<String>,
}

#[derive(clap::Args)]
struct UpdateArgs {
    id: ProposalId,
    #[arg(long)]
    requester: WalletAddress,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    funding: Option<f64>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    expected_impact: Option<String>,
    #[arg(long)]
    location: Option<String>,
}

#[derive(clap::Subcommand)]
enum FavoritesAction {
    Add { id: ProposalId },
    Remove { id: ProposalId },
    /// Flip a proposal's favorite mark.
    Toggle { id: ProposalId },
    /// Favorite proposals still in the store.
    List,
    Stats,
    Clear,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ResetTarget {
    Proposals,
    Votes,
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Run => run_daemon(config).await,
        command => {
            let node = DaoNode::open(config)?;
            let result = execute(node.store(), command);
            node.close()?;
            result
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(profile) = cli.rate_limits {
        config.rate_limit_profile = profile;
        config.rate_limits = None;
    }
    Ok(config)
}

async fn run_daemon(config: NodeConfig) -> anyhow::Result<()> {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        interval_secs = config.maintenance_interval_secs,
        "starting EcoNexus daemon"
    );
    let mut node = DaoNode::open(config)?;
    node.start();
    node.shutdown_controller().wait_for_signal().await;
    node.stop().await?;
    tracing::info!("EcoNexus daemon exited cleanly");
    Ok(())
}

fn execute(store: &ProposalStore, command: Command) -> anyhow::Result<()> {
    let now = SystemClock.now();
    match command {
        Command::Run | Command::Config => anyhow::bail!("command does not operate on the store"),
        Command::Submit(args) => {
            let input = NewProposal {
                id: args.id.unwrap_or(ProposalId::new(now.as_millis())),
                title: args.title,
                description: args.description,
                creator: args.creator,
                funding_amount: args.funding,
                category: args.category,
                end_time: now.plus_days(args.days),
                ai_score: args.ai_score,
                expected_impact: args.expected_impact,
                location: args.location,
            };
            print_json(&store.try_submit_proposal(input)?)
        }
        Command::Vote {
            id,
            choice,
            voter,
            tx_id,
        } => {
            let tx_id = tx_id.unwrap_or_else(|| format!("LOCAL-{id}-{}", now.as_millis()));
            print_json(&store.cast_vote(id, choice, &voter, &tx_id)?)
        }
        Command::List {
            status,
            creator,
            category,
            offset,
            limit,
            favorites,
        } => {
            let mut filter = ProposalFilter::new().offset(offset).limit(limit);
            filter.status = status;
            filter.creator = creator;
            filter.category = category;
            let mut proposals = store.get_proposals(&filter);
            if favorites {
                proposals = store.favorites().filter_favorites(&proposals);
            }
            print_json(&proposals)
        }
        Command::Show { id } => {
            let proposal = store
                .get_proposal(id)
                .with_context(|| format!("proposal {id} not found"))?;
            print_json(&proposal)
        }
        Command::Votes { id } => {
            let tally = store
                .get_proposal_votes(id)
                .with_context(|| format!("proposal {id} not found"))?;
            print_json(&tally)
        }
        Command::State { voter, ids } => print_json(&store.get_batch_voting_states(&ids, &voter)),
        Command::History { voter } => print_json(&store.get_user_voting_history(&voter)),
        Command::Limits { address } => {
            let limits = store.get_user_proposal_limits(&address);
            let wait_ms = limits.can_submit_next.as_millis().saturating_sub(now.as_millis());
            if wait_ms > 0 {
                tracing::info!(wait = %format_duration_ms(wait_ms), "next submission not yet allowed");
            }
            print_json(&limits)
        }
        Command::Cleanup { days } => {
            let report = match days {
                Some(days) => store.cleanup_expired_proposals(days),
                None => store.cleanup_expired(),
            };
            print_json(&report)
        }
        Command::Compact => print_json(&store.enforce_storage_limits()),
        Command::Delete { id, requester } => {
            store.delete_proposal(id, &requester)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::Update(args) => {
            let current = store
                .get_proposal(args.id)
                .with_context(|| format!("proposal {} not found", args.id))?;
            let update = ProposalUpdate {
                id: args.id,
                title: args.title.unwrap_or(current.title),
                description: args.description.unwrap_or(current.description),
                funding_amount: args.funding.unwrap_or(current.funding_amount),
                category: args.category.unwrap_or(current.category),
                expected_impact: args.expected_impact,
                location: args.location,
            };
            store.update_proposal(update, &args.requester)?;
            print_json(&store.get_proposal(args.id))
        }
        Command::Stats { user } => print_json(&store.get_stats(user.as_ref())),
        Command::Impact => print_json(&store.get_impact_metrics()),
        Command::Favorites { action } => favorites(store, action),
        Command::Reset { target } => {
            match target {
                ResetTarget::Proposals => store.clear_all_proposals(),
                ResetTarget::Votes => store.clear_all_votes(),
                ResetTarget::All => store.clear_all_data(),
            }
            Ok(())
        }
    }
}

fn favorites(store: &ProposalStore, action: FavoritesAction) -> anyhow::Result<()> {
    let favorites = store.favorites();
    match action {
        FavoritesAction::Add { id } => favorites.add(id),
        FavoritesAction::Remove { id } => favorites.remove(id),
        FavoritesAction::Toggle { id } => {
            let now_favorite = favorites.toggle(id);
            return print_json(&serde_json::json!({ "id": id, "favorite": now_favorite }));
        }
        FavoritesAction::List => {
            let all = store.get_proposals(&ProposalFilter::new());
            return print_json(&favorites.filter_favorites(&all));
        }
        FavoritesAction::Stats => return print_json(&favorites.stats()),
        FavoritesAction::Clear => favorites.clear(),
    }
    print_json(&favorites.favorites())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use econexus_types::time::MS_PER_DAY;
    use econexus_types::Timestamp;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::parse_from([
            "econexus",
            "--data-dir",
            "/tmp/econexus-test",
            "--rate-limits",
            "dev",
            "--log-format",
            "json",
            "stats",
        ]);
        let config = load_config(&cli).expect("config");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/econexus-test"));
        assert_eq!(config.rate_limit_profile, RateLimitProfile::Development);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn vote_arguments_parse_domain_types() {
        let cli = Cli::parse_from(["econexus", "vote", "42", "yes", "--voter", "ALICE"]);
        match cli.command {
            Command::Vote { id, choice, voter, tx_id } => {
                assert_eq!(id, ProposalId::new(42));
                assert_eq!(choice, VoteChoice::For);
                assert_eq!(voter, WalletAddress::new("ALICE"));
                assert_eq!(tx_id, None);
            }
            _ => panic!("expected vote"),
        }
    }

    #[test]
    fn default_voting_period_is_a_week() {
        let cli = Cli::parse_from([
            "econexus", "submit", "--title", "Dune restoration", "--creator", "ALICE",
            "--funding", "500",
        ]);
        match cli.command {
            Command::Submit(args) => {
                assert_eq!(args.days, 7);
                assert_eq!(args.category, "other");
                assert_eq!(Timestamp::EPOCH.plus_days(args.days).as_millis(), 7 * MS_PER_DAY);
            }
            _ => panic!("expected submit"),
        }
    }
}
