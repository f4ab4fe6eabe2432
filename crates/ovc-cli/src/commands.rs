use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::DateTime;
use colored::Colorize;
use ovc_engine::{VersioningEngine, WorkingFile};
use ovc_ledger::{LedgerClient, RpcTransport};
use ovc_store::HttpBlobStore;
use ovc_types::{ChangeKind, Commit, CommitId};

use crate::cli::*;
use crate::config::CliConfig;

type Engine = VersioningEngine<HttpBlobStore, RpcTransport>;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config_path = Path::new(&cli.config).to_path_buf();
    let config = CliConfig::load(&config_path)?;

    match cli.command {
        Command::Init(args) => cmd_init(args, config, &config_path).await,
        Command::Status(_) => cmd_status(config).await,
        Command::Commit(args) => cmd_commit(args, config).await,
        Command::Log(args) => cmd_log(args, config).await,
        Command::Checkout(args) => cmd_checkout(args, config).await,
        Command::Diff(args) => cmd_diff(args, config).await,
        Command::Cat(args) => cmd_cat(args, config).await,
        Command::Branch(args) => cmd_branch(args, config).await,
        Command::Repos(_) => cmd_repos(config).await,
    }
}

fn build_engine(config: &CliConfig) -> anyhow::Result<Engine> {
    let author = config.author()?;
    let store = HttpBlobStore::new(config.publisher.as_str(), config.aggregator.as_str());
    let ledger = LedgerClient::new(RpcTransport::new(config.rpc.as_str(), author), author);
    Ok(VersioningEngine::new(store, ledger).with_retention_epochs(config.retention_epochs))
}

async fn cmd_init(args: InitArgs, mut config: CliConfig, path: &Path) -> anyhow::Result<()> {
    let engine = build_engine(&config)?;
    let (ctx, root) = engine.init(&args.name).await?;

    config.set_target(&ctx);
    config.save(path)?;

    println!(
        "{} Initialized repository {}",
        "✓".green().bold(),
        args.name.bold()
    );
    println!("  Repository: {}", ctx.repo_id.to_hex().cyan());
    println!("  Capability: {}", ctx.capability.to_hex().cyan());
    println!("  Root commit: {} on {}", root.short_hex().yellow(), "main".yellow());
    println!("  Target written to {}", path.display());
    Ok(())
}

async fn cmd_status(config: CliConfig) -> anyhow::Result<()> {
    let ctx = config.repo_context()?;
    let engine = build_engine(&config)?;
    let status = engine.status(ctx.repo_id).await?;

    println!("Repository {}", status.name.bold());
    println!("  Id: {}", status.repo_id.to_hex().cyan());
    println!("  Owner: {}", status.owner.short_hex());
    println!("  Commits: {}", status.commit_count.to_string().bold());
    Ok(())
}

async fn cmd_commit(args: CommitArgs, config: CliConfig) -> anyhow::Result<()> {
    let ctx = config.repo_context()?;
    let engine = build_engine(&config)?;

    let mut files = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let data = std::fs::read(path).with_context(|| format!("reading {path}"))?;
        files.push(WorkingFile::new(path.clone(), data));
    }

    let id = engine.commit(&ctx, &files, &args.message, &args.branch).await?;
    println!(
        "{} Committed {} file(s) to {} as {}",
        "✓".green().bold(),
        files.len(),
        args.branch.yellow(),
        id.short_hex().yellow()
    );
    Ok(())
}

async fn cmd_log(args: LogArgs, config: CliConfig) -> anyhow::Result<()> {
    let ctx = config.repo_context()?;
    let engine = build_engine(&config)?;
    let history = engine.log(ctx.repo_id, &args.branch, args.limit).await?;

    for commit in &history {
        print_commit(commit);
    }
    Ok(())
}

fn print_commit(commit: &Commit) {
    let when = DateTime::from_timestamp(commit.timestamp_secs as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| commit.timestamp_secs.to_string());
    println!(
        "{}  {}  {}",
        commit.id.short_hex().yellow().bold(),
        commit.author.short_hex().dimmed(),
        when.dimmed()
    );
    println!("  {}", commit.message);
}

async fn cmd_checkout(args: CheckoutArgs, config: CliConfig) -> anyhow::Result<()> {
    let ctx = config.repo_context()?;
    let engine = build_engine(&config)?;
    engine
        .checkout(ctx.repo_id, &args.target, Path::new(&args.dest))
        .await?;
    println!(
        "{} Checked out {} into {}",
        "✓".green().bold(),
        args.target.yellow(),
        args.dest.bold()
    );
    Ok(())
}

async fn cmd_diff(args: DiffArgs, config: CliConfig) -> anyhow::Result<()> {
    config.repo_context()?;
    let engine = build_engine(&config)?;
    let from = CommitId::from_hex(&args.from).context("older commit id")?;
    let to = CommitId::from_hex(&args.to).context("newer commit id")?;

    let changes = engine.diff(from, to).await?;
    if changes.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    for change in &changes {
        let marker = match change.kind {
            ChangeKind::Added => "+".green(),
            ChangeKind::Removed => "-".red(),
            ChangeKind::Modified => "~".yellow(),
        };
        println!("{} {}", marker, change.path);
    }
    Ok(())
}

async fn cmd_cat(args: CatArgs, config: CliConfig) -> anyhow::Result<()> {
    let ctx = config.repo_context()?;
    let engine = build_engine(&config)?;
    let bytes = engine.cat(ctx.repo_id, &args.path, &args.rev).await?;
    std::io::stdout().write_all(&bytes)?;
    Ok(())
}

async fn cmd_branch(args: BranchArgs, config: CliConfig) -> anyhow::Result<()> {
    let ctx = config.repo_context()?;
    let engine = build_engine(&config)?;

    let from = match &args.from {
        Some(hex) => CommitId::from_hex(hex).context("branch start commit id")?,
        None => engine
            .ledger()
            .get_branch_head(ctx.repo_id, "main")
            .await?
            .context("main has no head to branch from")?,
    };

    engine.create_branch(&ctx, &args.name, from).await?;
    println!(
        "{} Created branch {} at {}",
        "✓".green().bold(),
        args.name.yellow(),
        from.short_hex().yellow()
    );
    Ok(())
}

async fn cmd_repos(config: CliConfig) -> anyhow::Result<()> {
    let engine = build_engine(&config)?;
    let repos = engine
        .ledger()
        .repositories_by_owner(config.author()?)
        .await?;

    if repos.is_empty() {
        println!("No repositories.");
        return Ok(());
    }
    for repo in repos {
        match engine.status(repo).await {
            Ok(status) => println!(
                "{}  {} ({} commits)",
                repo.short_hex().cyan(),
                status.name.bold(),
                status.commit_count
            ),
            Err(_) => println!("{}  {}", repo.short_hex().cyan(), "unreadable".dimmed()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ovc_types::Address;

    #[test]
    fn engine_builds_from_default_config() {
        let config = CliConfig {
            author: Address::from_raw([3; 32]).to_hex(),
            ..Default::default()
        };
        assert!(build_engine(&config).is_ok());
    }

    #[test]
    fn mutating_commands_refuse_untargeted_config() {
        let cli = Cli::try_parse_from(["ovc", "status"]).unwrap();
        let config = CliConfig::default();
        if let Command::Status(_) = cli.command {
            assert!(config.repo_context().is_err());
        } else {
            panic!("wrong command");
        }
    }
}
