use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ovc",
    about = "Onchain Version Control — ledger-backed repositories over a blob store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "ovc.toml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a repository with an empty root commit on main
    Init(InitArgs),
    /// Show the targeted repository's record
    Status(StatusArgs),
    /// Upload files and record a commit
    Commit(CommitArgs),
    /// Show branch history, newest first
    Log(LogArgs),
    /// Materialize a snapshot into a directory
    Checkout(CheckoutArgs),
    /// Show changed paths between two commits
    Diff(DiffArgs),
    /// Print one file's content at a revision
    Cat(CatArgs),
    /// Create a branch pointing at an existing commit
    Branch(BranchArgs),
    /// List repositories owned by the configured author
    Repos(ReposArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Repository name.
    pub name: String,
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct CommitArgs {
    /// Files to include in the snapshot.
    pub paths: Vec<String>,
    #[arg(short, long)]
    pub message: String,
    #[arg(short, long, default_value = "main")]
    pub branch: String,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(default_value = "main")]
    pub branch: String,
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Branch name or commit id.
    pub target: String,
    /// Destination directory.
    #[arg(default_value = ".")]
    pub dest: String,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Older commit id.
    pub from: String,
    /// Newer commit id.
    pub to: String,
}

#[derive(Args)]
pub struct CatArgs {
    /// Path within the snapshot.
    pub path: String,
    /// Branch name or commit id to read at.
    #[arg(long, default_value = "main")]
    pub rev: String,
}

#[derive(Args)]
pub struct BranchArgs {
    /// New branch name.
    pub name: String,
    /// Commit id the branch should point at; defaults to the head of main.
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Args)]
pub struct ReposArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["ovc", "init", "myrepo"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.name, "myrepo");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn init_requires_a_name() {
        assert!(Cli::try_parse_from(["ovc", "init"]).is_err());
    }

    #[test]
    fn parse_commit() {
        let cli =
            Cli::try_parse_from(["ovc", "commit", "a.txt", "src/lib.rs", "-m", "hello"]).unwrap();
        if let Command::Commit(args) = cli.command {
            assert_eq!(args.paths, vec!["a.txt", "src/lib.rs"]);
            assert_eq!(args.message, "hello");
            assert_eq!(args.branch, "main");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_commit_on_branch() {
        let cli =
            Cli::try_parse_from(["ovc", "commit", "f", "-m", "x", "--branch", "dev"]).unwrap();
        if let Command::Commit(args) = cli.command {
            assert_eq!(args.branch, "dev");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn commit_requires_a_message() {
        assert!(Cli::try_parse_from(["ovc", "commit", "a.txt"]).is_err());
    }

    #[test]
    fn parse_log_with_limit() {
        let cli = Cli::try_parse_from(["ovc", "log", "dev", "-n", "5"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert_eq!(args.branch, "dev");
            assert_eq!(args.limit, 5);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn log_defaults_to_main() {
        let cli = Cli::try_parse_from(["ovc", "log"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert_eq!(args.branch, "main");
            assert_eq!(args.limit, 20);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_checkout() {
        let cli = Cli::try_parse_from(["ovc", "checkout", "main", "/tmp/work"]).unwrap();
        if let Command::Checkout(args) = cli.command {
            assert_eq!(args.target, "main");
            assert_eq!(args.dest, "/tmp/work");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_cat_at_rev() {
        let cli = Cli::try_parse_from(["ovc", "cat", "a.txt", "--rev", "dev"]).unwrap();
        if let Command::Cat(args) = cli.command {
            assert_eq!(args.path, "a.txt");
            assert_eq!(args.rev, "dev");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_branch_from_commit() {
        let cli = Cli::try_parse_from(["ovc", "branch", "dev", "--from", "0xabc"]).unwrap();
        if let Command::Branch(args) = cli.command {
            assert_eq!(args.name, "dev");
            assert_eq!(args.from.as_deref(), Some("0xabc"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["ovc", "status", "--config", "/etc/ovc.toml"]).unwrap();
        assert_eq!(cli.config, "/etc/ovc.toml");
    }
}
