//! gh-vfs - an encrypted file system in a GitHub repository.
//!
//! Every file is sealed with AES-256-GCM before it is committed, so the
//! repository only ever holds ciphertext.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use gh_vfs::{Committer, GitHubVfs, VfsConfig};
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gh-vfs")]
#[command(author, version)]
#[command(
    about = "Encrypted virtual file system on a GitHub repository",
    long_about = "Reads and writes files in a GitHub repository through its contents API, encrypting every file with a shared secret."
)]
struct Cli {
    #[command(flatten)]
    connect: ConnectArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectArgs {
    /// JSON configuration file; flags override its values
    #[arg(long, global = true, env = "GH_VFS_CONFIG")]
    config: Option<PathBuf>,

    /// Personal access token
    #[arg(long, global = true, env = "GH_VFS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository owner
    #[arg(long, global = true, env = "GH_VFS_OWNER")]
    owner: Option<String>,

    /// Repository name
    #[arg(long, global = true, env = "GH_VFS_REPO")]
    repo: Option<String>,

    /// Branch to operate on (default: repository default branch)
    #[arg(long, global = true, env = "GH_VFS_BRANCH")]
    branch: Option<String>,

    /// Encryption secret (prompted for when absent)
    #[arg(long, global = true, env = "GH_VFS_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Committer name
    #[arg(long, global = true, env = "GH_VFS_COMMITTER_NAME")]
    committer_name: Option<String>,

    /// Committer email
    #[arg(long, global = true, env = "GH_VFS_COMMITTER_EMAIL")]
    committer_email: Option<String>,

    /// REST endpoint (for GitHub Enterprise)
    #[arg(long, global = true, env = "GH_VFS_API_URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    Ls {
        /// Directory to list (default: repository root)
        #[arg(default_value = "")]
        path: String,
    },

    /// Print a decrypted file
    Cat {
        /// File to read
        path: String,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Encrypt and write a file
    Write {
        /// Destination path
        path: String,

        /// Input file to write
        #[arg(long, conflicts_with = "data")]
        input: Option<PathBuf>,

        /// String data to write
        #[arg(long, conflicts_with = "input")]
        data: Option<String>,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Delete a file
    Rm {
        /// File to delete
        path: String,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Create a directory
    Mkdir {
        /// Directory to create
        path: String,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Delete a directory and everything below it
    Rmdir {
        /// Directory to delete
        path: String,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Move a file
    Mv {
        src: String,
        dest: String,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Copy a file
    Cp {
        src: String,
        dest: String,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Exit 0 if the path exists, 1 otherwise
    Exists {
        path: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gh_vfs=info,warn".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.connect)?;
    let vfs = GitHubVfs::new(config).context("cannot open repository")?;

    match cli.command {
        Commands::Ls { path } => cmd_ls(&vfs, &path).await?,

        Commands::Cat { path, output } => cmd_cat(&vfs, &path, output).await?,

        Commands::Write {
            path,
            input,
            data,
            message,
        } => cmd_write(&vfs, &path, input, data, message.as_deref()).await?,

        Commands::Rm { path, message } => {
            vfs.delete_file(&path, message.as_deref()).await?;
            println!("Deleted {}", path);
        }

        Commands::Mkdir { path, message } => {
            vfs.create_dir(&path, message.as_deref()).await?;
            println!("Created directory {}", path);
        }

        Commands::Rmdir {
            path,
            message,
            force,
        } => {
            if !force && !confirm(&format!("Delete '{}' and everything below it? [y/N] ", path))? {
                println!("Aborted");
                return Ok(true);
            }
            let report = vfs.delete_dir(&path, message.as_deref()).await?;
            println!("{} ({} objects)", report.message(), report.removed.len());
        }

        Commands::Mv { src, dest, message } => {
            vfs.move_file(&src, &dest, message.as_deref()).await?;
            println!("Moved {} -> {}", src, dest);
        }

        Commands::Cp { src, dest, message } => {
            vfs.copy_file(&src, &dest, message.as_deref()).await?;
            println!("Copied {} -> {}", src, dest);
        }

        Commands::Exists { path } => {
            let exists = vfs.exists(&path).await?;
            println!("{}", exists);
            return Ok(exists);
        }
    }

    Ok(true)
}

/// Merge the configuration file, flags and environment, prompting for the secret last.
fn load_config(args: ConnectArgs) -> anyhow::Result<VfsConfig> {
    let mut config = match &args.config {
        Some(path) => VfsConfig::from_json_file(path)?,
        None => {
            let owner = args
                .owner
                .clone()
                .context("--owner (or GH_VFS_OWNER) is required without --config")?;
            let repo = args
                .repo
                .clone()
                .context("--repo (or GH_VFS_REPO) is required without --config")?;
            VfsConfig::new(String::new(), owner, repo, String::new())
        }
    };

    if let Some(token) = args.token {
        config.auth_token = token;
    }
    if let Some(owner) = args.owner {
        config.owner = owner;
    }
    if let Some(repo) = args.repo {
        config.repo = repo;
    }
    if let Some(branch) = args.branch {
        config.branch = Some(branch);
    }
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if args.committer_name.is_some() || args.committer_email.is_some() {
        let default = config.committer.clone();
        config.committer = Committer::new(
            args.committer_name.unwrap_or(default.name),
            args.committer_email.unwrap_or(default.email),
        );
    }
    if let Some(secret) = args.secret {
        config.encryption_secret = secret;
    }
    if config.encryption_secret.is_empty() {
        config.encryption_secret = prompt_secret("Encryption secret: ")?;
    }

    Ok(config)
}

fn prompt_secret(prompt: &str) -> anyhow::Result<String> {
    match rpassword::prompt_password(prompt) {
        Ok(secret) => Ok(secret),
        Err(_) => {
            eprint!("{}", prompt);
            io::stderr().flush()?;
            let mut secret = String::new();
            io::stdin().lock().read_line(&mut secret)?;
            Ok(secret.trim().to_string())
        }
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

async fn cmd_ls(vfs: &GitHubVfs, path: &str) -> anyhow::Result<()> {
    let Some(entries) = vfs.read_dir(path).await? else {
        bail!("'{}' does not exist", path);
    };

    if entries.is_empty() {
        println!("(empty)");
    }
    for entry in entries {
        let type_char = if entry.is_dir() { 'd' } else { '-' };
        println!("{}  {}", type_char, entry.name);
    }

    Ok(())
}

async fn cmd_cat(vfs: &GitHubVfs, path: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let data = vfs.read_file(path).await?;

    match output {
        Some(out) => {
            std::fs::write(&out, &data)
                .with_context(|| format!("cannot write {}", out.display()))?;
            println!("Wrote {} bytes to {}", data.len(), out.display());
        }
        None => {
            io::stdout().write_all(&data)?;
        }
    }

    Ok(())
}

async fn cmd_write(
    vfs: &GitHubVfs,
    path: &str,
    input: Option<PathBuf>,
    data: Option<String>,
    message: Option<&str>,
) -> anyhow::Result<()> {
    let content = match (input, data) {
        (Some(file), _) => {
            std::fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?
        }
        (None, Some(s)) => s.into_bytes(),
        (None, None) => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };

    let meta = vfs.write_file(path, &content, message).await?;
    println!("Wrote {} bytes to {} ({})", content.len(), path, meta.sha);

    Ok(())
}
