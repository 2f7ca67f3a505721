use clap::{Parser, Subcommand};

use md5hex::commands::{CheckCommand, CompareCommand, HashCommand};

/// md5hex computes lowercase hex MD5 digests of text.
#[derive(Parser)]
#[command(author, version, about, long_about=None)]
#[command(propagate_version = true)]
struct Md5HexCommands {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest of each input
    Hash(HashCommand),

    /// Verify the digest of a text
    Check(CheckCommand),

    /// Run every variant and report disagreements
    Compare(CompareCommand),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let cli = Md5HexCommands::parse();
    match &cli.commands {
        Commands::Hash(hash) => hash.run()?,
        Commands::Check(check) => check.run()?,
        Commands::Compare(compare) => compare.run()?,
    }

    Ok(())
}
