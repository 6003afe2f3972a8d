use std::path::PathBuf;

use clap::{
    builder::styling::{
        AnsiColor,
        Effects,
        Styles,
    },
    Args,
    Parser,
    Subcommand,
};

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "ankimd")]
#[command(version)]
#[command(about = "Keep Anki notes and an Obsidian vault of Markdown cards in step")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 's',
        long,
        env = "ANKIMD_SETTINGS",
        help = "Settings file (defaults to settings.json in the app config dir)."
    )]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Write every note of a deck as a Markdown document.")]
    Export(ExportArgs),
    #[command(about = "Push Markdown documents into Anki, creating or updating notes.")]
    Sync(SyncArgs),
    #[command(about = "List, add or update cards directly.")]
    Cards(CardsArgs),
    #[command(about = "Draft a card from a topic with Gemini.")]
    Generate(GenerateArgs),
    #[command(about = "Rewrite a card's front and back following an instruction.")]
    Modify(ModifyArgs),
    #[command(about = "Show the effective settings.")]
    Config(ConfigArgs),
    #[command(about = "Check that AnkiConnect is reachable.")]
    Ping,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(short = 'd', long, help = "Deck to export (defaults to ANKI_DECK_NAME).")]
    pub deck: Option<String>,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[arg(
        short = 'd',
        long,
        conflicts_with = "file",
        help = "Directory to sync, relative to SYNC_BASE_DIR."
    )]
    pub dir: Option<PathBuf>,

    #[arg(short = 'f', long, help = "Single document to sync.")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CardsArgs {
    #[command(subcommand)]
    pub command: CardsSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum CardsSubcommands {
    #[command(about = "List the cards of a deck as JSON.")]
    List(CardsListArgs),
    #[command(about = "Create a card from Markdown front/back.")]
    Add(CardsAddArgs),
    #[command(about = "Replace a card's fields and tags.")]
    Update(CardsUpdateArgs),
}

#[derive(Debug, Args)]
pub struct CardsListArgs {
    #[arg(short = 'd', long)]
    pub deck: Option<String>,
}

#[derive(Debug, Args)]
pub struct CardsAddArgs {
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
    #[arg(short = 't', long = "tag", help = "Tag to attach; repeatable.")]
    pub tags: Vec<String>,
    #[arg(short = 'd', long)]
    pub deck: Option<String>,
}

#[derive(Debug, Args)]
pub struct CardsUpdateArgs {
    pub id: u64,
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
    #[arg(short = 't', long = "tag", help = "New tag set; repeatable. Omit to clear tags.")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    pub prompt: String,
}

#[derive(Debug, Args)]
pub struct ModifyArgs {
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
    #[arg(short = 'i', long)]
    pub instruction: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long, help = "Write the effective settings back to the settings file.")]
    pub save: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
