use std::path::PathBuf;

use clap::Parser;

use super::{
    CardsSubcommands,
    Cli,
    Commands,
};

fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(args)
}

#[test]
fn export_with_deck_parses() {
    let cli = parse(&["ankimd", "export", "--deck", "Geography"]);
    match cli.command {
        Commands::Export(args) => assert_eq!(args.deck.as_deref(), Some("Geography")),
        other => panic!("expected Export, got {:?}", other),
    }
}

#[test]
fn sync_dir_and_file_are_exclusive() {
    let cli = parse(&["ankimd", "sync", "-d", "cards"]);
    match cli.command {
        Commands::Sync(args) => {
            assert_eq!(args.dir, Some(PathBuf::from("cards")));
            assert!(args.file.is_none());
        }
        other => panic!("expected Sync, got {:?}", other),
    }

    let result = Cli::try_parse_from(["ankimd", "sync", "--dir", "a", "--file", "b.md"]);
    assert!(result.is_err());
}

#[test]
fn cards_add_collects_repeated_tags() {
    let cli = parse(&[
        "ankimd", "cards", "add", "--front", "Q", "--back", "A", "-t", "geo", "--tag", "europe",
    ]);
    match cli.command {
        Commands::Cards(args) => match args.command {
            CardsSubcommands::Add(add) => {
                assert_eq!(add.front, "Q");
                assert_eq!(add.tags, vec!["geo", "europe"]);
                assert!(add.deck.is_none());
            }
            other => panic!("expected Add, got {:?}", other),
        },
        other => panic!("expected Cards, got {:?}", other),
    }
}

#[test]
fn cards_update_takes_positional_id() {
    let cli = parse(&["ankimd", "cards", "update", "1718000000001", "--front", "Q", "--back", "A"]);
    match cli.command {
        Commands::Cards(args) => match args.command {
            CardsSubcommands::Update(update) => {
                assert_eq!(update.id, 1718000000001);
                assert!(update.tags.is_empty());
            }
            other => panic!("expected Update, got {:?}", other),
        },
        other => panic!("expected Cards, got {:?}", other),
    }
}

#[test]
fn settings_flag_parses_before_command() {
    let cli = parse(&["ankimd", "--settings", "/tmp/ankimd.json", "ping"]);
    assert_eq!(cli.settings, Some(PathBuf::from("/tmp/ankimd.json")));
    assert!(matches!(cli.command, Commands::Ping));
}

#[test]
fn modify_requires_instruction() {
    assert!(Cli::try_parse_from(["ankimd", "modify", "--front", "Q", "--back", "A"]).is_err());
    let cli = parse(&["ankimd", "modify", "--front", "Q", "--back", "A", "-i", "shorter"]);
    assert!(matches!(cli.command, Commands::Modify(args) if args.instruction == "shorter"));
}
