use ankimd::{
    anki::AnkiConnect,
    cards::{
        CardConfig,
        CardDraft,
        CardService,
    },
    cli::{
        CardsSubcommands,
        Cli,
        Commands,
    },
    config::Settings,
    core::AnkiMdError,
    export::Exporter,
    gemini::GeminiClient,
    sync::{
        resolve_targets,
        Reconciler,
    },
};
use clap::Parser;
use dotenv::dotenv;
use log::{
    error,
    info,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), AnkiMdError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<(), AnkiMdError> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref());
    let anki = AnkiConnect::new(&settings.anki_connect_url);

    match cli.command {
        Commands::Export(args) => {
            let config = settings.export_config(args.deck.as_deref())?;
            let output_dir = config.output_dir.clone();
            let report = Exporter::new(anki, config).export_deck().await?;

            println!("Export finished ({})", output_dir.display());
            println!("  - new:     {}", report.created);
            println!("  - updated: {}", report.updated);
            println!("  - renamed: {}", report.renamed);
            println!("  - total:   {}", report.total());
            for (note_id, reason) in &report.failed {
                println!("  ! note {}: {}", note_id, reason);
            }
        }
        Commands::Sync(args) => {
            let config = settings.sync_config()?;
            let targets = resolve_targets(&settings, args.dir.as_deref(), args.file.as_deref())?;
            let report = Reconciler::new(anki, config).sync_all(&targets).await;

            println!(
                "Sync finished: {} created, {} updated, {} skipped, {} failed",
                report.created,
                report.updated,
                report.skipped,
                report.failed.len()
            );
            for (path, reason) in &report.failed {
                println!("  ! {}: {}", path.display(), reason);
            }
        }
        Commands::Cards(args) => {
            let service = card_service(&settings, anki, settings.card_config()?);
            match args.command {
                CardsSubcommands::List(list) => {
                    print_json(&service.list_cards(list.deck.as_deref()).await?)?;
                }
                CardsSubcommands::Add(add) => {
                    let draft = CardDraft {
                        front: add.front,
                        back: add.back,
                        tags: add.tags,
                        deck_name: add.deck,
                    };
                    let note_id = service.create_card(draft).await?;
                    print_json(&serde_json::json!({
                        "id": note_id,
                        "message": "Card created successfully",
                    }))?;
                }
                CardsSubcommands::Update(update) => {
                    let draft = CardDraft {
                        front: update.front,
                        back: update.back,
                        tags: update.tags,
                        deck_name: None,
                    };
                    service.update_card(update.id, draft).await?;
                    print_json(&serde_json::json!({
                        "id": update.id,
                        "message": "Card updated successfully",
                    }))?;
                }
            }
        }
        Commands::Generate(args) => {
            let service = card_service(&settings, anki, generation_config(&settings));
            print_json(&service.generate_card(&args.prompt).await?)?;
        }
        Commands::Modify(args) => {
            let service = card_service(&settings, anki, generation_config(&settings));
            let card = service.modify_card(&args.front, &args.back, &args.instruction).await?;
            print_json(&card)?;
        }
        Commands::Config(args) => {
            if args.save {
                let path = settings.save(cli.settings.as_deref())?;
                info!("Settings written to {}", path.display());
            }
            eprintln!("{}", settings);
            print_json(&settings.redacted())?;
        }
        Commands::Ping => {
            let version = anki.version().await?;
            println!("AnkiConnect at {} is reachable (API version {})", anki.url(), version);
        }
    }

    Ok(())
}

fn card_service(
    settings: &Settings,
    anki: AnkiConnect,
    config: CardConfig,
) -> CardService<AnkiConnect, GeminiClient> {
    let gemini = GeminiClient::new(settings.gemini_api_key.clone(), &settings.gemini_model_name);
    CardService::new(anki, gemini, config)
}

// Generation never reaches the note store, so deck and model may be unset.
fn generation_config(settings: &Settings) -> CardConfig {
    CardConfig {
        deck_name: settings.deck_name.clone().unwrap_or_default(),
        model_name: settings.model_name.clone().unwrap_or_default(),
        field_front: settings.field_front.clone(),
        field_back: settings.field_back.clone(),
    }
}
