pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod offer;
pub mod session;
pub mod shell;

use cli::{ Args, Command };
use config::AppConfig;
use config::templates::format_money;
use log::info;
use offer::{ calculate_counter_offer, DraftRequest, MessageDrafter, TemplateDrafter };
use session::SessionStore;
use shell::Shell;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Discount Table: {}", args.discounts_path.as_deref().unwrap_or("built-in"));
    info!("Message Templates: {}", args.templates_path.as_deref().unwrap_or("built-in"));
    info!("Message Delay (ms): {}", args.message_delay_ms);
    info!("Analysis Delay (ms): {}", args.analysis_delay_ms);
    info!("Template Seed: {:?}", args.template_seed);
    info!("-------------------------");

    let config = AppConfig::from_args(&args)?;

    match args.command.clone().unwrap_or(Command::Shell) {
        Command::Quote { price, platform, category } => {
            let offer = calculate_counter_offer(price, &platform, &category, &config.discounts)?;
            println!("{}", format_money(offer));
        }
        Command::Draft { title, price, platform, category, context } => {
            let offer = calculate_counter_offer(price, &platform, &category, &config.discounts)?;
            let drafter = TemplateDrafter::from_config(&config);
            let message = drafter.draft(
                &(DraftRequest {
                    title,
                    original_price: price,
                    offer_price: offer,
                    platform,
                    context,
                    category,
                })
            ).await?;
            println!("Suggested counter-offer: {}\n\n{}", format_money(offer), message);
        }
        Command::Shell => {
            let mut shell = Shell::new(
                SessionStore::new(),
                config.discounts.clone(),
                Arc::new(TemplateDrafter::from_config(&config)),
                analysis::create_analyzer(&config)
            );
            println!("Type 'help' for commands.");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell.run(stdin, tokio::io::stdout()).await?;
            let stats = shell.store().aggregate_stats();
            info!(
                "Session ended: {} deals, {} saved",
                stats.total_deals,
                format_money(stats.total_savings)
            );
        }
    }

    Ok(())
}
