use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Offer Calculator Args ---
    /// Path to a JSON discount table overriding the built-in rates.
    #[arg(long, env = "DISCOUNTS_PATH", global = true)]
    pub discounts_path: Option<String>,

    /// Path to a JSON message template set overriding the built-in templates.
    #[arg(long, env = "TEMPLATES_PATH", global = true)]
    pub templates_path: Option<String>,

    /// Simulated latency in milliseconds before a drafted message is returned. 0 disables it.
    #[arg(long, env = "MESSAGE_DELAY_MS", default_value = "0", global = true)]
    pub message_delay_ms: u64,

    /// Seed for picking between template variants. Random when not set.
    #[arg(long, env = "TEMPLATE_SEED", global = true)]
    pub template_seed: Option<u64>,

    // --- Analyzer Args ---
    /// Simulated latency in milliseconds for screenshot analysis. 0 disables it.
    #[arg(long, env = "ANALYSIS_DELAY_MS", default_value = "0", global = true)]
    pub analysis_delay_ms: u64,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the suggested counter-offer for a listing.
    Quote {
        /// Asking price of the listing.
        #[arg(long)]
        price: f64,
        /// Platform the listing is on (e.g. Craigslist, eBay).
        #[arg(long, default_value = "")]
        platform: String,
        /// Listing category (cars, electronics, furniture, real-estate, motorcycles, gadgets).
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Draft a negotiation message with the suggested counter-offer.
    Draft {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        platform: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Extra sentence appended to the message.
        #[arg(long, default_value = "")]
        context: String,
    },
    /// Interactive console for managing several negotiations at once.
    Shell,
}
