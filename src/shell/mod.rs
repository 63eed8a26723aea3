pub mod command;

use log::{ debug, warn };
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::analysis::{ read_upload, ConversationAnalyzer };
use crate::config::discounts::DiscountTable;
use crate::config::templates::format_money;
use crate::error::{ HaggleError, Result };
use crate::models::{ CloseOutcome, CloseReport, NegotiationTab };
use crate::offer::{ calculate_counter_offer, DraftRequest, MessageDrafter };
use crate::session::SessionStore;
use command::{ parse_command, ShellCommand, HELP };

const PROGRESS_STEP: u8 = 10;
const PREVIEW_CHARS: usize = 150;

pub enum ShellOutput {
    Text(String),
    Quit,
}

/// Console front-end over a single in-memory `SessionStore`.
pub struct Shell {
    store: SessionStore,
    discounts: DiscountTable,
    drafter: Arc<dyn MessageDrafter>,
    analyzer: Arc<dyn ConversationAnalyzer>,
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let cut: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        content.to_string()
    }
}

fn summary_line(tab: &NegotiationTab) -> String {
    let category = tab.category.map(|c| c.to_string()).unwrap_or_else(|| "no category".to_string());
    let mut line = format!(
        "{}  {} [{}] {} {}  {}% ({})",
        short_id(&tab.id),
        tab.title,
        category,
        if tab.platform.is_empty() { "-" } else { tab.platform.as_str() },
        format_money(tab.original_price),
        tab.progress,
        tab.stage().label()
    );
    if let Some(offer) = tab.current_offer {
        let _ = write!(line, "  offer {}", format_money(offer));
    }
    line
}

impl Shell {
    pub fn new(
        store: SessionStore,
        discounts: DiscountTable,
        drafter: Arc<dyn MessageDrafter>,
        analyzer: Arc<dyn ConversationAnalyzer>
    ) -> Self {
        Self { store, discounts, drafter, analyzer }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Accepts a full id or any prefix matching exactly one negotiation.
    fn resolve_id(&self, prefix: &str) -> Result<String> {
        let matches: Vec<&NegotiationTab> = self.store
            .list_sessions(None)
            .into_iter()
            .filter(|t| t.id.starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [tab] => Ok(tab.id.clone()),
            [] => Err(HaggleError::NotFound(prefix.to_string())),
            _ =>
                matches
                    .iter()
                    .find(|t| t.id == prefix)
                    .map(|t| t.id.clone())
                    .ok_or_else(|| HaggleError::InvalidInput(format!("id prefix '{}' is ambiguous", prefix))),
        }
    }

    fn describe(&self, id: &str) -> Result<String> {
        let tab = self.store.get_session(id)?;
        let mut out = String::new();
        let _ = writeln!(out, "{}", summary_line(tab));
        let _ = writeln!(out, "  id: {}  status: {}", tab.id, tab.status);
        if let Some(budget) = tab.max_budget {
            let _ = writeln!(out, "  max budget: {}", format_money(budget));
        }
        if let Some((savings, pct)) = tab.projected_savings() {
            let _ = writeln!(out, "  potential savings: {} ({}% off)", format_money(savings), pct);
        }
        let _ = writeln!(
            out,
            "  started {}, last activity {}",
            tab.created_at.format("%Y-%m-%d %H:%M"),
            tab.last_activity.format("%Y-%m-%d %H:%M")
        );
        for message in &tab.messages {
            let _ = writeln!(out, "  [{:?}] {}", message.kind, message.content);
        }
        Ok(out.trim_end().to_string())
    }

    async fn generate_offer(&mut self, id: &str, context: String) -> Result<String> {
        let tab = self.store.get_session(id)?;
        let category = match tab.category {
            Some(category) if !tab.title.trim().is_empty() && tab.original_price > 0.0 && !tab.platform.trim().is_empty() =>
                category,
            _ => {
                return Err(
                    HaggleError::InvalidInput(
                        "missing information: set title, price, platform and category first".to_string()
                    )
                );
            }
        };

        let offer = calculate_counter_offer(tab.original_price, &tab.platform, category.as_str(), &self.discounts)?;
        let request = DraftRequest {
            title: tab.title.clone(),
            original_price: tab.original_price,
            offer_price: offer,
            platform: tab.platform.clone(),
            context,
            category: category.to_string(),
        };
        let message = self.drafter.draft(&request).await?;
        self.store.apply_offer(id, offer, &message)?;
        Ok(format!("Suggested counter-offer: {}\n\n{}", format_money(offer), message))
    }

    async fn analyze(&self, id: &str, path: &str) -> Result<String> {
        let category = self.store.get_session(id)?.category;
        let upload = read_upload(path).await?;
        let result = self.analyzer.analyze(&upload, category).await?;

        let mut out = String::new();
        let _ = writeln!(out, "Sentiment: {:?}  Urgency: {:?}", result.sentiment, result.urgency_level);
        if let Some(price) = &result.price_analysis {
            let _ = writeln!(
                out,
                "Mentioned price: {}  Flexibility: {:?}",
                price.mentioned_price.as_deref().unwrap_or("-"),
                price.price_flexibility
            );
        }
        let _ = writeln!(out, "Seller motivation: {}", result.seller_motivation);
        let _ = writeln!(out, "Key points:");
        for point in &result.key_points {
            let _ = writeln!(out, "  - {}", point);
        }
        let _ = writeln!(out, "Tips:");
        for tip in &result.negotiation_tips {
            let _ = writeln!(out, "  - {}", tip);
        }
        let _ = write!(out, "Suggested response:\n{}", result.suggested_response);
        Ok(out)
    }

    pub async fn execute(&mut self, command: ShellCommand) -> Result<ShellOutput> {
        debug!("Executing {:?}", command);
        let text = match command {
            ShellCommand::New => {
                let id = self.store.create_session();
                format!("New negotiation started: {}", short_id(&id))
            }
            ShellCommand::List(filter) => {
                let tabs = self.store.list_sessions(filter);
                if tabs.is_empty() {
                    "No negotiations. Type 'new' to start one.".to_string()
                } else {
                    tabs.iter()
                        .map(|t| {
                            let mut line = summary_line(t);
                            if let Some(message) = t.latest_message() {
                                let _ = write!(line, "\n    latest: {}", preview(&message.content));
                            }
                            line
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ShellCommand::Show(prefix) => {
                let id = self.resolve_id(&prefix)?;
                self.describe(&id)?
            }
            ShellCommand::Set { id, update } => {
                let id = self.resolve_id(&id)?;
                summary_line(self.store.update_session(&id, update)?)
            }
            ShellCommand::Offer { id, context } => {
                let id = self.resolve_id(&id)?;
                self.generate_offer(&id, context).await?
            }
            ShellCommand::Say { id, kind, content } => {
                let id = self.resolve_id(&id)?;
                self.store.append_message(&id, kind, &content)?;
                let count = self.store.get_session(&id)?.messages.len();
                format!("Recorded {:?} message ({} total)", kind, count)
            }
            ShellCommand::Progress(id) => {
                let id = self.resolve_id(&id)?;
                let progress = self.store.advance_progress(&id, PROGRESS_STEP)?;
                format!("Progress: {}%", progress)
            }
            ShellCommand::Close { id, final_price } => {
                let id = self.resolve_id(&id)?;
                let outcome = match final_price {
                    Some(price) => CloseOutcome::deal(price),
                    None => CloseOutcome::no_deal(),
                };
                match self.store.close_session(&id, outcome)? {
                    CloseReport::Deal(deal) =>
                        format!(
                            "Deal completed! You saved {} ({}% off).",
                            format_money(deal.savings),
                            deal.savings_percentage
                        ),
                    CloseReport::NoDeal { id } => format!("Closed {} without recording a deal.", short_id(&id)),
                }
            }
            ShellCommand::Analyze { id, path } => {
                let id = self.resolve_id(&id)?;
                self.analyze(&id, &path).await?
            }
            ShellCommand::Deals => {
                let deals = self.store.completed_deals();
                if deals.is_empty() {
                    "No completed deals yet.".to_string()
                } else {
                    deals
                        .iter()
                        .map(|d| {
                            format!(
                                "{}  {}: {} -> {}  saved {} ({}%)",
                                d.completed_at.format("%Y-%m-%d"),
                                d.title,
                                format_money(d.original_price),
                                format_money(d.final_price),
                                format_money(d.savings),
                                d.savings_percentage
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ShellCommand::Stats => {
                let stats = self.store.aggregate_stats();
                let milestone = self.store.milestone();
                let mut out = format!(
                    "Total saved: {}\nActive deals: {}\nCompleted: {}\nAvg. savings: {}\nAvg. discount: {}%\nNext milestone: {} ({}%)",
                    format_money(stats.total_savings),
                    stats.active_negotiations,
                    stats.total_deals,
                    format_money(stats.average_savings),
                    stats.average_discount,
                    format_money(milestone.next_milestone),
                    milestone.progress.round()
                );
                for entry in self.store.category_breakdown().iter().filter(|c| c.deals > 0) {
                    let _ = write!(
                        out,
                        "\n  {}: {} ({} deals)",
                        entry.category,
                        format_money(entry.savings),
                        entry.deals
                    );
                }
                out
            }
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => {
                return Ok(ShellOutput::Quit);
            }
        };
        Ok(ShellOutput::Text(text))
    }

    /// Reads commands line by line until EOF or `quit`. Failed commands are
    /// reported and the loop continues with the store unchanged.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
        where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
    {
        let mut lines = input.lines();
        output.write_all(b"haggle> ").await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            let result = match parse_command(&line) {
                Ok(Some(command)) => self.execute(command).await,
                Ok(None) => Ok(ShellOutput::Text(String::new())),
                Err(e) => Err(e),
            };

            match result {
                Ok(ShellOutput::Quit) => {
                    break;
                }
                Ok(ShellOutput::Text(text)) => {
                    if !text.is_empty() {
                        output.write_all(text.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                    }
                }
                Err(e) => {
                    warn!("Command failed: {}", e);
                    output.write_all(format!("error: {}\n", e).as_bytes()).await?;
                }
            }
            output.write_all(b"haggle> ").await?;
            output.flush().await?;
        }
        output.flush().await?;
        Ok(())
    }
}
