use crate::error::{ HaggleError, Result };
use crate::models::{ Category, MessageKind, NegotiationStatus, SessionFilter, SessionUpdate };

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    New,
    List(Option<SessionFilter>),
    Show(String),
    Set {
        id: String,
        update: SessionUpdate,
    },
    Offer {
        id: String,
        context: String,
    },
    Say {
        id: String,
        kind: MessageKind,
        content: String,
    },
    Progress(String),
    Close {
        id: String,
        final_price: Option<f64>,
    },
    Analyze {
        id: String,
        path: String,
    },
    Deals,
    Stats,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  new                              start a negotiation
  list [active|completed|closed|<category>]
  show <id>                        details and messages
  set <id> title <text>
  set <id> category <name|none>
  set <id> platform <text>
  set <id> price <amount>
  set <id> budget <amount|none>
  set <id> offer <amount>
  set <id> progress <0-100>
  set <id> status <active|completed|closed>
  offer <id> [context]             calculate a counter-offer and draft a message
  say <id> <user|seller|ai> <text> record a message
  progress <id>                    bump progress by 10
  analyze <id> <image path>        analyze a conversation screenshot
  close <id> [final price]         close, recording a deal when a final price is given
  deals                            completed deals, newest first
  stats                            savings summary
  help | quit
Ids may be shortened to any unique prefix.";

fn invalid(message: impl Into<String>) -> HaggleError {
    HaggleError::InvalidInput(message.into())
}

fn parse_amount(raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(format!("'{}' is not a valid amount", raw)))
}

fn is_none_word(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "none" | "-" | "clear")
}

/// Splits off the first whitespace-delimited word.
fn next_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(pos) => Some((&input[..pos], input[pos..].trim_start())),
        None => Some((input, "")),
    }
}

fn require_word<'a>(input: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    next_word(input).ok_or_else(|| invalid(format!("missing {}", what)))
}

fn parse_set(id: String, rest: &str) -> Result<ShellCommand> {
    let (field, value) = require_word(rest, "field name")?;
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("missing value for '{}'", field)));
    }

    let mut update = SessionUpdate::default();
    match field.to_lowercase().as_str() {
        "title" => {
            update.title = Some(value.to_string());
        }
        "category" => {
            update.category = Some(if is_none_word(value) {
                None
            } else {
                Some(value.parse::<Category>().map_err(|e| invalid(e.to_string()))?)
            });
        }
        "platform" => {
            update.platform = Some(value.to_string());
        }
        "price" => {
            update.original_price = Some(parse_amount(value)?);
        }
        "budget" => {
            update.max_budget = Some(if is_none_word(value) { None } else { Some(parse_amount(value)?) });
        }
        "offer" => {
            update.current_offer = Some(parse_amount(value)?);
        }
        "progress" => {
            let progress = value
                .parse::<u8>()
                .map_err(|_| invalid(format!("'{}' is not a progress value between 0 and 100", value)))?;
            update.progress = Some(progress);
        }
        "status" => {
            update.status = Some(value.parse::<NegotiationStatus>().map_err(invalid)?);
        }
        other => {
            return Err(invalid(format!("unknown field '{}'", other)));
        }
    }
    Ok(ShellCommand::Set { id, update })
}

fn parse_filter(raw: &str) -> Result<SessionFilter> {
    if let Ok(status) = raw.parse::<NegotiationStatus>() {
        return Ok(SessionFilter::Status(status));
    }
    raw.parse::<Category>()
        .map(SessionFilter::Category)
        .map_err(|_| invalid(format!("unknown filter '{}'", raw)))
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let Some((verb, rest)) = next_word(line) else {
        return Ok(None);
    };

    let command = match verb.to_lowercase().as_str() {
        "new" => ShellCommand::New,
        "list" | "ls" => {
            let rest = rest.trim();
            if rest.is_empty() {
                ShellCommand::List(None)
            } else {
                ShellCommand::List(Some(parse_filter(rest)?))
            }
        }
        "show" => ShellCommand::Show(require_word(rest, "negotiation id")?.0.to_string()),
        "set" => {
            let (id, rest) = require_word(rest, "negotiation id")?;
            parse_set(id.to_string(), rest)?
        }
        "offer" => {
            let (id, context) = require_word(rest, "negotiation id")?;
            ShellCommand::Offer { id: id.to_string(), context: context.trim().to_string() }
        }
        "say" => {
            let (id, rest) = require_word(rest, "negotiation id")?;
            let (kind, content) = require_word(rest, "message type")?;
            let kind = kind.parse::<MessageKind>().map_err(invalid)?;
            if content.trim().is_empty() {
                return Err(invalid("message text is empty"));
            }
            ShellCommand::Say { id: id.to_string(), kind, content: content.trim().to_string() }
        }
        "progress" => ShellCommand::Progress(require_word(rest, "negotiation id")?.0.to_string()),
        "close" => {
            let (id, rest) = require_word(rest, "negotiation id")?;
            let final_price = match next_word(rest) {
                Some((price, _)) => Some(parse_amount(price)?),
                None => None,
            };
            ShellCommand::Close { id: id.to_string(), final_price }
        }
        "analyze" => {
            let (id, path) = require_word(rest, "negotiation id")?;
            if path.trim().is_empty() {
                return Err(invalid("missing image path"));
            }
            ShellCommand::Analyze { id: id.to_string(), path: path.trim().to_string() }
        }
        "deals" | "history" => ShellCommand::Deals,
        "stats" => ShellCommand::Stats,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => {
            return Err(invalid(format!("unknown command '{}', try 'help'", other)));
        }
    };
    Ok(Some(command))
}
