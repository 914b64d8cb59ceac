//! Slash-command vocabulary and parsing.

use brainbot_core::domain::UserId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Quotes,
    Persons,
    QuoteOfTheDay,
    Random,
    Subscribe { raw_time: Option<String> },
    Unsubscribe,
    /// Without a target: list whitelisted users. With one: approve them.
    Whitelist { target: Option<UserId> },
    /// Without a target: list blacklisted users. With one: deny them.
    Blacklist { target: Option<UserId> },
    Stop,
    Help,
    Unknown { keyword: String },
}

impl Command {
    /// Commands restricted to administrator chats.
    pub fn is_moderation(&self) -> bool {
        matches!(
            self,
            Command::Whitelist { .. } | Command::Blacklist { .. } | Command::Stop
        )
    }

    /// The slash keyword as the user would type it, for violation reports.
    pub fn keyword(&self) -> String {
        match self {
            Command::Quotes => "/quotes".into(),
            Command::Persons => "/persons".into(),
            Command::QuoteOfTheDay => "/quoteoftheday".into(),
            Command::Random => "/random".into(),
            Command::Subscribe { .. } => "/subscribe".into(),
            Command::Unsubscribe => "/unsubscribe".into(),
            Command::Whitelist { .. } => "/whitelist".into(),
            Command::Blacklist { .. } => "/blacklist".into(),
            Command::Stop => "/stop".into(),
            Command::Help => "/help".into(),
            Command::Unknown { keyword } => format!("/{keyword}"),
        }
    }
}

/// Parse a message text into a command. Returns `None` when the text does not
/// start with a slash. A `@botname` suffix on the keyword is stripped, so the
/// parser accepts the group-chat form `/quotes@brainbot` as well.
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.trim().strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let keyword_raw = parts.next().unwrap_or_default();
    let keyword = keyword_raw.split('@').next().unwrap_or(keyword_raw).to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    Some(match keyword.as_str() {
        "quotes" => Command::Quotes,
        "persons" => Command::Persons,
        "quoteoftheday" => Command::QuoteOfTheDay,
        "random" => Command::Random,
        "subscribe" => Command::Subscribe { raw_time: args.first().map(|s| (*s).to_owned()) },
        "unsubscribe" => Command::Unsubscribe,
        "whitelist" => Command::Whitelist { target: parse_target(&args) },
        "blacklist" => Command::Blacklist { target: parse_target(&args) },
        "stop" => Command::Stop,
        "help" | "start" => Command::Help,
        other => Command::Unknown { keyword: other.to_owned() },
    })
}

fn parse_target(args: &[&str]) -> Option<UserId> {
    args.first().and_then(|raw| raw.parse::<i64>().ok()).map(UserId)
}
