//! Outbound message text. Every user-visible string the bot sends lives
//! here so handlers and tests agree on the exact wording.

use crate::domain::{Actor, Person, Quote};
use crate::subscription::SubscriptionTime;

pub const ERROR_OCCURRED: &str =
    "An error occurred. This problem will be automatically reported to the administrators.";
pub const NO_TIME_ARGUMENT: &str = "Please specify the time at which you want to be notified.\n\
                                    Example: /subscribe 01:00";
pub const INCORRECT_TIME_FORMAT: &str =
    "Incorrect time format. Please provide a time formatted like hh:mm.";
pub const INVALID_HOUR: &str = "The hour has to be between 00 and 23.";
pub const INVALID_MINUTE: &str = "The minute has to be between 00 and 59.";
pub const NOT_SUBSCRIBED: &str = "You are not subscribed to the quote of the day.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Try /help.";
pub const LOADING_QUOTES: &str = "Loading quotes...";
pub const NO_PERMISSION: &str = "You do not have permission to use this command.";
pub const REQUEST_SUBMITTED: &str = "You are not authorized to use this bot yet.\n\
                                     The administrators have been asked to review your request.";
pub const AWAITING_APPROVAL: &str =
    "Your access request is still awaiting review by the administrators.";
pub const ACCESS_DENIED: &str = "You are not allowed to use this bot.";
pub const ACCESS_APPROVED: &str = "Your access request was approved. Enjoy the quotes!";
pub const ACCESS_REJECTED: &str = "Your access request was denied.";
pub const ADMIN_PROTECTED: &str = "Administrators cannot be blacklisted.";
pub const SHUTTING_DOWN: &str = "Shutting down.";

pub const HELP: &str = "Available commands:\n\
                        /quotes - browse all quotes\n\
                        /persons - list quoted persons\n\
                        /quoteoftheday - the quote of the day\n\
                        /random - a random quote\n\
                        /subscribe hh:mm - daily quote of the day\n\
                        /unsubscribe - stop the daily quote\n\
                        /help - this message";

/// `<text>\n~ <quoted persons>\n<brain> Brain\nSubmitted by <quoter> on <date>.`
/// with the wire date's `-` separators rendered as `/`.
pub fn quote(quote: &Quote) -> String {
    let quoted: Vec<String> = quote.quoted_persons.iter().map(|p| p.full_name()).collect();
    format!(
        "{}\n~ {}\n{} Brain\nSubmitted by {} on {}.",
        quote.quote,
        quoted.join(", "),
        quote.brain,
        quote.quoter.full_name(),
        quote.date.replace('-', "/"),
    )
}

pub fn quote_list(quotes: &[Quote]) -> String {
    quotes.iter().map(quote).collect::<Vec<_>>().join("\n\n")
}

pub fn quote_of_the_day(q: &Quote) -> String {
    format!("The quote of the day!\n{}", quote(q))
}

pub fn quotes_found(count: u64) -> String {
    match count {
        0 => "No quotes found.".to_owned(),
        n => format!("{n} quotes found."),
    }
}

pub fn persons_found(count: u64) -> String {
    match count {
        0 => "No persons found.".to_owned(),
        n => format!("{n} persons found."),
    }
}

pub fn person_list(persons: &[Person]) -> String {
    persons.iter().map(|p| format!("- {}", p.full_name())).collect::<Vec<_>>().join("\n")
}

pub fn already_subscribed(time: SubscriptionTime) -> String {
    format!("You are already subscribed to the quote of the day at {time}.")
}

pub fn subscription_removed(time: SubscriptionTime) -> String {
    format!("Your subscription for {time} was removed.")
}

pub fn subscription_successful(time: SubscriptionTime) -> String {
    format!("You will receive the quote of the day every day at {time}.")
}

pub fn approval_request(actor: &Actor) -> String {
    format!("{} requests access to the bot.", actor.label())
}

pub fn approved_notice(actor: &Actor) -> String {
    format!("{} was whitelisted.", actor.label())
}

pub fn denied_notice(actor: &Actor) -> String {
    format!("{} was blacklisted.", actor.label())
}

pub fn already_whitelisted(id: impl std::fmt::Display) -> String {
    format!("{id} is already whitelisted.")
}

pub fn already_blacklisted(id: impl std::fmt::Display) -> String {
    format!("{id} is already blacklisted.")
}

fn actor_lines(actors: &[Actor]) -> String {
    actors.iter().map(|a| format!("- {}", a.label())).collect::<Vec<_>>().join("\n")
}

pub fn whitelist_overview(actors: &[Actor]) -> String {
    match actors {
        [] => "No whitelisted users.".to_owned(),
        _ => format!("Whitelisted users:\n{}", actor_lines(actors)),
    }
}

pub fn blacklist_overview(actors: &[Actor]) -> String {
    match actors {
        [] => "No blacklisted users.".to_owned(),
        _ => format!("Blacklisted users:\n{}", actor_lines(actors)),
    }
}

pub fn permission_violation(actor: &Actor, command: &str) -> String {
    format!("{} tried to use {command} without permission.", actor.label())
}

pub fn error_report(request: &str, actor: &Actor, code: &str) -> String {
    format!("An error occurred for request {request} by user {}.\nCode: {code}", actor.label())
}
