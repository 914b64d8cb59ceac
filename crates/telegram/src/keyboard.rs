//! Inline keyboard builders.
//!
//! Keyboards are the only interactive surface the bot renders; every button
//! carries an encoded [`CallbackToken`] that the callback dispatcher decodes
//! back on the next interaction.

use serde::Serialize;

use brainbot_core::domain::{Person, UserId};
use brainbot_core::paging::{affordances, CallbackToken, PageCursor};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, token: &CallbackToken) -> Self {
        Self { text: text.into(), callback_data: token.encode() }
    }
}

/// Mirrors the platform's `reply_markup` shape so it serializes directly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn row(mut self, row: Vec<InlineButton>) -> Self {
        self.inline_keyboard.push(row);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inline_keyboard.is_empty()
    }
}

/// One row of navigation controls for the cursor, or `None` when the result
/// set fits on a single page.
pub fn pagination(cursor: PageCursor) -> Option<InlineKeyboard> {
    let controls = affordances(cursor);
    if controls.is_empty() {
        return None;
    }
    let row = controls
        .into_iter()
        .map(|control| {
            InlineButton::new(control.nav.label(), &CallbackToken::QuotePage(control.target))
        })
        .collect();
    Some(InlineKeyboard::default().row(row))
}

/// Accept/Deny pair attached to an access-request broadcast.
pub fn approval(subject: UserId) -> InlineKeyboard {
    InlineKeyboard::default().row(vec![
        InlineButton::new("Accept", &CallbackToken::Approve(subject)),
        InlineButton::new("Deny", &CallbackToken::Deny(subject)),
    ])
}

/// One button per quoted person, two to a row.
pub fn person_selection(persons: &[Person]) -> InlineKeyboard {
    persons.chunks(2).fold(InlineKeyboard::default(), |keyboard, pair| {
        keyboard.row(
            pair.iter()
                .map(|person| {
                    InlineButton::new(person.full_name(), &CallbackToken::PersonSelect(person.id))
                })
                .collect(),
        )
    })
}

#[cfg(test)]
mod tests {
    use brainbot_core::domain::{Person, UserId};
    use brainbot_core::paging::PageCursor;

    use super::{approval, pagination, person_selection};

    #[test]
    fn single_page_renders_no_keyboard() {
        assert_eq!(pagination(PageCursor::new(1, 1).expect("cursor")), None);
    }

    #[test]
    fn middle_page_renders_one_row_of_four() {
        let keyboard = pagination(PageCursor::new(2, 4).expect("cursor")).expect("keyboard");
        assert_eq!(keyboard.inline_keyboard.len(), 1);
        let row = &keyboard.inline_keyboard[0];
        let data: Vec<&str> = row.iter().map(|b| b.callback_data.as_str()).collect();
        assert_eq!(data, vec!["Q1;4", "Q1;4", "Q3;4", "Q4;4"]);
        assert_eq!(row[0].text, "<<");
        assert_eq!(row[3].text, ">>");
    }

    #[test]
    fn approval_keyboard_tags_the_subject() {
        let keyboard = approval(UserId(77));
        let row = &keyboard.inline_keyboard[0];
        assert_eq!(row[0].text, "Accept");
        assert_eq!(row[0].callback_data, "A77");
        assert_eq!(row[1].text, "Deny");
        assert_eq!(row[1].callback_data, "D77");
    }

    #[test]
    fn person_selection_packs_two_per_row() {
        let persons = vec![
            Person { id: 1, first_name: "Ada".into(), last_name: "Lovelace".into() },
            Person { id: 2, first_name: "Alan".into(), last_name: "Turing".into() },
            Person { id: 3, first_name: "Grace".into(), last_name: "Hopper".into() },
        ];
        let keyboard = person_selection(&persons);
        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[0][0].text, "Ada Lovelace");
        assert_eq!(keyboard.inline_keyboard[1][0].callback_data, "P3");
    }
}
