//! Stateless pagination protocol for interactive result lists.
//!
//! A page cursor is serialized into the callback data of an inline control
//! and echoed back verbatim on the next interaction, so no server-side paging
//! session exists. The one-character family prefix keeps quote paging,
//! person selection, and the moderation accept/deny controls unambiguous on
//! the same dispatch path.

use thiserror::Error;

use crate::domain::UserId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("empty callback token")]
    Empty,
    #[error("unknown callback token family `{0}`")]
    UnknownFamily(char),
    #[error("malformed callback token `{0}`")]
    Malformed(String),
    #[error("page cursor out of range: page {page} of {total_pages}")]
    CursorRange { page: u64, total_pages: u64 },
}

/// Position inside a paged result set: 1-indexed, `page <= total_pages`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCursor {
    page: u64,
    total_pages: u64,
}

impl PageCursor {
    pub fn new(page: u64, total_pages: u64) -> Result<Self, TokenError> {
        if page == 0 || total_pages == 0 || page > total_pages {
            return Err(TokenError::CursorRange { page, total_pages });
        }
        Ok(Self { page, total_pages })
    }

    pub fn first(total_pages: u64) -> Result<Self, TokenError> {
        Self::new(1, total_pages)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    fn at(&self, page: u64) -> Self {
        Self { page, total_pages: self.total_pages }
    }
}

/// `ceil(count / page_size)`; zero results means zero pages.
pub fn total_pages(count: u64, page_size: u64) -> u64 {
    count.div_ceil(page_size.max(1))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageNav {
    First,
    Previous,
    Next,
    Last,
}

impl PageNav {
    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "<<",
            Self::Previous => "<",
            Self::Next => ">",
            Self::Last => ">>",
        }
    }
}

/// A selectable navigation control attached to a rendered page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affordance {
    pub nav: PageNav,
    pub target: PageCursor,
}

/// Navigation affordances for the given cursor. The rule is uniform across
/// the initial render and every later page: backward controls above page 1,
/// forward controls below the last page, nothing at all for one page.
pub fn affordances(cursor: PageCursor) -> Vec<Affordance> {
    let mut controls = Vec::with_capacity(4);
    if cursor.page() > 1 {
        controls.push(Affordance { nav: PageNav::First, target: cursor.at(1) });
        controls.push(Affordance { nav: PageNav::Previous, target: cursor.at(cursor.page() - 1) });
    }
    if cursor.page() < cursor.total_pages() {
        controls.push(Affordance { nav: PageNav::Next, target: cursor.at(cursor.page() + 1) });
        controls.push(Affordance { nav: PageNav::Last, target: cursor.at(cursor.total_pages()) });
    }
    controls
}

/// Wire format carried in callback data, one family per prefix:
/// `Q<page>;<total>`, `P<personId>`, `A<chatId>`, `D<chatId>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackToken {
    QuotePage(PageCursor),
    PersonSelect(i64),
    Approve(UserId),
    Deny(UserId),
}

impl CallbackToken {
    pub fn encode(&self) -> String {
        match self {
            Self::QuotePage(cursor) => format!("Q{};{}", cursor.page(), cursor.total_pages()),
            Self::PersonSelect(id) => format!("P{id}"),
            Self::Approve(id) => format!("A{id}"),
            Self::Deny(id) => format!("D{id}"),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, TokenError> {
        let mut chars = raw.chars();
        let family = chars.next().ok_or(TokenError::Empty)?;
        let rest = chars.as_str();
        match family {
            'Q' => {
                let (page, total) =
                    rest.split_once(';').ok_or_else(|| TokenError::Malformed(raw.to_owned()))?;
                let page = parse_number(raw, page)?;
                let total = parse_number(raw, total)?;
                Ok(Self::QuotePage(PageCursor::new(page, total)?))
            }
            'P' => Ok(Self::PersonSelect(parse_id(raw, rest)?)),
            'A' => Ok(Self::Approve(UserId(parse_id(raw, rest)?))),
            'D' => Ok(Self::Deny(UserId(parse_id(raw, rest)?))),
            other => Err(TokenError::UnknownFamily(other)),
        }
    }
}

fn parse_number(token: &str, raw: &str) -> Result<u64, TokenError> {
    raw.parse::<u64>().map_err(|_| TokenError::Malformed(token.to_owned()))
}

fn parse_id(token: &str, raw: &str) -> Result<i64, TokenError> {
    raw.parse::<i64>().map_err(|_| TokenError::Malformed(token.to_owned()))
}
