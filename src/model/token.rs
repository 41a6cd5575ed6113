use serde::{Deserialize, Serialize};

/// The three kinds of inline token a task body can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Tag,
    Person,
    State,
}

impl TokenKind {
    pub fn prefix(self) -> char {
        match self {
            TokenKind::Tag => '#',
            TokenKind::Person => '@',
            TokenKind::State => '!',
        }
    }

    pub fn from_prefix(c: char) -> Option<TokenKind> {
        match c {
            '#' => Some(TokenKind::Tag),
            '@' => Some(TokenKind::Person),
            '!' => Some(TokenKind::State),
            _ => None,
        }
    }

    /// Classify a prefixed token such as `#urgent`.
    ///
    /// The body must be non-empty and free of whitespace, `#` and `@`, which is
    /// exactly what the body parser would extract as a single token.
    pub fn of(token: &str) -> Option<TokenKind> {
        let mut chars = token.chars();
        let kind = TokenKind::from_prefix(chars.next()?)?;
        let body = chars.as_str();
        if body.is_empty() || !body.chars().all(is_token_char) {
            return None;
        }
        Some(kind)
    }

    /// Prefix a bare key, leaving already-prefixed input alone.
    pub fn prefixed(self, key: &str) -> String {
        if key.starts_with(self.prefix()) {
            key.to_string()
        } else {
            format!("{}{}", self.prefix(), key)
        }
    }
}

/// Characters allowed after a token prefix
pub fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && c != '#' && c != '@'
}
