use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,30}$").unwrap());

/// Fragments rejected by the block-list policy
static BLOCKED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)'|--|;|/\*|\*/|xp_|exec|union|select|insert|update|delete|drop|script").unwrap()
});

pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 100;
pub const NOTE_MAX_CHARS: usize = 500;
pub const QUERY_MAX_CHARS: usize = 100;

/// Allow-list rule attached to a request field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `^[A-Za-z0-9_-]{3,30}$`
    Username,
    /// 6 to 100 characters
    Password,
    /// At most 500 characters
    Note,
    /// At most 100 characters
    SearchQuery,
}

impl Rule {
    /// Message returned to the client when the rule fails
    pub fn message(self) -> &'static str {
        match self {
            Rule::Username => {
                "Username must be 3-30 characters long and contain only letters, numbers, underscores or hyphens."
            }
            Rule::Password => "Password must be between 6 and 100 characters long.",
            Rule::Note => "Sensitive note must be at most 500 characters long.",
            Rule::SearchQuery => "Search query must be at most 100 characters long.",
        }
    }

    /// Lengths count Unicode scalar values, not bytes
    pub fn check(self, value: &str) -> Result<(), &'static str> {
        let chars = value.chars().count();
        let valid = match self {
            Rule::Username => USERNAME_REGEX.is_match(value),
            Rule::Password => (PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&chars),
            Rule::Note => chars <= NOTE_MAX_CHARS,
            Rule::SearchQuery => chars <= QUERY_MAX_CHARS,
        };

        if valid { Ok(()) } else { Err(self.message()) }
    }
}

/// Whether `value` contains any block-listed SQL or script fragment
///
/// Matches `'`, `--`, `;`, `/*`, `*/` and, ignoring case, `xp_`, `exec`,
/// `union`, `select`, `insert`, `update`, `delete`, `drop` and `script`.
/// Substrings count, so `"undeleted"` is rejected too.
pub fn contains_blocked_pattern(value: &str) -> bool {
    BLOCKED_REGEX.is_match(value)
}
