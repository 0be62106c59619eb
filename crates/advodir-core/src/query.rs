//! Query builder. Turns a raw search string into a [`Predicate`].
//!
//! The predicate is a plain value. Both the page fetch and the total count
//! consume the same value, so the two numbers are always computed against the
//! same logical filter. Each store compiles it to its own native form; see
//! [`crate::store`].

use crate::types::Advocate;

/// One of the four searchable text attributes of an [`Advocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    FirstName,
    LastName,
    City,
    Degree,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::FirstName,
        SearchField::LastName,
        SearchField::City,
        SearchField::Degree,
    ];

    /// Column name in both the `advocates` table and the search index.
    pub fn column(self) -> &'static str {
        match self {
            SearchField::FirstName => "first_name",
            SearchField::LastName => "last_name",
            SearchField::City => "city",
            SearchField::Degree => "degree",
        }
    }

    pub fn value(self, advocate: &Advocate) -> &str {
        match self {
            SearchField::FirstName => &advocate.first_name,
            SearchField::LastName => &advocate.last_name,
            SearchField::City => &advocate.city,
            SearchField::Degree => &advocate.degree,
        }
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Case folding shared by every store and by the search index, so that
/// "SMITH" and "smith" always select the same rows.
///
/// Each character folds on its own, never by its neighbours: final sigma
/// `ς` folds to `σ`, so "ΟΣ" and the prefix of "ΟΣΑ" fold alike.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).map(fold_sigma).collect()
}

fn fold_sigma(c: char) -> char {
    if c == 'ς' {
        'σ'
    } else {
        c
    }
}

// ---------------------------------------------------------------------------
// SearchTerm
// ---------------------------------------------------------------------------

/// A non-empty, case-folded search string. Always matched literally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm {
    folded: String,
}

impl SearchTerm {
    /// Returns `None` for the empty string, which means "no filter".
    pub fn new(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            folded: fold_case(raw),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Length in characters, which is what trigram indexing counts.
    pub fn char_len(&self) -> usize {
        self.folded.chars().count()
    }

    /// `%term%` with `\`, `%` and `_` escaped, for `LIKE ... ESCAPE '\'`.
    pub fn like_pattern(&self) -> String {
        let mut out = String::with_capacity(self.folded.len() + 2);
        out.push('%');
        for c in self.folded.chars() {
            if matches!(c, '\\' | '%' | '_') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('%');
        out
    }

    /// The term as a quoted FTS5 phrase. Inside double quotes every character
    /// is literal except `"`, which is doubled.
    pub fn fts_phrase(&self) -> String {
        format!("\"{}\"", self.folded.replace('"', "\"\""))
    }

    /// Case-insensitive substring test against an arbitrary field value.
    pub fn is_in(&self, value: &str) -> bool {
        fold_case(value).contains(&self.folded)
    }
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// The filter applied to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// No filter: every record matches.
    MatchAll,
    /// A record matches when **any** listed field contains `term`.
    SubstringOr {
        fields: Vec<SearchField>,
        term: SearchTerm,
    },
}

impl Predicate {
    /// Build the predicate for a raw search string. Empty means
    /// [`Predicate::MatchAll`]; anything else searches all four fields.
    pub fn build(search: &str) -> Self {
        match SearchTerm::new(search) {
            None => Predicate::MatchAll,
            Some(term) => Predicate::SubstringOr {
                fields: SearchField::ALL.to_vec(),
                term,
            },
        }
    }

    /// Evaluate the predicate in-process. This is the reference semantics
    /// every store must agree with.
    pub fn matches(&self, advocate: &Advocate) -> bool {
        match self {
            Predicate::MatchAll => true,
            Predicate::SubstringOr { fields, term } => {
                fields.iter().any(|f| term.is_in(f.value(advocate)))
            }
        }
    }

    pub fn term(&self) -> Option<&SearchTerm> {
        match self {
            Predicate::MatchAll => None,
            Predicate::SubstringOr { term, .. } => Some(term),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
