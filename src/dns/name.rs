use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while building a [`Name`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("empty name")]
    Empty,
    #[error("empty label in name: {0}")]
    EmptyLabel(String),
    #[error("label exceeds 63 octets in name: {0}")]
    LabelTooLong(String),
    #[error("name exceeds 255 octets: {0}")]
    NameTooLong(String),
}

/// How one name relates to another, viewed from the name
/// [`Name::relation_to`] is called on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRelation {
    Equal,
    /// The name is below the other name.
    Subdomain,
    /// The other name is below this one.
    Superdomain,
    /// The names share a common suffix but neither contains the other.
    CommonAncestor,
    /// No labels in common.
    None,
}

/// An absolute, case-folded domain name.
///
/// Names are immutable once constructed. Label matching is done on the
/// lowercased form, so `WWW.Example.ORG` and `www.example.org` compare
/// equal and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    /// The root name (zero labels).
    pub fn root() -> Self {
        Name { labels: Vec::new() }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// The name with its leftmost label removed, or `None` for the root.
    pub fn parent(&self) -> Option<Name> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Name {
            labels: self.labels[1..].to_vec(),
        })
    }

    /// Compare two names by matching labels from the right.
    pub fn relation_to(&self, other: &Name) -> NameRelation {
        let a = &self.labels;
        let b = &other.labels;
        let mut common = 0;
        while common < a.len() && common < b.len() {
            if a[a.len() - 1 - common] != b[b.len() - 1 - common] {
                break;
            }
            common += 1;
        }
        if common == a.len() && common == b.len() {
            NameRelation::Equal
        } else if common == b.len() {
            NameRelation::Subdomain
        } else if common == a.len() {
            NameRelation::Superdomain
        } else if common > 0 {
            NameRelation::CommonAncestor
        } else {
            NameRelation::None
        }
    }

    /// True if this name is at or below the given zone apex.
    pub fn is_in_zone(&self, apex: &Name) -> bool {
        matches!(
            self.relation_to(apex),
            NameRelation::Equal | NameRelation::Subdomain
        )
    }

    /// Uncompressed wire-format encoding, used when a name is embedded in
    /// an rdata payload.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire =
            Vec::with_capacity(self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1);
        for label in &self.labels {
            wire.push(label.len() as u8);
            wire.extend_from_slice(label.as_bytes());
        }
        wire.push(0);
        wire
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, NameError> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        if s == "." {
            return Ok(Name::root());
        }

        let trimmed = s.strip_suffix('.').unwrap_or(s);
        let mut labels = Vec::new();
        let mut wire_len = 1usize;
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(NameError::EmptyLabel(s.to_string()));
            }
            if label.len() > 63 {
                return Err(NameError::LabelTooLong(s.to_string()));
            }
            wire_len += label.len() + 1;
            labels.push(label.to_lowercase());
        }
        if wire_len > 255 {
            return Err(NameError::NameTooLong(s.to_string()));
        }
        Ok(Name { labels })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for label in &self.labels {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}
