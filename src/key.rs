//! Record keys: tuples of labels
use std::fmt;
use std::fmt::Formatter;

/// Longest label GAMS accepts
pub const MAX_LABEL_LENGTH: usize = 63;

/// The key of a record: one label per dimension of its symbol.
///
/// Keys convert from the usual string shapes, so one-dimensional data can be
/// passed as plain strings and multi-dimensional data as arrays or vectors:
///
/// ```
/// use gams_session::key::Key;
///
/// assert_eq!(Key::from("a").dim(), 1);
/// assert_eq!(Key::from(["a", "b"]).labels(), &["a", "b"]);
/// assert_eq!(Key::from(vec!["a".to_string()]), Key::from("a"));
/// assert_eq!(Key::from(["a", "b"]).to_string(), "'a'.'b'");
/// assert_eq!(Key::from(()).dim(), 0); // the key of a scalar
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Key(Vec<String>);

impl Key {
    /// Build a key from its labels
    pub fn new<I, S>(labels: I) -> Key
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Key(labels.into_iter().map(Into::into).collect())
    }

    /// The empty key of a scalar symbol
    pub fn scalar() -> Key {
        Key(Vec::new())
    }

    /// Labels, in dimension order
    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Number of labels
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// The key GAMS considers equal: labels match case-insensitively
    pub(crate) fn folded(&self) -> Vec<String> {
        self.0.iter().map(|l| l.to_ascii_lowercase()).collect()
    }

    /// Check that every label can be written in GAMS syntax
    pub fn validate(&self) -> Result<(), String> {
        for label in &self.0 {
            if label.is_empty() {
                return Err(format!("empty label in key {}", self));
            }
            if label.chars().count() > MAX_LABEL_LENGTH {
                return Err(format!(
                    "label '{}' is longer than {} characters",
                    label, MAX_LABEL_LENGTH
                ));
            }
            if label.contains('\'') && label.contains('"') {
                return Err(format!("label {:?} contains both quote characters", label));
            }
            if label.chars().any(char::is_control) {
                return Err(format!("label {:?} contains control characters", label));
            }
        }
        Ok(())
    }
}

/// Quote a label for GAMS source: single quotes unless the label contains one
pub fn quote_label(label: &str) -> String {
    if label.contains('\'') {
        format!("\"{}\"", label)
    } else {
        format!("'{}'", label)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, label) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            f.write_str(&quote_label(label))?;
        }
        Ok(())
    }
}

impl From<()> for Key {
    fn from(_: ()) -> Self {
        Key::scalar()
    }
}

impl From<&str> for Key {
    fn from(label: &str) -> Self {
        Key(vec![label.to_string()])
    }
}

impl From<&&str> for Key {
    fn from(label: &&str) -> Self {
        Key(vec![label.to_string()])
    }
}

impl From<String> for Key {
    fn from(label: String) -> Self {
        Key(vec![label])
    }
}

impl From<&String> for Key {
    fn from(label: &String) -> Self {
        Key(vec![label.clone()])
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Key {
    fn from(labels: [S; N]) -> Self {
        Key::new(labels)
    }
}

impl<S: AsRef<str>, const N: usize> From<&[S; N]> for Key {
    fn from(labels: &[S; N]) -> Self {
        Key::new(labels.iter().map(|l| l.as_ref().to_string()))
    }
}

impl<S: AsRef<str>> From<&[S]> for Key {
    fn from(labels: &[S]) -> Self {
        Key::new(labels.iter().map(|l| l.as_ref().to_string()))
    }
}

impl<S: Into<String>> From<Vec<S>> for Key {
    fn from(labels: Vec<S>) -> Self {
        Key::new(labels)
    }
}

impl<S: AsRef<str>> From<&Vec<S>> for Key {
    fn from(labels: &Vec<S>) -> Self {
        Key::new(labels.iter().map(|l| l.as_ref().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_like_gams() {
        assert_eq!(Key::from(["Seattle", "NY"]).folded(), Key::from(["seattle", "ny"]).folded());
    }

    #[test]
    fn quotes_labels_with_apostrophes() {
        assert_eq!(Key::from(["o'hare", "b"]).to_string(), "\"o'hare\".'b'");
    }

    #[test]
    fn rejects_unwritable_labels() {
        assert!(Key::from("").validate().is_err());
        assert!(Key::from("a'\"b").validate().is_err());
        assert!(Key::from("x".repeat(MAX_LABEL_LENGTH + 1)).validate().is_err());
        assert!(Key::from("tab\there").validate().is_err());
        assert!(Key::from(["new-york", "o'hare"]).validate().is_ok());
    }
}
