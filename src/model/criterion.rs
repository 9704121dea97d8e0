use std::fmt;

use log::warn;

/// Separator between the levels of a tree or menu path, e.g. `File->Open`.
pub const PATH_SEPARATOR: &str = "->";
pub const INVALID_INDEX: i64 = -1;
/// Expected index meaning "any match will do".
pub const INDEX_TRY_ALL_MATCHED_ITEMS: i64 = -1000;

/// What to look for among the items of a widget: a text (or a path of texts
/// for hierarchical widgets) and which of the matches to take.
///
/// ```rust
/// use widgetdriver_sync::model::TextMatchingCriterion;
///
/// let criterion = TextMatchingCriterion::from_path("Colors->Red", false, Some("1->2"));
/// assert!(criterion.is_hierarchical());
/// assert_eq!(criterion.expected_indices(), Some(&[0, 1][..]));
/// assert!(criterion.match_text_at_level("Red", 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatchingCriterion {
    text: Option<String>,
    path_array: Vec<String>,
    partial: bool,
    separator: String,
    expected_index: i64,
    expected_indices: Option<Vec<i64>>,
}

fn tokens(text: &str, separator: &str) -> Vec<String> {
    text.split(separator).map(|s| s.trim().to_string()).collect()
}

impl TextMatchingCriterion {
    /// Match by item index only.
    pub fn new_index(expected_index: i64) -> Self {
        TextMatchingCriterion {
            text: None,
            path_array: Vec::new(),
            partial: false,
            separator: PATH_SEPARATOR.to_string(),
            expected_index,
            expected_indices: None,
        }
    }

    /// Match the `expected_index`-th (0-based) item whose text matches.
    pub fn new(text: &str, partial: bool, expected_index: i64) -> Self {
        TextMatchingCriterion {
            text: Some(text.to_string()),
            path_array: tokens(text, PATH_SEPARATOR),
            partial,
            separator: PATH_SEPARATOR.to_string(),
            expected_index,
            expected_indices: None,
        }
    }

    /// Match a path level by level. `index_path` holds 1-based indices using
    /// the same separator as `path`; each selects the n-th match at its
    /// level. A missing index path means the first match at every level.
    pub fn from_path(path: &str, partial: bool, index_path: Option<&str>) -> Self {
        let nodes = tokens(path, PATH_SEPARATOR);
        let indices: Vec<i64> = match index_path.filter(|p| !p.is_empty()) {
            None => vec![0; nodes.len()],
            Some(index_path) => {
                let raw = tokens(index_path, PATH_SEPARATOR);
                if raw.len() != nodes.len() {
                    warn!(
                        "path length '{}' does NOT equal to indexPath length '{}'",
                        nodes.len(),
                        raw.len()
                    );
                }
                raw.iter()
                    .map(|s| match s.parse::<i64>() {
                        Ok(i) => i - 1,
                        Err(_) => {
                            warn!("'{}' cannot be converted to int.", s);
                            0
                        }
                    })
                    .collect()
            }
        };

        let mut criterion = TextMatchingCriterion {
            text: Some(path.to_string()),
            path_array: nodes,
            partial,
            separator: PATH_SEPARATOR.to_string(),
            expected_index: INVALID_INDEX,
            expected_indices: Some(indices),
        };
        if !criterion.is_hierarchical() {
            if let Some(first) = criterion.expected_indices.as_ref().and_then(|v| v.first()) {
                criterion.expected_index = *first;
            }
        }
        criterion
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The path split into its levels.
    pub fn path(&self) -> &[String] {
        &self.path_array
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn expected_index(&self) -> i64 {
        self.expected_index
    }

    pub fn set_expected_index(&mut self, index: i64) {
        self.expected_index = index;
    }

    pub fn expected_indices(&self) -> Option<&[i64]> {
        self.expected_indices.as_deref()
    }

    /// Whether each path level is matched by its own index rather than by a
    /// running count over the whole tree.
    pub fn match_index_hierarchically(&self) -> bool {
        self.expected_indices.is_some()
    }

    pub fn is_hierarchical(&self) -> bool {
        if self.expected_indices.as_ref().map(|v| v.len() > 1).unwrap_or(false) {
            return true;
        }
        self.text.as_ref().map(|t| t.contains(&self.separator)).unwrap_or(false)
    }

    pub fn match_text(&self, actual: &str) -> bool {
        match &self.text {
            Some(expected) => match_text(actual, expected, self.partial),
            None => false,
        }
    }

    pub fn match_text_at_level(&self, actual: &str, level: usize) -> bool {
        match self.path_array.get(level) {
            Some(expected) => match_text(actual, expected, self.partial),
            None => false,
        }
    }
}

/// Case-sensitive text match, either exact or by substring.
pub fn match_text(actual: &str, expected: &str, partial: bool) -> bool {
    if partial {
        actual.contains(expected)
    } else {
        actual == expected
    }
}

impl fmt::Display for TextMatchingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text/path={} ", self.text.as_deref().unwrap_or("null"))?;
        write!(f, "partialMatch={} ", self.partial)?;
        match &self.expected_indices {
            Some(indices) => {
                let joined: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                write!(f, "expectedMatchedIndices={} ", joined.join(&self.separator))
            }
            None => write!(f, "expectedMatchedIndex={} ", self.expected_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let c = TextMatchingCriterion::new("Apple", false, 0);
        assert!(!c.is_hierarchical());
        assert!(!c.match_index_hierarchically());
        assert!(c.match_text("Apple"));
        assert!(!c.match_text("Apple pie"));
        assert_eq!(c.to_string(), "text/path=Apple partialMatch=false expectedMatchedIndex=0 ");

        let c = TextMatchingCriterion::new("Apple", true, 0);
        assert!(c.match_text("Apple pie"));
        assert!(!c.match_text("apple pie"));
    }

    #[test]
    fn test_path_without_index_path() {
        let c = TextMatchingCriterion::from_path("File->Save As", false, None);
        assert!(c.is_hierarchical());
        assert_eq!(c.path(), &["File".to_string(), "Save As".to_string()][..]);
        assert_eq!(c.expected_indices(), Some(&[0, 0][..]));
        assert_eq!(c.expected_index(), INVALID_INDEX);
        assert_eq!(
            c.to_string(),
            "text/path=File->Save As partialMatch=false expectedMatchedIndices=0->0 "
        );
    }

    #[test]
    fn test_single_level_path_sets_index() {
        let c = TextMatchingCriterion::from_path("Save", false, Some("3"));
        assert!(!c.is_hierarchical());
        assert_eq!(c.expected_index(), 2);
    }

    #[test]
    fn test_bad_index_entry_defaults_to_zero() {
        let c = TextMatchingCriterion::from_path("A->B", false, Some("x->2"));
        assert_eq!(c.expected_indices(), Some(&[0, 1][..]));
    }

    #[test]
    fn test_match_at_level() {
        let c = TextMatchingCriterion::from_path("A->Bee", true, None);
        assert!(c.match_text_at_level("Bees", 1));
        assert!(!c.match_text_at_level("A", 2));
    }

    #[test]
    fn test_index_only() {
        let c = TextMatchingCriterion::new_index(4);
        assert_eq!(c.text(), None);
        assert!(!c.match_text("anything"));
        assert!(!c.is_hierarchical());
    }
}
