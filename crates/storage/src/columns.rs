use crate::error::StoreError;

pub const UNDEFINED_COLUMN_CODE: &str = "42703";

pub const BASE_COLUMNS: &[&str] = &["id", "author_name", "body", "created_at"];
pub const STYLE_COLUMNS: &[&str] = &["background_color", "font_family"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<&'static str>,
}

impl ColumnSet {
    pub fn new(columns: Vec<&'static str>) -> Self {
        Self { columns }
    }

    pub fn full() -> Self {
        Self::new(BASE_COLUMNS.iter().chain(STYLE_COLUMNS).copied().collect())
    }

    pub fn reduced() -> Self {
        Self::new(BASE_COLUMNS.to_vec())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| *c == column)
    }

    pub fn select_clause(&self) -> String {
        self.columns.join(",")
    }
}

#[derive(Debug, Clone)]
pub struct ColumnStrategy {
    pub preferred: ColumnSet,
    pub reduced: ColumnSet,
}

impl Default for ColumnStrategy {
    fn default() -> Self {
        Self {
            preferred: ColumnSet::full(),
            reduced: ColumnSet::reduced(),
        }
    }
}

impl ColumnStrategy {
    pub fn should_fall_back(&self, err: &StoreError) -> bool {
        self.preferred != self.reduced && is_schema_mismatch(err)
    }
}

pub fn is_schema_mismatch(err: &StoreError) -> bool {
    match err {
        StoreError::Rejected { code, message, .. } => {
            if code.as_deref() == Some(UNDEFINED_COLUMN_CODE) {
                return true;
            }
            let message = message.to_lowercase();
            message.contains("column") || STYLE_COLUMNS.iter().any(|c| message.contains(c))
        }
        StoreError::Transport(_) | StoreError::Decode(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(code: Option<&str>, message: &str) -> StoreError {
        StoreError::Rejected {
            status: 400,
            code: code.map(Into::into),
            message: message.into(),
        }
    }

    #[test]
    fn select_clauses() {
        assert_eq!(
            ColumnSet::full().select_clause(),
            "id,author_name,body,created_at,background_color,font_family"
        );
        assert_eq!(ColumnSet::reduced().select_clause(), "id,author_name,body,created_at");
        assert!(!ColumnSet::reduced().contains("font_family"));
    }

    #[test]
    fn classifier() {
        assert!(is_schema_mismatch(&rejected(Some("42703"), "boom")));
        assert!(is_schema_mismatch(&rejected(
            None,
            "column comments.background_color does not exist"
        )));
        assert!(is_schema_mismatch(&rejected(Some("PGRST204"), "unknown font_family")));
        assert!(!is_schema_mismatch(&rejected(Some("42501"), "permission denied")));
        assert!(!is_schema_mismatch(&StoreError::Transport("column".into())));
    }

    #[test]
    fn no_fallback_when_sets_match() {
        let strategy = ColumnStrategy {
            preferred: ColumnSet::reduced(),
            reduced: ColumnSet::reduced(),
        };
        assert!(!strategy.should_fall_back(&rejected(Some("42703"), "")));
    }
}
