/// Case-insensitive include/exclude lists applied to table names after
/// fetching. An empty include list means "no restriction"; exclude always
/// wins over include.
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl TableFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        TableFilter {
            include: include.into_iter().map(|s| s.to_ascii_uppercase()).collect(),
            exclude: exclude.into_iter().map(|s| s.to_ascii_uppercase()).collect(),
        }
    }

    pub fn allows(&self, table_name: &str) -> bool {
        let upper = table_name.to_ascii_uppercase();
        if self.exclude.iter().any(|e| e == &upper) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|i| i == &upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_lists_allows_everything() {
        let f = TableFilter::default();
        assert!(f.allows("EMPLOYEES"));
    }

    #[test]
    fn include_is_case_insensitive() {
        let f = TableFilter::new(vec!["employees".to_string()], vec![]);
        assert!(f.allows("EMPLOYEES"));
        assert!(!f.allows("DEPARTMENTS"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let f = TableFilter::new(vec!["EMPLOYEES".to_string()], vec!["EMPLOYEES".to_string()]);
        assert!(!f.allows("EMPLOYEES"));
    }
}
