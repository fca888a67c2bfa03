/// Requirement id -> uppercase substrings of `"{code} {title}"` that indicate it.
#[derive(Debug, Clone)]
pub struct KeywordMap(Vec<(String, Vec<String>)>);

impl Default for KeywordMap {
    fn default() -> Self {
        Self::from_pairs(&[
            ("bible", &["BIBL", "BIBLE", "SCRIPTURE"]),
            ("historical", &["HIST", "HISTORY", "CHURCH"]),
            ("interreligious", &["INTER", "RELIGION", "DIVERSITY"]),
            ("practical", &["PRAC", "MINISTRY", "PASTORAL"]),
            ("theology_ethics", &["THEO", "ETHICS", "MORAL"]),
            ("field_ed", &["FIELD", "INTERN", "PRACTICUM"]),
            ("mssw_core", &["MSSW", "SOCIAL"]),
            ("integrative_seminar", &["SEMINAR", "INTEGRATIVE"]),
            ("social_work_practice", &["PRACTICE", "CLINICAL"]),
            ("social_work_research", &["RESEARCH", "METHODS"]),
            ("social_work_policy", &["POLICY", "ADVOCACY"]),
        ])
    }
}

impl KeywordMap {
    pub fn from_pairs(pairs: &[(&str, &[&str])]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(req_id, words)| {
                    (
                        req_id.to_string(),
                        words.iter().map(|w| w.to_uppercase()).collect(),
                    )
                })
                .collect(),
        )
    }

    /// Requirement ids with at least one keyword contained in `text` (expected uppercase).
    pub fn matching<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(_, words)| words.iter().any(|w| text.contains(w.as_str())))
            .map(|(req_id, _)| req_id.as_str())
    }
}
