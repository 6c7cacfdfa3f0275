use regex::Regex;

/// A single alternation over every known element name, longest names first.
///
/// If one name is a substring of another ("Report" vs "Report_v2"), the
/// longer name must win at a given position, so the alternation is ordered by
/// descending length before compilation. Names pass through [`regex::escape`]
/// so that pattern-special characters match literally.
pub struct NameMatcher {
    pattern: Regex,
}

impl NameMatcher {
    /// Returns `None` when the catalog has no names; the rewrite pass is then
    /// a no-op.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        let mut names: Vec<&str> = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return None;
        }
        // Equal-length names sort lexicographically so duplicates end up
        // adjacent for dedup.
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();

        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        // Escaped literal alternations always compile.
        let pattern = Regex::new(&alternation).ok()?;
        log::trace!("name matcher over {} names", names.len());
        Some(Self { pattern })
    }

    pub fn regex(&self) -> &Regex {
        &self.pattern
    }
}
