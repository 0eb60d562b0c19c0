/// Honorifics recognised by default. Order does not matter here;
/// `NameNormalizer::new` sorts longest-first so `นางสาว` wins over `นาง`.
pub const DEFAULT_NAME_PREFIXES: [&str; 3] = ["นาย", "นางสาว", "นาง"];

/// Strips leading honorific titles from candidate names.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    prefixes: Vec<String>,
}

impl NameNormalizer {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .collect();
        // Stable sort keeps caller order among equal lengths.
        prefixes.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Remove the first matching honorific, longest first, and trim.
    ///
    /// Only one prefix is removed, so a given name that itself starts with a
    /// title syllable (`นางนวล`) survives. Stable for any name that does not
    /// carry a stacked title.
    pub fn normalize(&self, name: &str) -> String {
        let name = name.trim();
        self.prefixes
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix.as_str()))
            .unwrap_or(name)
            .trim()
            .to_string()
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PREFIXES)
    }
}
