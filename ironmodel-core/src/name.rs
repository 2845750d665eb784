//! Canonical identifier names.
//!
//! A [`Name`] is an ordered sequence of lowercase words. It represents an
//! identifier independently of the casing convention used to write it, so
//! `diskAttachment`, `DiskAttachment` and `DISK_ATTACHMENT` can all map to the
//! same name depending on how they are parsed.

use std::fmt;

/// Marker used in declarations to escape identifiers that collide with
/// reserved words of the source notation (`_default`, `interface_`).
pub const ESCAPE_MARKER: char = '_';

/// Separator used for enum constant identifiers.
pub const ENUM_SEPARATOR: char = '_';

/// Strategy used to split raw identifier text into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameMode {
    /// Split at lower-to-upper case transitions. Runs of uppercase letters
    /// stay in the same word.
    CaseSplit,
    /// Split on the given separator character.
    SeparatorSplit(char),
}

/// Canonical, casing-independent identifier.
///
/// Equality and ordering only look at the words; ordering is lexicographic
/// over the word sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    words: Vec<String>,
}

impl Name {
    /// Creates a name from already separated words.
    ///
    /// Words are lowercased and empty words are dropped.
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parses raw identifier text using the given mode.
    ///
    /// A single leading and a single trailing [`ESCAPE_MARKER`] are removed
    /// before splitting.
    #[must_use]
    pub fn parse(text: &str, mode: NameMode) -> Self {
        canonicalize(text, mode)
    }

    /// Parses text written in camel or Pascal case.
    #[must_use]
    pub fn from_case(text: &str) -> Self {
        canonicalize(text, NameMode::CaseSplit)
    }

    /// Parses text whose words are separated by `separator`.
    #[must_use]
    pub fn from_separator(text: &str, separator: char) -> Self {
        canonicalize(text, NameMode::SeparatorSplit(separator))
    }

    /// Returns the words of the name.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Returns the number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the name has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the last word, if any.
    #[must_use]
    pub fn last_word(&self) -> Option<&str> {
        self.words.last().map(String::as_str)
    }

    /// Returns a copy of the name with the last word replaced by the result of `f`.
    #[must_use]
    pub fn map_last_word<F>(&self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        let mut words = self.words.clone();
        if let Some(last) = words.last_mut() {
            *last = f(last).to_lowercase();
        }
        Self::new(words)
    }

    /// Returns a copy of the name with `word` inserted as the first word.
    #[must_use]
    pub fn with_prefix(&self, word: &str) -> Self {
        Self::new(std::iter::once(word).chain(self.words.iter().map(String::as_str)))
    }

    /// Joins the words with the given separator.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.words.join(separator)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("_"))
    }
}

/// Converts raw identifier text into a [`Name`].
///
/// Enum constants are parsed with [`NameMode::SeparatorSplit`] on `_`,
/// everything else with [`NameMode::CaseSplit`]. Empty text yields an empty
/// name.
#[must_use]
pub fn canonicalize(text: &str, mode: NameMode) -> Name {
    let text = strip_escape(text);
    match mode {
        NameMode::CaseSplit => split_case(text),
        NameMode::SeparatorSplit(separator) => Name::new(text.split(separator)),
    }
}

fn strip_escape(text: &str) -> &str {
    let text = text.strip_prefix(ESCAPE_MARKER).unwrap_or(text);
    text.strip_suffix(ESCAPE_MARKER).unwrap_or(text)
}

fn split_case(text: &str) -> Name {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous: Option<char> = None;

    for c in text.chars() {
        if let Some(p) = previous {
            if c.is_uppercase() && !p.is_uppercase() && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
        previous = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    Name::new(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(name: &Name) -> Vec<&str> {
        name.words().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_case_split() {
        assert_eq!(words(&Name::from_case("diskAttachment")), ["disk", "attachment"]);
        assert_eq!(words(&Name::from_case("DiskAttachment")), ["disk", "attachment"]);
        assert_eq!(words(&Name::from_case("vm")), ["vm"]);
    }

    #[test]
    fn test_case_split_uppercase_run() {
        assert_eq!(words(&Name::from_case("VmNIC")), ["vm", "nic"]);
        assert_eq!(words(&Name::from_case("Ipv4Address")), ["ipv4", "address"]);
    }

    #[test]
    fn test_separator_split() {
        assert_eq!(words(&Name::from_separator("READ_ONLY", '_')), ["read", "only"]);
        assert_eq!(words(&Name::from_separator("org.ovirt.Api", '.')), ["org", "ovirt", "api"]);
        assert_eq!(words(&Name::from_separator("A__B", '_')), ["a", "b"]);
    }

    #[test]
    fn test_escape_markers_removed() {
        let plain = Name::from_case("Foo");
        assert_eq!(Name::from_case("_Foo"), plain);
        assert_eq!(Name::from_case("Foo_"), plain);
        assert_eq!(Name::from_case("_Foo_"), plain);
        assert_eq!(Name::from_case("_default"), Name::from_case("default"));
    }

    #[test]
    fn test_only_one_escape_marker_removed() {
        assert_eq!(words(&Name::from_separator("__X", '-')), ["_x"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(Name::from_case("").is_empty());
        assert!(Name::from_separator("", '_').is_empty());
        assert!(Name::from_case("_").is_empty());
    }

    #[test]
    fn test_enum_token_round_trip() {
        let name = Name::from_separator("READ_ONLY", ENUM_SEPARATOR);
        let lower = name.words().iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_");
        let upper = name.words().iter().map(|w| w.to_uppercase()).collect::<Vec<_>>().join("_");
        assert_eq!(Name::from_separator(&lower, ENUM_SEPARATOR), name);
        assert_eq!(Name::from_separator(&upper, ENUM_SEPARATOR), name);
    }

    #[test]
    fn test_ordering_is_lexicographic_over_words() {
        let a = Name::new(["a", "b"]);
        let b = Name::new(["a", "c"]);
        let c = Name::new(["a"]);
        assert!(a < b);
        assert!(c < a);
        assert_eq!(Name::new(["Disk"]), Name::new(["disk"]));
    }

    #[test]
    fn test_map_last_word_and_prefix() {
        let name = Name::from_case("dnsServer");
        assert_eq!(name.map_last_word(|w| format!("{w}s")).to_string(), "dns_servers");
        assert_eq!(name.with_prefix("001").to_string(), "001_dns_server");
        assert_eq!(name.last_word(), Some("server"));
    }
}
