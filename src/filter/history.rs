use std::fmt;

/// Path plus query string, the application's equivalent of a page URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    path: String,
    query: String,
}

impl Location {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.is_empty() { "/".to_string() } else { path };
        let query = query.into();
        let query = query.strip_prefix('?').map(str::to_string).unwrap_or(query);
        Self { path, query }
    }

    /// Accepts `"/local?country=..."`, a bare path, or a full URL whose
    /// path and query are kept.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = match raw.find("://") {
            Some(scheme_end) => {
                let rest = &raw[scheme_end + 3..];
                rest.find(['/', '?', '#']).map_or("", |i| &rest[i..])
            }
            None => raw,
        };
        let raw = raw.split('#').next().unwrap_or_default();
        match raw.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(raw, ""),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self::new(self.path.clone(), query)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

/// Session history. Navigation pushes; filter edits replace the current
/// entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
    cursor: usize,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.cursor]
    }

    pub fn push(&mut self, location: Location) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(location);
        self.cursor = self.entries.len() - 1;
    }

    pub fn replace(&mut self, location: Location) {
        self.entries[self.cursor] = location;
    }

    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_and_urls() {
        let loc = Location::parse("/local?country=%D0%A1%D0%A8%D0%90&transport=rail");
        assert_eq!(loc.path(), "/local");
        assert_eq!(loc.query(), "country=%D0%A1%D0%A8%D0%90&transport=rail");

        let loc = Location::parse("http://localhost:3000/participants?role=x#top");
        assert_eq!(loc.path(), "/participants");
        assert_eq!(loc.query(), "role=x");

        assert_eq!(Location::parse("").to_string(), "/");
        assert_eq!(Location::parse("https://host").path(), "/");
    }

    #[test]
    fn url_without_path_keeps_query() {
        let loc = Location::parse("https://host?role=x");
        assert_eq!(loc.path(), "/");
        assert_eq!(loc.query(), "role=x");

        let loc = Location::parse("http://localhost:3000?transport=air#top");
        assert_eq!(loc.to_string(), "/?transport=air");

        assert_eq!(Location::parse("https://host#top").to_string(), "/");
    }

    #[test]
    fn replace_does_not_grow_history() {
        let mut history = History::new(Location::parse("/"));
        history.push(Location::parse("/local"));
        history.replace(Location::parse("/local?transport=air"));
        history.replace(Location::parse("/local?transport=sea"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().to_string(), "/local?transport=sea");
        assert!(history.back());
        assert_eq!(history.current().path(), "/");
        assert!(!history.back());
    }

    #[test]
    fn push_discards_forward_entries() {
        let mut history = History::new(Location::parse("/"));
        history.push(Location::parse("/local"));
        history.push(Location::parse("/participants"));
        history.back();
        history.back();
        history.push(Location::parse("/participants?role=a"));
        assert_eq!(history.len(), 2);
        assert!(!history.can_go_forward());
        assert!(history.can_go_back());
    }
}
