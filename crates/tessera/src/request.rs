use crate::{BadgeReference, Error, GridSpec, Result};

/// A parsed render request: which badges to show, in order, and how to arrange them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeRequest {
    pub references: Vec<BadgeReference>,
    pub grid: GridSpec,
}

impl BadgeRequest {
    /// Parses a comma-separated badge list such as `"auth, rust,go"`.
    ///
    /// Whitespace inside entries is dropped. Row and column hints of `0` mean "unspecified";
    /// for multi-badge requests neither hint may exceed the number of badges.
    pub fn parse(
        badges: &str,
        owner: Option<&str>,
        rows: Option<usize>,
        cols: Option<usize>,
        fit: Option<bool>,
    ) -> Result<Self> {
        let mut references = Vec::new();
        for entry in badges.split(',') {
            let name: String = entry.chars().filter(|c| !c.is_whitespace()).collect();
            if name.is_empty() {
                return Err(Error::InvalidName {
                    message: "a badge name is required".to_string(),
                });
            }
            references.push(BadgeReference::new(owner, &name));
        }

        let grid = GridSpec::from_hints(rows, cols, fit);
        let items = references.len();
        if items > 1 {
            let r = grid.rows.unwrap_or(0);
            let c = grid.cols.unwrap_or(0);
            if r > items || c > items {
                return Err(Error::HintExceedsCount {
                    rows: r,
                    cols: c,
                    items,
                });
            }
        }

        Ok(Self { references, grid })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|r| r.name.as_str())
    }
}
