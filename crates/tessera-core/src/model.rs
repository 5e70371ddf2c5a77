use crate::dimensions::{Dimensions, resolve_dimensions};
use crate::markup;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Jpeg,
    Png,
    Svg,
}

impl SourceKind {
    /// Accepts an extension with or without the leading dot, case-insensitively.
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.trim();
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(Error::UnsupportedSourceType {
                kind: if ext.is_empty() {
                    "(none)".to_string()
                } else {
                    ext.to_string()
                },
            }),
        }
    }

    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Svg => SVG_MEDIA_TYPE,
        }
    }

    pub fn is_raster(self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

/// Raw bytes of an uploaded image. Lives only for the duration of one upload.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub kind: SourceKind,
    pub bytes: Vec<u8>,
}

impl SourceAsset {
    pub fn new(kind: SourceKind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }

    pub fn from_file_name(file_name: &str, bytes: Vec<u8>) -> Result<Self> {
        Ok(Self::new(SourceKind::from_file_name(file_name)?, bytes))
    }
}

/// A badge name, optionally qualified by the owner scope that should be searched first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BadgeReference {
    pub owner: Option<String>,
    pub name: String,
}

impl BadgeReference {
    pub fn new(owner: Option<&str>, name: &str) -> Self {
        Self {
            owner: owner
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string),
            name: name.to_string(),
        }
    }
}

/// Requested grid shape. `None` counts are inferred from the number of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    /// Force every cell to a square of row height instead of the natural width.
    pub fit: bool,
}

impl GridSpec {
    /// Builds a spec from request hints where `0` and absent both mean "unspecified".
    pub fn from_hints(rows: Option<usize>, cols: Option<usize>, fit: Option<bool>) -> Self {
        Self {
            rows: rows.filter(|&r| r > 0),
            cols: cols.filter(|&c| c > 0),
            fit: fit.unwrap_or(false),
        }
    }
}

/// A self-contained SVG snippet for one badge together with facts derived from it.
///
/// Fragments are immutable; every transform returns a new fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFragment {
    markup: String,
    dimensions: Dimensions,
    clip_id: Option<String>,
}

impl VectorFragment {
    /// Wraps markup, resolving its intrinsic size and clip identifier.
    pub fn parse(markup: impl Into<String>) -> Result<Self> {
        let markup = markup.into();
        let Some(root) = markup::root_tag(&markup)? else {
            return Err(Error::MalformedMarkup {
                message: "no root element".to_string(),
            });
        };
        if root.name != "svg" {
            return Err(Error::MalformedMarkup {
                message: format!("root element is <{}>, expected <svg>", root.name),
            });
        }
        let dimensions = resolve_dimensions(&markup)?;
        let clip_id = markup::find_start_tag(&markup, "clipPath")?
            .and_then(|tag| tag.get("id").map(str::to_string));
        Ok(Self {
            markup,
            dimensions,
            clip_id,
        })
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> f64 {
        self.dimensions.width
    }

    pub fn height(&self) -> f64 {
        self.dimensions.height
    }

    /// Identifier scoping the fragment's local definitions (its clip path).
    pub fn clip_id(&self) -> Option<&str> {
        self.clip_id.as_deref()
    }

    pub fn width_at_height(&self, target_height: f64) -> f64 {
        self.dimensions.width_at_height(target_height)
    }
}

impl std::fmt::Display for VectorFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.markup)
    }
}
