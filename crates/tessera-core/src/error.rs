pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported file type for conversion to SVG: {kind}")]
    UnsupportedSourceType { kind: String },

    #[error("Malformed markup: {message}")]
    MalformedMarkup { message: String },

    #[error("SVG content does not contain valid width and height attributes or a viewBox")]
    MissingDimensions,

    #[error("Invalid grid dimensions: {items} items do not fit in a {rows}x{cols} grid")]
    GridTooSmall {
        rows: usize,
        cols: usize,
        items: usize,
    },

    #[error(
        "Invalid grid dimensions: exactly {required_rows} rows are needed for {items} items in {cols} columns, got {rows}"
    )]
    GridShapeInvalid {
        rows: usize,
        cols: usize,
        items: usize,
        required_rows: usize,
    },

    #[error("Could not find the badge named \"{name}\"")]
    FragmentNotFound { name: String },

    #[error("At least one badge is required")]
    NoFragments,

    #[error("Failed to decode raster image: {message}")]
    RasterDecode { message: String },

    #[error("Invalid badge name: {message}")]
    InvalidName { message: String },

    #[error("Badge name \"{name}\" already exists in scope \"{scope}\"")]
    NameTaken { scope: String, name: String },

    #[error(
        "Both row ({rows}) and column ({cols}) hints must not exceed the number of badges ({items})"
    )]
    HintExceedsCount {
        rows: usize,
        cols: usize,
        items: usize,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMarkup {
            message: message.into(),
        }
    }
}
