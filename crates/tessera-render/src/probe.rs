use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use tessera_core::{Error, Result, SourceKind, ViewBox};

/// Decodes intrinsic sizes the markup itself cannot provide.
pub trait SizeProbe: Send + Sync {
    /// Pixel width and height of an encoded raster image.
    fn raster_size(&self, kind: SourceKind, bytes: &[u8]) -> Result<(u32, u32)>;

    /// Best-effort bounds for vector markup that declares neither `width`/`height` nor a
    /// `viewBox`. The origin matters: content drawn away from `0,0` must stay inside the
    /// returned box.
    fn estimate_vector_size(&self, _markup: &str) -> Option<ViewBox> {
        None
    }
}

/// Reads image headers with the `image` crate; vector estimation is unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSizeProbe;

impl SizeProbe for ImageSizeProbe {
    fn raster_size(&self, kind: SourceKind, bytes: &[u8]) -> Result<(u32, u32)> {
        let declared = match kind {
            SourceKind::Jpeg => ImageFormat::Jpeg,
            SourceKind::Png => ImageFormat::Png,
            SourceKind::Svg => {
                return Err(Error::UnsupportedSourceType {
                    kind: "svg is not a raster format".to_string(),
                });
            }
        };

        // Trust the magic bytes over the declared extension; fall back to the declared
        // format when the header is not recognized.
        let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        if reader.format().is_none() {
            reader.set_format(declared);
        }
        reader.into_dimensions().map_err(|e| Error::RasterDecode {
            message: e.to_string(),
        })
    }
}
