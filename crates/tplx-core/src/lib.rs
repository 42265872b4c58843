//! Spatial template-application engine: anchor matching, per-page affine
//! transform fitting, box reprojection, row-aware text assembly, and field
//! evaluation over a PDF/OCR text-block stream.

pub mod anchor;
pub mod apply;
pub mod assemble;
pub mod block;
pub mod error;
pub mod field;
pub mod geometry;
pub mod normalize;
pub mod template;

pub use apply::{apply, ApplyResult, TemplateEngine, TemplateRepository};
pub use block::{Block, BlockKind, BlockSource};
pub use error::{Error, ErrorEnvelope, Result};
pub use geometry::{Rect, Transform};
pub use template::{Anchor, AnchorKind, Box, Cast, Field, Meta, PageMeta, Template};
