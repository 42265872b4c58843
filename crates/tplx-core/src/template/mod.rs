pub mod schema;
pub mod validate;

pub use schema::{Anchor, AnchorKind, Box, Cast, Field, Meta, PageMeta, SearchBox, Template};
pub use validate::validate;
