pub mod image_cache;
pub mod syntax;
