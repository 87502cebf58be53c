pub mod fs;
pub mod text;

pub use text::truncate_with_ellipsis;
