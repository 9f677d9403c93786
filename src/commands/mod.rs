mod common;
mod create;
mod update;
mod update_images;

pub use common::CommonArgs;
pub use create::{CreateArgs, create};
pub use update::{UpdateArgs, update};
pub use update_images::{UpdateImagesArgs, update_images};
