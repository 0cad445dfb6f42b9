pub mod analysis;
pub mod history;
pub mod media;
