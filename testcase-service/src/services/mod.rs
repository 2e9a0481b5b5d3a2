pub mod excel;
pub mod images;
pub mod prompt;
pub mod providers;

pub use excel::ExcelClient;
pub use images::{encode_upload, EncodedImage};
