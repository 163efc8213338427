pub mod response;
pub mod upload;

pub use response::{ComparisonResult, ResponseBody};
pub use upload::{UploadFile, UploadPair};
