mod helper;

pub use helper::{ApiErrorBody, ApiErrorObject, HelperError};
