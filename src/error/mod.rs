mod app_error;
mod delivery_error;

pub use app_error::{AppError, AppResult};
pub use delivery_error::DeliveryError;
