//! Request/response flows. Each public operation is a recovery boundary:
//! failures are handed to the reporter and never returned to the caller.

mod payment;
mod upload;

pub use payment::PaymentFlow;
pub use upload::UploadFlow;
