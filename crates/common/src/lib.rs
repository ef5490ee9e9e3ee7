pub mod chains;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use chains::ChainDescriptor;
pub use error::{LensError, LensResult};
