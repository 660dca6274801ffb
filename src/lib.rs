pub mod constants;
pub mod decimator;
pub mod error;
pub mod firdes;
pub mod wav;

pub use decimator::Decimator;
pub use error::{DecimError, Result};
pub use firdes::{DesignParam, FilterSpec, design};
pub use wav::{load_wav, save_wav};
