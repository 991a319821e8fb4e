pub mod conditional_paralell;
pub mod config;
pub mod cst;
pub mod error;
pub mod helpers;
pub mod hk;
pub mod imops;
pub mod local_laplacian;
pub mod monochrome;
pub mod params;
pub mod pipeline;
pub mod pixels;
pub mod pyramid;

pub use error::MonochromeError;
pub use local_laplacian::{LocalContrast, LocalContrastParams, LocalLaplacian};
pub use monochrome::process;
pub use params::{MonochromeParams, Operator};
pub use pixels::{LabImage, ProcessRegion, Roi};
