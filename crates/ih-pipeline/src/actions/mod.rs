//! Built-in actions.

pub mod blur;
pub mod bright;
pub mod circle;
pub mod contrast;
pub mod crop;
pub mod format;
pub mod grey;
pub mod indexcrop;
pub mod info;
pub mod quality;
pub mod resize;
pub mod rotate;
pub mod rounded_corners;
pub mod sharpen;
pub mod watermark;

pub use blur::{BlurAction, BlurOptions};
pub use bright::BrightAction;
pub use circle::{CircleAction, CircleOptions};
pub use contrast::ContrastAction;
pub use crop::{CropAction, CropOptions};
pub use format::FormatAction;
pub use grey::GreyAction;
pub use indexcrop::{IndexCropAction, IndexCropOptions};
pub use info::InfoAction;
pub use quality::{QualityAction, QualityOptions};
pub use resize::{ResizeAction, ResizeMode, ResizeOptions};
pub use rotate::RotateAction;
pub use rounded_corners::{RoundedCornersAction, RoundedCornersOptions};
pub use sharpen::SharpenAction;
pub use watermark::{WatermarkAction, WatermarkOptions};
