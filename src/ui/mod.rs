/// Window contents
///
/// - `viewport.rs` - shader widget drawing the undistorted camera image
/// - `overlay.rs` - canvas drawing palm and fingertip markers on top

pub mod overlay;
pub mod viewport;

pub use overlay::HandOverlay;
pub use viewport::UndistortView;
