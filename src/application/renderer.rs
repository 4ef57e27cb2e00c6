// Renderer adapter trait - the drawing backend as seen by the controller

/// Receives point batches and range updates. The controller never reads back
/// from the renderer; adapters only forward or record what they are given.
pub trait RendererAdapter: Send {
    /// Per-channel handle returned by [`RendererAdapter::create_channel`].
    type Handle: Clone + Send + std::fmt::Debug;

    fn create_channel(&mut self, name: &str, color: &str) -> Self::Handle;

    /// `xs` and `ys` always have the same length.
    fn append_points(&mut self, handle: &Self::Handle, xs: &[f64], ys: &[f64]);

    fn set_visible(&mut self, handle: &Self::Handle, visible: bool);

    fn set_visible_range_x(&mut self, min: f64, max: f64);

    fn set_visible_range_y(&mut self, min: f64, max: f64);

    fn clear_channel(&mut self, handle: &Self::Handle);

    fn dispose(&mut self);
}
