use iced::mouse::Cursor;
use iced::widget::shader::{self, Storage, Viewport};
use iced::Rectangle;
use iced_wgpu::wgpu;
use std::sync::Arc;

use crate::capture::Capture;
use crate::gpu::PipelineState;

/// Shader widget program showing the undistorted camera image
/// Renders straight into iced's surface through the wgpu pipeline.
pub struct UndistortView {
    pub capture: Arc<Capture>,
}

impl<Message> shader::Program<Message> for UndistortView {
    type State = ();
    type Primitive = UndistortPrimitive;

    fn draw(&self, _state: &Self::State, _cursor: Cursor, _bounds: Rectangle) -> Self::Primitive {
        UndistortPrimitive {
            capture: Arc::clone(&self.capture),
        }
    }
}

#[derive(Debug)]
pub struct UndistortPrimitive {
    capture: Arc<Capture>,
}

/// Whether the undistorted pass runs this frame
///
/// False until the pipeline has been built, forever after a failed build,
/// and until the first capture has reached the GPU.
pub fn draws_undistorted(state: Option<&PipelineState>) -> bool {
    state
        .and_then(PipelineState::ready)
        .is_some_and(|pipeline| pipeline.has_image())
}

impl shader::Primitive for UndistortPrimitive {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        storage: &mut Storage,
        _bounds: &Rectangle,
        _viewport: &Viewport,
    ) {
        // Built once; a failed build is never retried
        if !storage.has::<PipelineState>() {
            storage.store(PipelineState::build(device, format));
        }

        if let Some(pipeline) = storage
            .get_mut::<PipelineState>()
            .and_then(PipelineState::ready_mut)
        {
            pipeline.upload(device, queue, &self.capture);
        }
    }

    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        storage: &Storage,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        let state = storage.get::<PipelineState>();
        if !draws_undistorted(state) {
            return;
        }
        if let Some(pipeline) = state.and_then(PipelineState::ready) {
            pipeline.render(encoder, target, clip_bounds);
        }
    }
}
