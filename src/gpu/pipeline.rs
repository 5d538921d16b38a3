/// wgpu render pipeline for camera image undistortion
///
/// This module manages all the wgpu boilerplate:
/// - Shader compilation behind a validation error scope
/// - Texture allocation and per-capture uploads
/// - Bind group wiring for the two sampled textures
/// - Draw commands for the full-viewport rectangle

// Use wgpu from iced to avoid dependency conflicts
use iced::futures::executor::block_on;
use iced::Rectangle;
use iced_wgpu::wgpu;
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::shaders;
use crate::capture::Capture;

/// Vertex of the full-viewport rectangle
/// Must match `VertexInput` in the WGSL source
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
    tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4, 2 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Triangle strip covering clip space, texture origin at the top-left
const FULL_VIEWPORT: [Vertex; 4] = [
    Vertex { position: [-1.0, 1.0], color: WHITE, tex_coords: [0.0, 0.0] },
    Vertex { position: [1.0, 1.0], color: WHITE, tex_coords: [1.0, 0.0] },
    Vertex { position: [-1.0, -1.0], color: WHITE, tex_coords: [0.0, 1.0] },
    Vertex { position: [1.0, -1.0], color: WHITE, tex_coords: [1.0, 1.0] },
];

/// Failures while building the undistortion pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("undistortion shader failed to compile: {0}")]
    ShaderCompile(String),

    #[error("render pipeline creation failed: {0}")]
    PipelineCreation(String),
}

/// Outcome of the one-time pipeline build
///
/// `Degraded` is terminal: the undistorted image is never drawn, while the
/// rest of the UI (hand overlay) keeps rendering.
#[derive(Debug)]
pub enum PipelineState {
    Ready(UndistortPipeline),
    Degraded(PipelineError),
}

impl PipelineState {
    pub fn build(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        Self::from_result(UndistortPipeline::new(device, target_format))
    }

    pub fn from_result(result: Result<UndistortPipeline, PipelineError>) -> Self {
        match result {
            Ok(pipeline) => {
                log::info!("✅ Undistortion pipeline ready");
                PipelineState::Ready(pipeline)
            }
            Err(err) => {
                log::error!("{}", err);
                log::error!("Continuing without the undistorted camera view");
                PipelineState::Degraded(err)
            }
        }
    }

    pub fn ready(&self) -> Option<&UndistortPipeline> {
        match self {
            PipelineState::Ready(pipeline) => Some(pipeline),
            PipelineState::Degraded(_) => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut UndistortPipeline> {
        match self {
            PipelineState::Ready(pipeline) => Some(pipeline),
            PipelineState::Degraded(_) => None,
        }
    }
}

/// Whether a capture still has to be written to the GPU
pub fn needs_upload(uploaded: Option<u64>, sequence: u64) -> bool {
    uploaded != Some(sequence)
}

/// Whether both capture textures fit the device's 2D texture limit
pub fn fits_texture_limit(
    raw_size: (u32, u32),
    distortion_size: (u32, u32),
    max_dimension: u32,
) -> bool {
    [raw_size, distortion_size]
        .iter()
        .all(|&(width, height)| width <= max_dimension && height <= max_dimension)
}

/// GPU textures sized for one capture resolution
struct CaptureTextures {
    raw: wgpu::Texture,
    distortion: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    raw_size: (u32, u32),
    distortion_size: (u32, u32),
}

/// Undistortion render pipeline and its textures
pub struct UndistortPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    vertex_buffer: wgpu::Buffer,
    raw_sampler: wgpu::Sampler,
    distortion_sampler: wgpu::Sampler,
    raw_format: wgpu::TextureFormat,
    textures: Option<CaptureTextures>,
    uploaded: Option<u64>,
    oversize_logged: bool,
}

// Manual Debug implementation (skip the wgpu handles)
impl std::fmt::Debug for UndistortPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndistortPipeline")
            .field("raw_format", &self.raw_format)
            .field("uploaded", &self.uploaded)
            .finish_non_exhaustive()
    }
}

impl UndistortPipeline {
    /// Compile the shader and create the render pipeline for `target_format`
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, PipelineError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Undistort Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::UNDISTORT_SHADER.into()),
        });
        if let Some(err) = block_on(device.pop_error_scope()) {
            return Err(PipelineError::ShaderCompile(err.to_string()));
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Undistort Bind Group Layout"),
            entries: &[
                // Lookup texture (RGBA32F is not filterable without an extra feature)
                wgpu::BindGroupLayoutEntry {
                    binding: shaders::DISTORTION_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: shaders::DISTORTION_SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
                // Raw grayscale image
                wgpu::BindGroupLayoutEntry {
                    binding: shaders::RAW_DATA_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: shaders::RAW_SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Undistort Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Undistort Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: shaders::VERTEX_ENTRY,
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: shaders::FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });
        if let Some(err) = block_on(device.pop_error_scope()) {
            return Err(PipelineError::PipelineCreation(err.to_string()));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Full Viewport Vertices"),
            contents: bytemuck::cast_slice(&FULL_VIEWPORT),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let raw_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Raw Data Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let distortion_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Distortion Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Keep gray levels unchanged on sRGB surfaces
        let raw_format = if target_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        Ok(Self {
            pipeline,
            bind_group_layout,
            vertex_buffer,
            raw_sampler,
            distortion_sampler,
            raw_format,
            textures: None,
            uploaded: None,
            oversize_logged: false,
        })
    }

    /// Whether textures have been written at least once
    pub fn has_image(&self) -> bool {
        self.textures.is_some()
    }

    /// Write a capture into the textures, reallocating only on size change
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, capture: &Capture) {
        if !needs_upload(self.uploaded, capture.sequence) {
            return;
        }

        let raw_size = (capture.raw.width, capture.raw.height);
        let distortion_size = (capture.distortion.width, capture.distortion.height);

        // Oversized textures would fail outside any error scope; show nothing instead
        let max_dimension = device.limits().max_texture_dimension_2d;
        if !fits_texture_limit(raw_size, distortion_size, max_dimension) {
            if !self.oversize_logged {
                log::warn!(
                    "⚠️  Capture {} exceeds the {}px texture limit (raw {}x{}, distortion {}x{})",
                    capture.sequence,
                    max_dimension,
                    raw_size.0,
                    raw_size.1,
                    distortion_size.0,
                    distortion_size.1
                );
                self.oversize_logged = true;
            }
            self.textures = None;
            self.uploaded = Some(capture.sequence);
            return;
        }

        let reallocate = match &self.textures {
            Some(textures) => {
                textures.raw_size != raw_size || textures.distortion_size != distortion_size
            }
            None => true,
        };
        if reallocate {
            log::info!(
                "Allocating textures: raw {}x{}, distortion {}x{}",
                raw_size.0,
                raw_size.1,
                distortion_size.0,
                distortion_size.1
            );
            self.textures = Some(self.create_textures(device, raw_size, distortion_size));
        }

        let Some(textures) = &self.textures else {
            return;
        };

        write_texture(
            queue,
            &textures.raw,
            &capture.raw.rgba,
            raw_size,
            4, // RGBA8
        );
        write_texture(
            queue,
            &textures.distortion,
            bytemuck::cast_slice(&capture.distortion.texels),
            distortion_size,
            16, // RGBA32F
        );

        self.uploaded = Some(capture.sequence);
    }

    fn create_textures(
        &self,
        device: &wgpu::Device,
        raw_size: (u32, u32),
        distortion_size: (u32, u32),
    ) -> CaptureTextures {
        let raw = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Raw Data Texture"),
            size: extent(raw_size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.raw_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // Full 32-bit float channels so lookups are not quantized
        let distortion = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Distortion Texture (RGBA32F)"),
            size: extent(distortion_size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let raw_view = raw.create_view(&wgpu::TextureViewDescriptor::default());
        let distortion_view = distortion.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Undistort Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: shaders::DISTORTION_BINDING,
                    resource: wgpu::BindingResource::TextureView(&distortion_view),
                },
                wgpu::BindGroupEntry {
                    binding: shaders::DISTORTION_SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.distortion_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: shaders::RAW_DATA_BINDING,
                    resource: wgpu::BindingResource::TextureView(&raw_view),
                },
                wgpu::BindGroupEntry {
                    binding: shaders::RAW_SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.raw_sampler),
                },
            ],
        });

        CaptureTextures {
            raw,
            distortion,
            bind_group,
            raw_size,
            distortion_size,
        }
    }

    /// Draw the undistorted image into the clip bounds of `target`
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        let Some(textures) = &self.textures else {
            return;
        };
        if clip_bounds.width == 0 || clip_bounds.height == 0 {
            return;
        }

        // Load, not clear: iced has already drawn the background
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Undistort Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_scissor_rect(
            clip_bounds.x,
            clip_bounds.y,
            clip_bounds.width,
            clip_bounds.height,
        );
        render_pass.set_viewport(
            clip_bounds.x as f32,
            clip_bounds.y as f32,
            clip_bounds.width as f32,
            clip_bounds.height as f32,
            0.0,
            1.0,
        );

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &textures.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..FULL_VIEWPORT.len() as u32, 0..1);
    }
}

fn extent((width, height): (u32, u32)) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn write_texture(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    bytes: &[u8],
    size: (u32, u32),
    bytes_per_pixel: u32,
) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytes,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_pixel * size.0),
            rows_per_image: Some(size.1),
        },
        extent(size),
    );
}
