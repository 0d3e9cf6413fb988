use super::helpers;
use super::targets::{RenderTargets, OFFSCREEN_FORMAT};
use pulsegrid_core::constants::{VIGNETTE_DARKNESS, VIGNETTE_OFFSET};

/// CPU mirror of `PostParams` in `post.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PostUniforms {
    inv_resolution: [f32; 2],
    vignette_offset: f32,
    vignette_darkness: f32,
}

impl PostUniforms {
    pub(crate) fn for_size(width: u32, height: u32) -> Self {
        Self {
            inv_resolution: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            vignette_offset: VIGNETTE_OFFSET,
            vignette_darkness: VIGNETTE_DARKNESS,
        }
    }
}

/// Vignette into an offscreen target, then FXAA onto the swapchain.
pub(crate) struct PostChain {
    bgl: wgpu::BindGroupLayout, // tex+sampler+uniform
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    vignette_pipeline: wgpu::RenderPipeline,
    fxaa_pipeline: wgpu::RenderPipeline,
    bg_scene: wgpu::BindGroup,
    bg_vignette: wgpu::BindGroup,
}

impl PostChain {
    pub(crate) fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        swap_format: wgpu::TextureFormat,
        targets: &RenderTargets,
    ) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                helpers::uniform_layout_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("post_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let uniform_buffer = helpers::uniform_buffer::<PostUniforms>(device, "post_uniforms");
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let vignette_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "vignette_pipeline",
            &layout,
            shader,
            "fs_vignette",
            OFFSCREEN_FORMAT,
            None,
        );
        let fxaa_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "fxaa_pipeline",
            &layout,
            shader,
            "fs_fxaa",
            swap_format,
            Some(wgpu::BlendState::REPLACE),
        );
        let bg_scene = bind_source(device, &bgl, &sampler, &uniform_buffer, &targets.scene_view);
        let bg_vignette =
            bind_source(device, &bgl, &sampler, &uniform_buffer, &targets.vignette_view);
        Self {
            bgl,
            sampler,
            uniform_buffer,
            vignette_pipeline,
            fxaa_pipeline,
            bg_scene,
            bg_vignette,
        }
    }

    /// Bind groups point at texture views; rebuild them after the targets change.
    pub(crate) fn rebind(&mut self, device: &wgpu::Device, targets: &RenderTargets) {
        self.bg_scene = bind_source(
            device,
            &self.bgl,
            &self.sampler,
            &self.uniform_buffer,
            &targets.scene_view,
        );
        self.bg_vignette = bind_source(
            device,
            &self.bgl,
            &self.sampler,
            &self.uniform_buffer,
            &targets.vignette_view,
        );
    }

    pub(crate) fn write_uniforms(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        let u = PostUniforms::for_size(width, height);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
    }

    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargets,
        output: &wgpu::TextureView,
    ) {
        blit(
            encoder,
            "vignette_pass",
            &targets.vignette_view,
            &self.vignette_pipeline,
            &self.bg_scene,
        );
        blit(encoder, "fxaa_pass", output, &self.fxaa_pipeline, &self.bg_vignette);
    }
}

fn bind_source(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    uniforms: &wgpu::Buffer,
    view: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("post_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniforms.as_entire_binding(),
            },
        ],
    })
}

fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bg: &wgpu::BindGroup,
) {
    let mut r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(helpers::clear_color()),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bg, &[]);
    r.draw(0..3, 0..1);
}
