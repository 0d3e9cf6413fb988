use pulsegrid_core::{GridUniforms, SetupError, TileInstance, VisualizerUniforms};
use web_sys as web;

mod grid;
mod helpers;
mod post;
mod targets;
mod visualizer;

use grid::GridPass;
use post::PostChain;
use targets::RenderTargets;
use visualizer::VisualizerPass;

// ===================== WebGPU surface/device =====================

pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> Result<Self, SetupError> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| SetupError::Surface(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SetupError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| SetupError::Device(format!("{:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        // Palette colours are authored as sRGB bytes; write them through unchanged
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| SetupError::Surface("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {}x{} {:?}", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure when the backing store changed. Returns whether it did.
    pub fn resize_if_needed(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        if width == self.config.width && height == self.config.height {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        true
    }

    /// Lost and outdated surfaces are reconfigured; the frame is skipped.
    fn acquire(&mut self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }
}

/// Compile WGSL under a validation scope so a bad shader becomes a setup
/// error instead of an uncaptured device error.
pub async fn create_shader(
    device: &wgpu::Device,
    label: &'static str,
    source: &'static str,
) -> Result<wgpu::ShaderModule, SetupError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match device.pop_error_scope().await {
        Some(err) => {
            log::error!("[gpu] shader `{}` rejected: {}", label, err);
            Err(SetupError::Shader {
                label,
                message: err.to_string(),
            })
        }
        None => Ok(module),
    }
}

// ===================== Visualizer =====================

pub struct VisualizerRenderer {
    gpu: GpuContext,
    pass: VisualizerPass,
}

impl VisualizerRenderer {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> Result<Self, SetupError> {
        let gpu = GpuContext::new(canvas).await?;
        let shader =
            create_shader(&gpu.device, "visualizer_shader", pulsegrid_core::VISUALIZER_WGSL)
                .await?;
        let pass = VisualizerPass::new(&gpu.device, &shader, gpu.format());
        Ok(Self { gpu, pass })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        self.gpu.resize_if_needed(width, height);
    }

    pub fn render(&mut self, uniforms: &VisualizerUniforms) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.acquire()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gpu.encoder("visualizer_encoder");
        self.pass
            .encode(&self.gpu.queue, &mut encoder, &view, uniforms);
        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

// ===================== Grid =====================

pub struct GridRenderer {
    gpu: GpuContext,
    scene: GridPass,
    targets: RenderTargets,
    post: PostChain,
}

impl GridRenderer {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> Result<Self, SetupError> {
        let gpu = GpuContext::new(canvas).await?;
        let grid_shader =
            create_shader(&gpu.device, "grid_shader", pulsegrid_core::GRID_WGSL).await?;
        let post_shader =
            create_shader(&gpu.device, "post_shader", pulsegrid_core::POST_WGSL).await?;
        let (width, height) = gpu.size();
        let scene = GridPass::new(&gpu.device, &grid_shader);
        let targets = RenderTargets::new(&gpu.device, width, height);
        let post = PostChain::new(&gpu.device, &post_shader, gpu.format(), &targets);
        post.write_uniforms(&gpu.queue, width, height);
        Ok(Self {
            gpu,
            scene,
            targets,
            post,
        })
    }

    /// Offscreen targets and the FXAA texel size follow the backing store.
    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if self.gpu.resize_if_needed(width, height) {
            self.targets.recreate(&self.gpu.device, width, height);
            self.post.rebind(&self.gpu.device, &self.targets);
            self.post.write_uniforms(&self.gpu.queue, width, height);
        }
    }

    pub fn render(
        &mut self,
        uniforms: &GridUniforms,
        tiles: &[TileInstance],
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.acquire()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gpu.encoder("grid_encoder");
        self.scene.encode(
            &self.gpu.queue,
            &mut encoder,
            &self.targets.scene_view,
            uniforms,
            tiles,
        );
        self.post.encode(&mut encoder, &self.targets, &view);
        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
