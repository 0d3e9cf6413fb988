use super::helpers;

pub(crate) const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Offscreen colour targets for the grid post chain.
///
/// - `scene_*` receives the grid lines and tiles.
/// - `vignette_*` holds the vignetted image that FXAA reads.
pub(crate) struct RenderTargets {
    pub(crate) scene_tex: wgpu::Texture,
    pub(crate) scene_view: wgpu::TextureView,
    pub(crate) vignette_tex: wgpu::Texture,
    pub(crate) vignette_view: wgpu::TextureView,
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (scene_tex, scene_view) =
            helpers::create_color_texture(device, "scene_tex", width, height, OFFSCREEN_FORMAT);
        let (vignette_tex, vignette_view) =
            helpers::create_color_texture(device, "vignette_tex", width, height, OFFSCREEN_FORMAT);
        Self {
            scene_tex,
            scene_view,
            vignette_tex,
            vignette_view,
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.scene_tex.destroy();
        self.vignette_tex.destroy();
        *self = Self::new(device, width, height);
    }
}
