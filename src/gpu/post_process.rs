//! Bloom post-processing chain.
//!
//! Particles render into an offscreen HDR target; this module extracts the
//! fragments above the bloom threshold, blurs them through a progressive
//! half-resolution mip chain, and composites the glow back over the scene
//! with tonemapping and a vignette.

use wgpu::util::DeviceExt;

use crate::bloom::{BloomConfig, BloomParams, BLOOM_SHADER};

/// HDR color format for the offscreen scene and the blur chain. Shell colors
/// exceed 1.0 by design, so an 8-bit target would clip the contract away.
pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Smallest mip dimension the blur chain descends to.
const MIN_MIP_SIZE: u32 = 8;

/// GPU resources for the bloom passes.
pub struct BloomState {
    /// Offscreen HDR render target the particle pass draws into.
    scene_view: wgpu::TextureView,
    /// Half-resolution blur chain, largest first.
    mip_views: Vec<wgpu::TextureView>,
    params_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    input_layout: wgpu::BindGroupLayout,
    glow_layout: wgpu::BindGroupLayout,
    /// Bind group sampling the scene texture.
    scene_input: wgpu::BindGroup,
    /// Bind groups sampling each mip level.
    mip_inputs: Vec<wgpu::BindGroup>,
    /// Bind group exposing the finished glow to the composite pass.
    glow_input: wgpu::BindGroup,
    extract_pipeline: wgpu::RenderPipeline,
    downsample_pipeline: wgpu::RenderPipeline,
    upsample_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
}

impl BloomState {
    pub fn new(
        device: &wgpu::Device,
        cfg: &BloomConfig,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let params = BloomParams::from_config(cfg);
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Params Buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Params Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let input_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Input Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let glow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Glow Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Params Bind Group"),
            layout: &params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER.into()),
        });

        let chain_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Bloom Chain Pipeline Layout"),
                bind_group_layouts: &[&params_layout, &input_layout],
                push_constant_ranges: &[],
            });

        let composite_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Bloom Composite Pipeline Layout"),
                bind_group_layouts: &[&params_layout, &input_layout, &glow_layout],
                push_constant_ranges: &[],
            });

        let fullscreen_pipeline = |label: &str,
                                   layout: &wgpu::PipelineLayout,
                                   entry: &str,
                                   format: wgpu::TextureFormat,
                                   blend: Option<wgpu::BlendState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_fullscreen"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        // Upsampling accumulates into the level above, hence the additive
        // blend; every other pass overwrites its target.
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let extract_pipeline = fullscreen_pipeline(
            "Bloom Extract Pipeline",
            &chain_pipeline_layout,
            "fs_extract",
            HDR_FORMAT,
            None,
        );
        let downsample_pipeline = fullscreen_pipeline(
            "Bloom Downsample Pipeline",
            &chain_pipeline_layout,
            "fs_downsample",
            HDR_FORMAT,
            None,
        );
        let upsample_pipeline = fullscreen_pipeline(
            "Bloom Upsample Pipeline",
            &chain_pipeline_layout,
            "fs_upsample",
            HDR_FORMAT,
            Some(additive),
        );
        let composite_pipeline = fullscreen_pipeline(
            "Bloom Composite Pipeline",
            &composite_pipeline_layout,
            "fs_composite",
            surface_format,
            None,
        );

        let (scene_view, mip_views, scene_input, mip_inputs, glow_input) = create_targets(
            device,
            &input_layout,
            &glow_layout,
            &sampler,
            cfg.levels,
            width,
            height,
        );

        Self {
            scene_view,
            mip_views,
            params_bind_group,
            sampler,
            input_layout,
            glow_layout,
            scene_input,
            mip_inputs,
            glow_input,
            extract_pipeline,
            downsample_pipeline,
            upsample_pipeline,
            composite_pipeline,
        }
    }

    /// View of the offscreen HDR target the particle pass renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene_view
    }

    /// Recreate the offscreen textures after a window resize.
    pub fn resize(&mut self, device: &wgpu::Device, levels: u32, width: u32, height: u32) {
        let (scene_view, mip_views, scene_input, mip_inputs, glow_input) = create_targets(
            device,
            &self.input_layout,
            &self.glow_layout,
            &self.sampler,
            levels,
            width,
            height,
        );
        self.scene_view = scene_view;
        self.mip_views = mip_views;
        self.scene_input = scene_input;
        self.mip_inputs = mip_inputs;
        self.glow_input = glow_input;
    }

    /// Encode the full bloom chain and the final composite to the surface.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        // Extract bright fragments into the top of the chain.
        self.fullscreen_pass(
            encoder,
            "Bloom Extract Pass",
            &self.extract_pipeline,
            &self.mip_views[0],
            &self.scene_input,
            None,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
        );

        // Walk down the chain, halving resolution and widening the blur.
        for i in 1..self.mip_views.len() {
            self.fullscreen_pass(
                encoder,
                "Bloom Downsample Pass",
                &self.downsample_pipeline,
                &self.mip_views[i],
                &self.mip_inputs[i - 1],
                None,
                wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            );
        }

        // Walk back up, accumulating each level into the one above.
        for i in (1..self.mip_views.len()).rev() {
            self.fullscreen_pass(
                encoder,
                "Bloom Upsample Pass",
                &self.upsample_pipeline,
                &self.mip_views[i - 1],
                &self.mip_inputs[i],
                None,
                wgpu::LoadOp::Load,
            );
        }

        // Composite scene + glow onto the swapchain.
        self.fullscreen_pass(
            encoder,
            "Bloom Composite Pass",
            &self.composite_pipeline,
            surface_view,
            &self.scene_input,
            Some(&self.glow_input),
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn fullscreen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        target: &wgpu::TextureView,
        input: &wgpu::BindGroup,
        glow: Option<&wgpu::BindGroup>,
        load: wgpu::LoadOp<wgpu::Color>,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.params_bind_group, &[]);
        pass.set_bind_group(1, input, &[]);
        if let Some(glow) = glow {
            pass.set_bind_group(2, glow, &[]);
        }
        pass.draw(0..3, 0..1);
    }
}

/// Number of usable mip levels for a given surface size.
fn chain_depth(levels: u32, width: u32, height: u32) -> u32 {
    let mut depth = 1;
    let (mut w, mut h) = (width.max(2) / 2, height.max(2) / 2);
    while depth < levels && w / 2 >= MIN_MIP_SIZE && h / 2 >= MIN_MIP_SIZE {
        depth += 1;
        w /= 2;
        h /= 2;
    }
    depth
}

type Targets = (
    wgpu::TextureView,
    Vec<wgpu::TextureView>,
    wgpu::BindGroup,
    Vec<wgpu::BindGroup>,
    wgpu::BindGroup,
);

fn create_targets(
    device: &wgpu::Device,
    input_layout: &wgpu::BindGroupLayout,
    glow_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    levels: u32,
    width: u32,
    height: u32,
) -> Targets {
    let hdr_texture = |label: &str, w: u32, h: u32| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: w.max(1),
                    height: h.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: HDR_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    };

    let scene_view = hdr_texture("Scene HDR Texture", width, height);

    let depth = chain_depth(levels, width, height);
    let mut mip_views = Vec::with_capacity(depth as usize);
    let (mut w, mut h) = (width, height);
    for i in 0..depth {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        mip_views.push(hdr_texture(&format!("Bloom Mip {}", i), w, h));
    }

    let input_bind_group = |label: &str, view: &wgpu::TextureView| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: input_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    };

    let scene_input = input_bind_group("Scene Input Bind Group", &scene_view);
    let mip_inputs: Vec<wgpu::BindGroup> = mip_views
        .iter()
        .map(|view| input_bind_group("Bloom Mip Input Bind Group", view))
        .collect();

    let glow_input = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Glow Bind Group"),
        layout: glow_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&mip_views[0]),
        }],
    });

    (scene_view, mip_views, scene_input, mip_inputs, glow_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_depth_respects_min_size() {
        // 1280x720 halves: 640x360, 320x180, 160x90, 80x45, 40x22, 20x11.
        // The step after 20x11 would drop below 8 px, capping the chain.
        let depth = chain_depth(8, 1280, 720);
        assert!(depth >= 4 && depth <= 8);
        assert_eq!(chain_depth(8, 32, 32), 2);
        assert_eq!(chain_depth(8, 16, 16), 1);
    }

    #[test]
    fn test_chain_depth_at_least_one() {
        assert_eq!(chain_depth(8, 2, 2), 1);
        assert_eq!(chain_depth(1, 4096, 4096), 1);
    }
}
