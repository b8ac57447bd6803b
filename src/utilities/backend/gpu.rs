//! Data-parallel backend on a wgpu compute device.
//!
//! One work-item per point. Centroids and data are uploaded every iteration
//! and the host blocks on the read-back of the table, so `assign` returns
//! with the whole table visible.

use bytemuck::{Pod, Zeroable};
use tracing::{debug, error, info};

use crate::utilities::backend::{Backend, BackendKind};
use crate::utilities::error::{KmeansError, Result};
use crate::utilities::structs::Point;

pub const KERNEL_SOURCE: &str = include_str!("../../../shaders/assign.wgsl");
pub const KERNEL_ENTRY: &str = "assign";
const WORKGROUP_SIZE: u32 = 256;
const MAX_GROUPS_PER_DIM: u32 = 65_535;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Params {
    class_n: u32,
    data_n: u32,
    _pad: [u32; 2],
}

struct Buffers {
    class_n: usize,
    data_n: usize,
    params: wgpu::Buffer,
    centroids: wgpu::Buffer,
    data: wgpu::Buffer,
    table: wgpu::Buffer,
    staging: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    buffers: Option<Buffers>,
}

impl GpuBackend {
    pub fn new() -> Result<Self> {
        Self::with_source(KERNEL_SOURCE)
    }

    /// Builds the backend around a caller-supplied kernel. The source must
    /// expose the bindings and entry point of `shaders/assign.wgsl`.
    pub fn with_source(source: &str) -> Result<Self> {
        pollster::block_on(Self::init(source))
    }

    async fn init(source: &str) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| KmeansError::Device("no compatible adapter found".into()))?;
        let adapter_info = adapter.get_info();
        info!(adapter = %adapter_info.name, backend = ?adapter_info.backend, "gpu adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("lloyd"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| KmeansError::Device(e.to_string()))?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("assign.wgsl"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let compilation = module.get_compilation_info().await;
        if let Some(err) = device.pop_error_scope().await {
            let mut log = compilation_log(&compilation);
            if log.is_empty() {
                log = err.to_string();
            }
            let options = format!("entry={KERNEL_ENTRY} workgroup_size={WORKGROUP_SIZE}");
            error!(%log, %options, "kernel compile error");
            return Err(KmeansError::KernelBuild {
                log,
                status: "build failed".into(),
                options,
            });
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("assign"),
            layout: None,
            module: &module,
            entry_point: KERNEL_ENTRY,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });
        if let Some(err) = device.pop_error_scope().await {
            let log = err.to_string();
            error!(%log, "pipeline creation failed");
            return Err(KmeansError::KernelBuild {
                log,
                status: "pipeline failed".into(),
                options: format!("entry={KERNEL_ENTRY}"),
            });
        }

        Ok(GpuBackend {
            device,
            queue,
            pipeline,
            buffers: None,
        })
    }

    fn ensure_buffers(&mut self, class_n: usize, data_n: usize) {
        let stale = match &self.buffers {
            Some(b) => b.class_n != class_n || b.data_n != data_n,
            None => true,
        };
        if stale {
            self.buffers = Some(self.create_buffers(class_n, data_n));
        }
    }

    fn create_buffers(&self, class_n: usize, data_n: usize) -> Buffers {
        let point = std::mem::size_of::<Point>() as u64;
        let make = |label: &str, size: u64, usage: wgpu::BufferUsages| {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            })
        };
        let params = make(
            "params",
            std::mem::size_of::<Params>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let centroids = make(
            "centroids",
            class_n as u64 * point,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        );
        let data = make(
            "data",
            data_n as u64 * point,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        );
        let table_size = data_n as u64 * 4;
        let table = make(
            "table",
            table_size,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );
        let staging = make(
            "staging",
            table_size,
            wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        );
        let layout = self.pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("assign"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: centroids.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: data.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: table.as_entire_binding(),
                },
            ],
        });
        debug!(class_n, data_n, "gpu buffers allocated");
        Buffers {
            class_n,
            data_n,
            params,
            centroids,
            data,
            table,
            staging,
            bind_group,
        }
    }
}

/// Workgroup grid covering `n` items, folded into y once x runs out.
fn dispatch_dims(n: usize) -> (u32, u32) {
    let groups = (n as u64).div_ceil(WORKGROUP_SIZE as u64).max(1);
    let x = groups.min(MAX_GROUPS_PER_DIM as u64);
    let y = groups.div_ceil(x);
    (x as u32, y as u32)
}

fn compilation_log(info: &wgpu::CompilationInfo) -> String {
    info.messages
        .iter()
        .map(|m| match &m.location {
            Some(loc) => format!(
                "{:?} {}:{}: {}",
                m.message_type, loc.line_number, loc.line_position, m.message
            ),
            None => format!("{:?}: {}", m.message_type, m.message),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Backend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn assign(&mut self, data: &[Point], centroids: &[Point], table: &mut [u32]) -> Result<()> {
        let data_n = data.len();
        let class_n = centroids.len();
        let u32_max = u32::MAX as usize;
        if data_n > u32_max || class_n > u32_max {
            return Err(KmeansError::invalid("gpu backend indexes points with u32"));
        }
        let (gx, gy) = dispatch_dims(data_n);

        let params = Params {
            class_n: class_n as u32,
            data_n: data_n as u32,
            _pad: [0; 2],
        };
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.ensure_buffers(class_n, data_n);
        let b = self
            .buffers
            .as_ref()
            .ok_or_else(|| KmeansError::Device("buffer allocation failed".into()))?;
        self.queue.write_buffer(&b.params, 0, bytemuck::bytes_of(&params));
        self.queue
            .write_buffer(&b.centroids, 0, bytemuck::cast_slice(centroids));
        self.queue.write_buffer(&b.data, 0, bytemuck::cast_slice(data));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("assign"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("assign"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &b.bind_group, &[]);
            pass.dispatch_workgroups(gx, gy, 1);
        }
        encoder.copy_buffer_to_buffer(&b.table, 0, &b.staging, 0, data_n as u64 * 4);
        self.queue.submit(Some(encoder.finish()));

        let slice = b.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(KmeansError::Device(err.to_string()));
        }
        rx.recv()
            .map_err(|_| KmeansError::Device("map callback dropped".into()))?
            .map_err(|e| KmeansError::Device(e.to_string()))?;
        {
            let view = slice.get_mapped_range();
            table.copy_from_slice(bytemuck::cast_slice(&view));
        }
        b.staging.unmap();
        Ok(())
    }
}
