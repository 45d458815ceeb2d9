//! GPU compute session (wgpu).
//!
//! The grid lives in two storage buffers of `u32` cells (WGSL has no byte
//! arrays). `conway.wgsl` runs one invocation per cell in 8×8 workgroups,
//! reading `input` and writing `output`. Results come back through a
//! `MAP_READ` staging buffer.
//!
//! Every queue operation runs inside a validation error scope, so device
//! errors surface as [`ComputeError`]s instead of wgpu's default panic.

use std::borrow::Cow;
use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{check_len, ComputeSession};
use crate::error::{ComputeError, SetupError};

const SHADER: &str = include_str!("conway.wgsl");
const ENTRY_POINT: &str = "next_generation";
const WORKGROUP_SIZE: usize = 8;
const CELL_BYTES: u64 = std::mem::size_of::<u32>() as u64;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Params {
    width: u32,
    height: u32,
    _pad: [u32; 2],
}

/// wgpu implementation of [`ComputeSession`].
#[derive(Debug)]
pub struct GpuSession {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    input: wgpu::Buffer,
    output: wgpu::Buffer,
    staging: wgpu::Buffer,
    adapter: wgpu::AdapterInfo,
    width: usize,
    height: usize,
    /// Reused upload buffer (u8 cells widened to u32).
    upload: Vec<u32>,
}

impl GpuSession {
    /// Acquire an adapter and device, build the kernel and allocate buffers.
    pub fn open(width: usize, height: usize) -> Result<Self, SetupError> {
        pollster::block_on(Self::open_async(width, height))
    }

    async fn open_async(width: usize, height: usize) -> Result<Self, SetupError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SetupError::NoAdapter)?;
        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("spark-life"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .map_err(|err| SetupError::Device(err.to_string()))?;

        let cells = width * height;
        let bytes = (cells as u64 * CELL_BYTES).max(CELL_BYTES);
        let limit = u64::from(device.limits().max_storage_buffer_binding_size);
        if bytes > limit {
            return Err(SetupError::GridTooLarge { cells, bytes, limit });
        }
        check_workgroups(width, height, device.limits().max_compute_workgroups_per_dimension)?;

        // Kernel build. Compilation diagnostics arrive as validation errors.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("conway"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER)),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("conway"),
            layout: None,
            module: &module,
            entry_point: ENTRY_POINT,
            compilation_options: Default::default(),
        });
        if let Some(err) = device.pop_error_scope().await {
            return Err(SetupError::ShaderBuild(err.to_string()));
        }

        let input = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cells_in"),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cells_out"),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging"),
            size: bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let params = Params {
            width: dim_u32(width)?,
            height: dim_u32(height)?,
            _pad: [0; 2],
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("conway"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group,
            input,
            output,
            staging,
            adapter: info,
            width,
            height,
            upload: Vec::with_capacity(cells),
        })
    }

    fn byte_len(&self) -> u64 {
        (self.width * self.height) as u64 * CELL_BYTES
    }

    /// Submit `encoder` inside a validation scope and wait for the device.
    fn submit_and_wait(
        &self,
        encoder: Option<wgpu::CommandEncoder>,
        fail: fn(String) -> ComputeError,
    ) -> Result<(), ComputeError> {
        let index = self.queue.submit(encoder.map(|e| e.finish()));
        let scoped = pollster::block_on(self.device.pop_error_scope());
        let _ = self.device.poll(wgpu::Maintain::WaitForSubmissionIndex(index));
        match scoped {
            Some(err) => Err(fail(err.to_string())),
            None => Ok(()),
        }
    }
}

fn dim_u32(value: usize) -> Result<u32, SetupError> {
    u32::try_from(value).map_err(|_| SetupError::GridTooLarge {
        cells: value,
        bytes: value as u64 * CELL_BYTES,
        limit: u64::from(u32::MAX),
    })
}

fn workgroups(cells: usize) -> u32 {
    cells.div_ceil(WORKGROUP_SIZE) as u32
}

/// Reject grids whose dispatch would exceed the per-axis workgroup limit.
fn check_workgroups(width: usize, height: usize, limit: u32) -> Result<(), SetupError> {
    let widest = width.max(height).div_ceil(WORKGROUP_SIZE);
    if widest > limit as usize {
        return Err(SetupError::TooManyWorkgroups {
            width,
            height,
            workgroups: widest,
            limit,
        });
    }
    Ok(())
}

impl ComputeSession for GpuSession {
    fn describe(&self) -> String {
        format!("{} ({:?})", self.adapter.name, self.adapter.backend)
    }

    fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn write_input(&mut self, cells: &[u8]) -> Result<(), ComputeError> {
        check_len(self.shape(), cells.len())?;
        self.upload.clear();
        self.upload.extend(cells.iter().map(|&c| u32::from(c != 0)));

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.queue
            .write_buffer(&self.input, 0, bytemuck::cast_slice(&self.upload));
        self.submit_and_wait(None, ComputeError::Upload)
    }

    fn dispatch(&mut self) -> Result<(), ComputeError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("conway step"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("conway step"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(workgroups(self.width), workgroups(self.height), 1);
        }
        self.submit_and_wait(Some(encoder), ComputeError::Dispatch)
    }

    fn read_output(&mut self, out: &mut [u8]) -> Result<(), ComputeError> {
        check_len(self.shape(), out.len())?;
        let bytes = self.byte_len();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("conway readback"),
            });
        encoder.copy_buffer_to_buffer(&self.output, 0, &self.staging, 0, bytes);
        self.submit_and_wait(Some(encoder), ComputeError::Readback)?;

        let slice = self.staging.slice(..bytes);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            tx.send(res).ok();
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| ComputeError::Readback("map_async callback dropped".into()))?
            .map_err(|err| ComputeError::Readback(err.to_string()))?;

        let copied = {
            let mapped = slice.get_mapped_range();
            match bytemuck::try_cast_slice::<u8, u32>(&mapped[..]) {
                Ok(words) => {
                    for (cell, &word) in out.iter_mut().zip(words) {
                        *cell = u8::from(word != 0);
                    }
                    Ok(())
                }
                Err(err) => Err(ComputeError::Readback(err.to_string())),
            }
        };
        self.staging.unmap();
        copied
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::CpuSession;
    use crate::grid::Grid;

    fn step(session: &mut dyn ComputeSession, grid: &Grid) -> Grid {
        session.write_input(grid.cells()).unwrap();
        session.dispatch().unwrap();
        let mut next = Grid::new(grid.width(), grid.height());
        session.read_output(next.cells_mut()).unwrap();
        next
    }

    #[test]
    fn test_workgroup_rounding() {
        assert_eq!(workgroups(1), 1);
        assert_eq!(workgroups(8), 1);
        assert_eq!(workgroups(9), 2);
    }

    #[test]
    fn test_workgroup_limit() {
        assert!(check_workgroups(8 * 65535, 1, 65535).is_ok());
        assert!(matches!(
            check_workgroups(8 * 65535 + 1, 1, 65535),
            Err(SetupError::TooManyWorkgroups { workgroups: 65536, limit: 65535, .. })
        ));
        assert!(check_workgroups(3, 8 * 16 + 1, 16).is_err());
    }

    #[test]
    fn test_gpu_matches_cpu() {
        let Ok(mut gpu) = GpuSession::open(13, 11) else {
            eprintln!("skipping GPU test: no adapter available");
            return;
        };
        let mut cpu = CpuSession::new(13, 11);

        // Glider plus a blinker touching the right edge.
        let mut grid = Grid::with_live(
            13,
            11,
            &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2), (12, 4), (12, 5), (12, 6)],
        );
        for generation in 1..=20 {
            let on_gpu = step(&mut gpu, &grid);
            let on_cpu = step(&mut cpu, &grid);
            assert_eq!(on_gpu, on_cpu, "generation {generation}");
            grid = on_gpu;
        }
    }
}
