
use std::{marker::PhantomData, fmt::Debug};

use wgpu::util::DeviceExt;

use crate::debug;

use super::Context;

#[derive(Debug)]
pub struct Buffer<I: Debug + Copy + Clone + bytemuck::Pod + bytemuck::Zeroable> {
    /// Label of buffer on GPU.
    pub label: Option<&'static str>,
    /// Buffer on GPU.
    pub buffer: wgpu::Buffer,
    /// The number of items in the buffer.
    pub size: usize,
    /// Capacity of the buffer (how many items it can hold).
    pub capacity: usize,
    usage: wgpu::BufferUsages,
    _phantom: PhantomData<I>,
}

// Statics (Helpers, Constructors)
impl<I: Debug + Copy + Clone + bytemuck::Pod + bytemuck::Zeroable> Buffer<I> {
    /// Create a new buffer on the GPU.
    #[profiler::function]
    pub fn new(gpu: &Context, label: Option<&'static str>, data: &[I], usage: wgpu::BufferUsages) -> Buffer<I> {
        let size = data.len();
        let buffer = gpu.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor { label, usage, contents: bytemuck::cast_slice(data) }
        );

        Buffer { label, buffer, size, capacity: size, usage, _phantom: PhantomData }
    }

    /// Uniform buffer holding a single item which is rewritten every frame.
    pub fn new_uniform(gpu: &Context, label: Option<&'static str>, item: I) -> Buffer<I> {
        Self::new(gpu, label, &[item], wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST)
    }
}

// Instance methods
impl<I: Debug + Copy + Clone + bytemuck::Pod + bytemuck::Zeroable> Buffer<I> {

    /// Update the buffer on the GPU using wgpu queue with the given data.
    /// - If the buffer is not large enough, it will be reallocated with the new size.
    /// - Returns true if the buffer was resized and thus the old bindings is invalid.
    #[profiler::function]
    pub fn queue_update(&mut self, gpu: &Context, new_data: &[I]) -> bool {
        self.size = new_data.len();
        if new_data.len() > self.capacity {
            profiler::scope!("Updating Buffer with reallocation");
            debug!("Reallocating buffer {:?}: {} -> {}", self.label, self.capacity, new_data.len());
            self.buffer = gpu.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: self.label,
                    usage: self.usage,
                    contents: bytemuck::cast_slice(new_data),
                }
            );
            self.capacity = new_data.len();
            return true;
        }
        profiler::scope!("Updating Buffer without reallocation");
        gpu.queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(new_data));
        false
    }
}
