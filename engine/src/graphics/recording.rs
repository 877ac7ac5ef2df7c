//! Headless graphics backend
//!
//! [`RecordingDevice`] keeps buffer contents in memory and tracks every
//! allocation and release; [`RecordingPass`] records draw commands in
//! order. Used by the inspection tool and by tests that have no GPU.

use super::device::{BufferUsage, DrawTarget, GpuDevice};
use super::mesh::VertexLayout;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{error, trace};

/// Buffer handle issued by [`RecordingDevice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBuffer {
    /// Allocation number, unique per device
    pub id: usize,
    pub label: String,
    pub usage: BufferUsage,
    /// Copy of the uploaded bytes
    pub contents: Vec<u8>,
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: usize,
    /// Release count per allocation
    releases: HashMap<usize, u32>,
}

/// In-memory [`GpuDevice`]
#[derive(Debug, Default)]
pub struct RecordingDevice {
    ledger: Mutex<Ledger>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of buffers ever allocated
    pub fn allocated_buffers(&self) -> usize {
        self.with_ledger(|ledger| ledger.next_id)
    }

    /// Number of distinct buffers released at least once
    pub fn released_buffers(&self) -> usize {
        self.with_ledger(|ledger| ledger.releases.len())
    }

    /// Buffers allocated and not yet released
    pub fn live_buffers(&self) -> usize {
        self.with_ledger(|ledger| ledger.next_id - ledger.releases.len())
    }

    /// Ids of buffers released more than once, sorted
    pub fn double_releases(&self) -> Vec<usize> {
        self.with_ledger(|ledger| {
            let mut ids: Vec<usize> = ledger
                .releases
                .iter()
                .filter(|&(_, &count)| count > 1)
                .map(|(&id, _)| id)
                .collect();
            ids.sort_unstable();
            ids
        })
    }

    fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        // A poisoned ledger still holds valid counts
        let mut ledger = self
            .ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut ledger)
    }
}

impl GpuDevice for RecordingDevice {
    type Buffer = RecordedBuffer;

    fn create_buffer(&self, label: &str, usage: BufferUsage, contents: &[u8]) -> RecordedBuffer {
        let id = self.with_ledger(|ledger| {
            let id = ledger.next_id;
            ledger.next_id += 1;
            id
        });
        trace!(id, label, ?usage, size = contents.len(), "Recorded buffer allocation");
        RecordedBuffer {
            id,
            label: label.to_string(),
            usage,
            contents: contents.to_vec(),
        }
    }

    fn release_buffer(&self, buffer: &RecordedBuffer) {
        let count = self.with_ledger(|ledger| {
            let count = ledger.releases.entry(buffer.id).or_insert(0);
            *count += 1;
            *count
        });
        if count > 1 {
            error!(id = buffer.id, label = %buffer.label, "Buffer released more than once");
        }
    }
}

/// A command captured by [`RecordingPass`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    BindVertexBuffer { buffer: usize, layout: VertexLayout },
    BindIndexBuffer { buffer: usize },
    DrawIndexed { index_count: u32 },
}

/// In-memory [`DrawTarget`]
#[derive(Debug, Default)]
pub struct RecordingPass {
    commands: Vec<DrawCommand>,
}

impl RecordingPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands in the order they were issued
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Index counts of every draw, in order
    pub fn draws(&self) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::DrawIndexed { index_count } => Some(*index_count),
                _ => None,
            })
            .collect()
    }
}

impl DrawTarget<RecordingDevice> for RecordingPass {
    fn bind_vertex_buffer(&mut self, buffer: &RecordedBuffer, layout: VertexLayout) {
        self.commands.push(DrawCommand::BindVertexBuffer {
            buffer: buffer.id,
            layout,
        });
    }

    fn bind_index_buffer(&mut self, buffer: &RecordedBuffer) {
        self.commands
            .push(DrawCommand::BindIndexBuffer { buffer: buffer.id });
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.commands.push(DrawCommand::DrawIndexed { index_count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_ids_are_sequential() {
        let device = RecordingDevice::new();
        let a = device.create_buffer("a", BufferUsage::Vertex, &[1, 2, 3]);
        let b = device.create_buffer("b", BufferUsage::Index, &[]);
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
        assert_eq!(a.contents, vec![1, 2, 3]);
        assert_eq!(device.allocated_buffers(), 2);
        assert_eq!(device.live_buffers(), 2);
    }

    #[test]
    fn test_double_release_is_reported() {
        let device = RecordingDevice::new();
        let a = device.create_buffer("a", BufferUsage::Vertex, &[0; 12]);
        device.release_buffer(&a);
        assert!(device.double_releases().is_empty());
        device.release_buffer(&a);
        assert_eq!(device.double_releases(), vec![0]);
        assert_eq!(device.live_buffers(), 0);
    }
}
