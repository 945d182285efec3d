//! Double-buffered frame snapshots.
//!
//! The update side fills the write slot and submits it; submission makes that
//! slot the read slot and moves writing to the other one. The renderer always
//! reads the most recently submitted snapshot.
//!
//! ```text
//! acquire_write -> slot 1     read -> slot 0 (empty)
//! submit_write                read -> slot 1, write -> slot 0
//! acquire_write -> slot 0
//! ```

use super::snapshot::FrameSnapshot;

#[derive(Debug)]
pub struct FrameSnapshotBuffer {
    snapshots: [FrameSnapshot; 2],
    read_index: usize,
    write_index: usize,
}

impl FrameSnapshotBuffer {
    pub fn new() -> Self {
        Self {
            snapshots: Default::default(),
            read_index: 0,
            write_index: 1,
        }
    }

    /// The snapshot to fill this frame. Holds whatever was written two
    /// submissions ago; reset it (extraction does) before filling.
    pub fn acquire_write(&mut self) -> &mut FrameSnapshot {
        &mut self.snapshots[self.write_index]
    }

    /// Publish the write slot as the new read slot.
    pub fn submit_write(&mut self) {
        self.read_index = self.write_index;
        self.write_index = (self.write_index + 1) % self.snapshots.len();
    }

    pub fn read(&self) -> &FrameSnapshot {
        &self.snapshots[self.read_index]
    }
}

impl Default for FrameSnapshotBuffer {
    fn default() -> Self {
        Self::new()
    }
}
