//! Registry diagnostics.
//!
//! Enabled by the `diagnostics` feature flag (on by default). A
//! [`RegistryStats`] snapshot reports entity slot usage, per-frame churn and
//! the size of every component pool, and serializes to JSON for an external
//! inspector or a log line.

use serde::Serialize;

use crate::ecs::Registry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Short type name of the component.
    pub component: String,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub alive: usize,
    pub free_slots: usize,
    pub total_slots: usize,
    /// Entities created since the frame counters were last taken.
    pub created: u32,
    /// Entities destroyed since the frame counters were last taken.
    pub destroyed: u32,
    /// Share of slots sitting on the free list, in percent.
    pub fragmentation_pct: f32,
    /// Largest pool first.
    pub pools: Vec<PoolStats>,
}

impl RegistryStats {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Registry {
    /// Snapshot of slot usage and pool sizes. Does not reset the frame
    /// counters; see [`Registry::take_frame_counters`].
    pub fn stats(&self) -> RegistryStats {
        let total_slots = self.total_slots();
        let free_slots = self.free_count();
        let fragmentation_pct = if total_slots == 0 {
            0.0
        } else {
            free_slots as f32 / total_slots as f32 * 100.0
        };

        let mut pools: Vec<PoolStats> = self
            .pools
            .values()
            .map(|pool| PoolStats {
                component: pool.component_name().to_string(),
                len: pool.len(),
            })
            .collect();
        pools.sort_by(|a, b| b.len.cmp(&a.len).then_with(|| a.component.cmp(&b.component)));

        RegistryStats {
            alive: self.alive_count(),
            free_slots,
            total_slots,
            created: self.created_this_frame,
            destroyed: self.destroyed_this_frame,
            fragmentation_pct,
            pools,
        }
    }
}
