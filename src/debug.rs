/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * shown in the control panel and the on-screen overlay.
 *
 * Includes metrics for:
 * - FPS (frames per second) and frame time
 * - Simulation ticks run during the last frame
 * - Counters from the most recent tick (neighbor pairs, quadtree nodes/depth)
 */

use std::time::Duration;

use crate::simulation::TickStats;

// Debug information to display
#[derive(Debug, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub ticks_per_frame: usize,
    pub last_tick: TickStats,
}

impl DebugInfo {
    pub fn record_tick(&mut self, stats: TickStats) {
        self.last_tick = stats;
    }

    /// Average neighbors per boid on the last tick.
    pub fn mean_neighbors(&self) -> f32 {
        if self.last_tick.boids == 0 {
            return 0.0;
        }
        self.last_tick.neighbor_pairs as f32 / self.last_tick.boids as f32
    }

    pub fn lines(&self) -> [String; 6] {
        [
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Ticks this frame: {}", self.ticks_per_frame),
            format!(
                "Tick time: {:.2} ms",
                self.last_tick.duration.as_secs_f64() * 1000.0
            ),
            format!("Neighbors/boid: {:.1}", self.mean_neighbors()),
            format!(
                "Quadtree: {} nodes, depth {}",
                self.last_tick.index_nodes, self.last_tick.index_depth
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_neighbors_handles_empty_flock() {
        let mut info = DebugInfo::default();
        assert_eq!(info.mean_neighbors(), 0.0);

        info.record_tick(TickStats {
            boids: 4,
            neighbor_pairs: 10,
            ..TickStats::default()
        });
        assert_eq!(info.mean_neighbors(), 2.5);
        assert_eq!(info.lines()[4], "Neighbors/boid: 2.5");
    }
}
