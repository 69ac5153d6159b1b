//! Binary space partitioning of a rectangle into rooms.
//!
//! Noise picks the split axis and offset, so the same seed always yields
//! the same floor plan.

use arcology_shared::Rect;

use crate::error::{ProceduralError, ProceduralResult};
use crate::noise::{NoiseField, PerlinNoise, WorldSeed};

/// Stream id for the split noise.
const BSP_FIELD: u64 = 0x4253_5021;

/// Smallest legal room side.
pub const MIN_ROOM_SIZE: f64 = 60.0;

/// Recursion depth limit (at most `2^MAX_DEPTH` leaves).
pub const MAX_DEPTH: u32 = 4;

/// Axis of a split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cut {
    /// Cut along a vertical line; children side by side.
    Vertical,
    /// Cut along a horizontal line; children stacked.
    Horizontal,
}

/// Recursive rectangle splitter.
pub struct RoomPartitioner {
    noise: PerlinNoise,
}

impl RoomPartitioner {
    /// Creates a partitioner for a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            noise: PerlinNoise::new(seed.derive(BSP_FIELD)),
        }
    }

    /// Splits `root` into at most `target` non-overlapping leaves.
    ///
    /// Leaves tile `root` exactly; fewer than `target` come back when a
    /// region becomes too small to split or the depth limit is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not finite or smaller than
    /// [`MIN_ROOM_SIZE`] on either side.
    pub fn partition(&self, root: Rect, target: usize) -> ProceduralResult<Vec<Rect>> {
        let finite = [root.x, root.y, root.width, root.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || root.width <= 0.0 || root.height <= 0.0 {
            return Err(ProceduralError::InvalidDimensions {
                width: root.width,
                height: root.height,
            });
        }
        if root.width < MIN_ROOM_SIZE || root.height < MIN_ROOM_SIZE {
            return Err(ProceduralError::RegionTooSmall {
                width: root.width,
                height: root.height,
                minimum: MIN_ROOM_SIZE,
            });
        }

        let mut leaves = Vec::with_capacity(target.max(1));
        self.split(root, target, 0, &mut leaves);
        tracing::debug!(requested = target, rooms = leaves.len(), "bsp partition done");
        Ok(leaves)
    }

    fn split(&self, node: Rect, target: usize, depth: u32, leaves: &mut Vec<Rect>) {
        if depth >= MAX_DEPTH || target <= 1 {
            leaves.push(node);
            return;
        }

        let Some(cut) = self.choose_cut(node, depth) else {
            leaves.push(node);
            return;
        };

        let depth_f = f64::from(depth);
        let (first, second) = match cut {
            Cut::Horizontal => {
                let t = self.unit_noise(node.x * 0.01 + 0.37, depth_f * 0.3 + 0.11);
                let offset = split_offset(node.height, t);
                (
                    Rect::new(node.x, node.y, node.width, offset),
                    Rect::new(node.x, node.y + offset, node.width, node.height - offset),
                )
            }
            Cut::Vertical => {
                let t = self.unit_noise(node.y * 0.01 + 0.37, depth_f * 0.3 + 0.11);
                let offset = split_offset(node.width, t);
                (
                    Rect::new(node.x, node.y, offset, node.height),
                    Rect::new(node.x + offset, node.y, node.width - offset, node.height),
                )
            }
        };

        let first_target = target.div_ceil(2);
        self.split(first, first_target, depth + 1, leaves);
        self.split(second, target - first_target, depth + 1, leaves);
    }

    /// Picks the split axis; `None` when neither side can hold two rooms.
    fn choose_cut(&self, node: Rect, depth: u32) -> Option<Cut> {
        let can_cut_vertical = node.width >= MIN_ROOM_SIZE * 2.0;
        let can_cut_horizontal = node.height >= MIN_ROOM_SIZE * 2.0;

        match (can_cut_vertical, can_cut_horizontal) {
            (false, false) => None,
            (true, false) => Some(Cut::Vertical),
            (false, true) => Some(Cut::Horizontal),
            (true, true) => {
                // Long sides are cut more often; noise decides near-squares
                let aspect = (node.height - node.width) / (node.width + node.height);
                let n = self
                    .noise
                    .sample(f64::from(depth) * 0.5 + 0.21, node.x * 0.01 + 0.43);
                if aspect + n * 0.5 > 0.0 {
                    Some(Cut::Horizontal)
                } else {
                    Some(Cut::Vertical)
                }
            }
        }
    }

    /// Noise mapped from `[-1, 1]` into `[0, 1]`.
    fn unit_noise(&self, x: f64, y: f64) -> f64 {
        (self.noise.sample(x, y) + 1.0) * 0.5
    }
}

/// Offset of a cut along a side of `length`, keeping both parts at least
/// [`MIN_ROOM_SIZE`].
fn split_offset(length: f64, t: f64) -> f64 {
    let slack = (length - MIN_ROOM_SIZE * 2.0).max(0.0);
    MIN_ROOM_SIZE + (t.clamp(0.0, 1.0) * slack).floor()
}
