use crate::physics::bounding_box::BoundingBox;
use crate::physics::trigger_entity::TriggerEntity;
use crate::racer::RacerEntity;
use glam::DVec3;
use raceline_core::progress::lap_info::CheckpointIndex;

// The trigger volume around one checkpoint marker. Entering it queues a
// checkpoint event on the racer; the race core decides what it means.
#[derive(Clone, Copy, Debug)]
pub struct CheckpointVolume {
    pub index: CheckpointIndex,
    pub bounds: BoundingBox,
}

impl CheckpointVolume {
    pub fn new(index: CheckpointIndex, bounds: BoundingBox) -> Self {
        Self { index, bounds }
    }
}

impl TriggerEntity for CheckpointVolume {
    fn trigger_id(&self) -> usize {
        self.index
    }

    fn pos(&self) -> DVec3 {
        self.bounds.pos()
    }

    fn get_bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    fn trigger(&self, racer: &mut RacerEntity) {
        racer.reached_checkpoints.push(self.index);
    }
}
