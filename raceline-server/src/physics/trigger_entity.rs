use glam::DVec3;

use crate::physics::bounding_box::BoundingBox;
use crate::racer::RacerEntity;

pub trait TriggerEntity {
    // stable across ticks, used to tell a fresh entry from staying inside
    fn trigger_id(&self) -> usize;
    fn pos(&self) -> DVec3;
    fn get_bounding_box(&self) -> BoundingBox;
    fn trigger(&self, racer: &mut RacerEntity);
}
