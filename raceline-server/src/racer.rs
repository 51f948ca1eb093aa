use std::mem;

use glam::DVec3;
use raceline_core::progress::lap_info::CheckpointIndex;
use raceline_core::RacerID;
use tracing::trace;

use crate::driver::SplineDriver;
use crate::physics::bounding_box::BoundingBox;
use crate::physics::trigger_entity::TriggerEntity;

// where the racer is and which way it's pointing
#[derive(Copy, Clone, Debug)]
pub struct EntityLocation {
    pub position: DVec3,
    pub unit_steer_direction: DVec3, // should be a normalized vector
}

pub struct RacerEntity {
    pub id: RacerID,
    pub entity_location: EntityLocation,
    pub size: DVec3,
    pub bounding_box: BoundingBox,

    // triggers we were inside of last tick
    pub current_colliders: Vec<usize>,
    // checkpoint events waiting to be handed to the race
    pub reached_checkpoints: Vec<CheckpointIndex>,

    pub driver: SplineDriver,
    pub parked: bool,
}

impl RacerEntity {
    pub fn new(id: RacerID, driver: SplineDriver) -> RacerEntity {
        let (position, unit_steer_direction) = driver.sample();
        let mut racer = RacerEntity {
            id,
            entity_location: EntityLocation {
                position,
                unit_steer_direction,
            },
            size: DVec3::new(2.0, 1.0, 2.0),
            bounding_box: BoundingBox::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0), // made correct just below
            current_colliders: vec![],
            reached_checkpoints: vec![],
            driver,
            parked: false,
        };
        racer.update_bounding_box();
        racer
    }

    pub fn update_bounding_box(&mut self) {
        self.bounding_box = BoundingBox::around(self.entity_location.position, self.size / 2.0);
    }

    pub fn drive(&mut self, time_step: f64) {
        if self.parked {
            return;
        }

        self.driver.advance(time_step);
        let (position, unit_steer_direction) = self.driver.sample();
        self.entity_location = EntityLocation {
            position,
            unit_steer_direction,
        };
        self.update_bounding_box();
    }

    /// Fires every trigger we've just entered. Staying inside a trigger
    /// doesn't fire it again; leaving and coming back does.
    pub fn detect_triggers<'a>(
        &mut self,
        potential_triggers: impl Iterator<Item = &'a dyn TriggerEntity>,
    ) {
        let mut triggers_with_collisions = vec![];

        for trigger in potential_triggers {
            if !trigger.get_bounding_box().is_colliding(&self.bounding_box) {
                continue;
            }

            let id = trigger.trigger_id();
            if !self.current_colliders.contains(&id) {
                trace!(racer = self.id, trigger = id, at = ?trigger.pos(), "entered trigger");
                trigger.trigger(self);
            }
            triggers_with_collisions.push(id);
        }

        self.current_colliders = triggers_with_collisions;
    }

    pub fn take_reached_checkpoints(&mut self) -> Vec<CheckpointIndex> {
        mem::take(&mut self.reached_checkpoints)
    }
}

// Racers line up in two columns behind the start line, a few units apart.
pub fn get_racer_start_properties(
    id: RacerID,
    centerline: Vec<DVec3>,
    travel_rate: f64,
) -> RacerEntity {
    let mut driver = SplineDriver::new(centerline, travel_rate);
    driver.start_behind_first_node(6.0 + 4.0 * (id / 2) as f64);
    driver.set_lateral_offset(if id % 2 == 0 { -1.5 } else { 1.5 });

    RacerEntity::new(id, driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoints::CheckpointVolume;

    fn straight_line_racer() -> RacerEntity {
        // a long thin loop so the racer drives straight along +x for a while
        let driver = SplineDriver::new(vec![DVec3::ZERO, DVec3::new(100.0, 0.0, 0.0)], 0.005);
        RacerEntity::new(0, driver)
    }

    #[test]
    fn test_trigger_fires_once_per_entry() {
        let mut racer = straight_line_racer();
        let volume = CheckpointVolume::new(
            3,
            BoundingBox::around(DVec3::new(5.0, 0.0, 0.0), DVec3::splat(2.0)),
        );

        // 1 unit per tick, enters around x = 2, leaves around x = 8
        for _ in 0..12 {
            racer.drive(1.0);
            racer.detect_triggers(std::iter::once(&volume as &dyn TriggerEntity));
        }

        assert_eq!(racer.take_reached_checkpoints(), vec![3]);
        assert!(racer.current_colliders.is_empty());
        assert!(racer.take_reached_checkpoints().is_empty());
    }

    #[test]
    fn test_parked_racer_does_not_move() {
        let mut racer = straight_line_racer();
        racer.parked = true;
        let before = racer.entity_location.position;
        racer.drive(10.0);
        assert_eq!(racer.entity_location.position, before);
    }

    #[test]
    fn test_start_grid_is_behind_the_start_line() {
        let centerline = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(50.0, 0.0, 0.0),
            DVec3::new(50.0, 0.0, 50.0),
            DVec3::new(0.0, 0.0, 50.0),
        ];
        let first = get_racer_start_properties(0, centerline.clone(), 0.1);
        let second = get_racer_start_properties(1, centerline.clone(), 0.1);
        let third = get_racer_start_properties(2, centerline, 0.1);

        // closing segment runs from (0, 0, 50) back to the origin along -z,
        // so the right-hand side of travel is +x
        assert!(first
            .entity_location
            .position
            .abs_diff_eq(DVec3::new(-1.5, 0.0, 6.0), 1e-9));
        assert!(second
            .entity_location
            .position
            .abs_diff_eq(DVec3::new(1.5, 0.0, 6.0), 1e-9));
        assert!(third.entity_location.position.z > first.entity_location.position.z);
    }
}
