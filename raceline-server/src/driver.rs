use glam::DVec3;

/// Drives a racer along a closed polyline at a fixed rate, wrapping back to
/// the start after every loop. Stands in for whatever actually steers a kart.
#[derive(Clone, Debug)]
pub struct SplineDriver {
    nodes: Vec<DVec3>,
    // cumulative arc length at each node, plus the closing segment at the end
    lengths: Vec<f64>,
    // 0 at the first node, 1 after a full loop
    t: f64,
    // loops per second
    travel_rate: f64,
    lateral_offset: f64,
}

impl SplineDriver {
    pub fn new(nodes: Vec<DVec3>, travel_rate: f64) -> SplineDriver {
        let mut lengths = Vec::with_capacity(nodes.len() + 1);
        let mut total = 0.0;
        lengths.push(total);
        for i in 0..nodes.len() {
            total += nodes[i].distance(nodes[(i + 1) % nodes.len()]);
            lengths.push(total);
        }

        SplineDriver {
            nodes,
            lengths,
            t: 0.0,
            travel_rate,
            lateral_offset: 0.0,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    // place the driver `distance` units before the first node
    pub fn start_behind_first_node(&mut self, distance: f64) {
        let length = self.total_length();
        if length > 0.0 {
            self.t = (1.0 - distance / length).rem_euclid(1.0);
        }
    }

    // sideways shift from the centerline, positive to the right of travel
    pub fn set_lateral_offset(&mut self, offset: f64) {
        self.lateral_offset = offset;
    }

    pub fn advance(&mut self, time_step: f64) {
        // a negative rate drives the loop backwards, still within [0, 1)
        self.t = (self.t + self.travel_rate * time_step).rem_euclid(1.0);
    }

    pub fn travel_rate(&self) -> f64 {
        self.travel_rate
    }

    /// Current position and unit forward direction.
    pub fn sample(&self) -> (DVec3, DVec3) {
        match self.nodes.len() {
            0 => return (DVec3::ZERO, DVec3::X),
            1 => return (self.nodes[0], DVec3::X),
            _ => {}
        }

        let distance = self.t * self.total_length();
        // first segment whose end lies past `distance`
        let segment = self.lengths[1..]
            .iter()
            .position(|end| *end > distance)
            .unwrap_or(self.nodes.len() - 1);

        let start = self.nodes[segment];
        let end = self.nodes[(segment + 1) % self.nodes.len()];
        let segment_length = self.lengths[segment + 1] - self.lengths[segment];
        let along = if segment_length > 0.0 {
            (distance - self.lengths[segment]) / segment_length
        } else {
            0.0
        };

        let forward = (end - start).normalize_or_zero();
        let right = forward.cross(DVec3::Y);
        let position = start.lerp(end, along) + right * self.lateral_offset;

        (position, forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_driver(travel_rate: f64) -> SplineDriver {
        SplineDriver::new(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(10.0, 0.0, 0.0),
                DVec3::new(10.0, 0.0, 10.0),
                DVec3::new(0.0, 0.0, 10.0),
            ],
            travel_rate,
        )
    }

    #[test]
    fn test_loop_length() {
        assert_eq!(square_driver(0.1).total_length(), 40.0);
    }

    #[test]
    fn test_moves_along_segments() {
        let mut driver = square_driver(0.125);
        driver.advance(1.0);
        let (position, forward) = driver.sample();
        assert!(position.abs_diff_eq(DVec3::new(5.0, 0.0, 0.0), 1e-9));
        assert!(forward.abs_diff_eq(DVec3::X, 1e-9));

        driver.advance(2.0);
        let (position, forward) = driver.sample();
        assert!(position.abs_diff_eq(DVec3::new(10.0, 0.0, 5.0), 1e-9));
        assert!(forward.abs_diff_eq(DVec3::Z, 1e-9));
    }

    #[test]
    fn test_wraps_after_a_full_loop() {
        let mut driver = square_driver(0.25);
        driver.advance(4.5);
        let (position, _) = driver.sample();
        assert!(position.abs_diff_eq(DVec3::new(5.0, 0.0, 0.0), 1e-9));
    }

    #[test]
    fn test_start_behind_first_node() {
        let mut driver = square_driver(0.1);
        driver.start_behind_first_node(4.0);
        let (position, forward) = driver.sample();
        // on the closing segment, heading back to the origin
        assert!(position.abs_diff_eq(DVec3::new(0.0, 0.0, 4.0), 1e-9));
        assert!(forward.abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-9));
    }

    #[test]
    fn test_lateral_offset_is_to_the_right() {
        let mut driver = square_driver(0.125);
        driver.set_lateral_offset(2.0);
        driver.advance(1.0);
        let (position, _) = driver.sample();
        assert!(position.abs_diff_eq(DVec3::new(5.0, 0.0, 2.0), 1e-9));
    }

    #[test]
    fn test_negative_rate_stays_on_the_loop() {
        let mut driver = square_driver(-0.125);
        driver.advance(1.0);
        let (position, forward) = driver.sample();
        // half way back along the closing segment
        assert!(position.abs_diff_eq(DVec3::new(0.0, 0.0, 5.0), 1e-9));
        assert!(forward.abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-9));

        driver.advance(7.0);
        let (position, _) = driver.sample();
        assert!(position.abs_diff_eq(DVec3::ZERO, 1e-9));
    }
}
