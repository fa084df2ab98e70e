//! Obstacle field
//!
//! Owns every fence on screen: spawning on a timer, scrolling, quiz-trigger
//! detection, and pruning. Trigger detection and all downstream resolution
//! use bounded windows rather than equality checks so variable frame timing
//! cannot step over a boundary.

use crate::consts::*;
use crate::sim::clock::normalized;
use crate::sim::state::{Obstacle, ObstacleId};

/// The set of active obstacles, left-to-right spawn order
#[derive(Debug, Clone)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    next_id: u32,
    /// Timestamp of the last spawn or quiz end, whichever came later
    last_quiz_end_ms: f64,
    /// Wait before the next spawn; mode-tunable after each quiz
    spawn_interval_ms: f64,
}

impl ObstacleField {
    pub fn new(now_ms: f64) -> Self {
        Self {
            obstacles: Vec::new(),
            next_id: 1,
            last_quiz_end_ms: now_ms,
            spawn_interval_ms: OBSTACLE_SPAWN_INTERVAL_MS,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.obstacles.iter_mut().find(|o| o.id == id)
    }

    fn next_obstacle_id(&mut self) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawn a fence at the right edge of the viewport
    pub fn spawn(&mut self) -> ObstacleId {
        let id = self.next_obstacle_id();
        self.obstacles.push(Obstacle {
            id,
            x: VIEW_WIDTH + SPAWN_X_OFFSET,
            speed: SCROLL_SPEED,
            has_triggered_quiz: false,
            has_been_processed: false,
        });
        id
    }

    /// Spawn when no quiz is active, the interval since the last quiz ended
    /// has elapsed, and the spawn region is clear of the previous fence.
    pub fn spawn_if_due(&mut self, now_ms: f64, quiz_active: bool) -> Option<ObstacleId> {
        if quiz_active || now_ms - self.last_quiz_end_ms <= self.spawn_interval_ms {
            return None;
        }
        let region_clear = self
            .obstacles
            .last()
            .is_none_or(|last| last.x < VIEW_WIDTH - SPAWN_CLEARANCE);
        if !region_clear {
            return None;
        }
        self.last_quiz_end_ms = now_ms;
        Some(self.spawn())
    }

    /// Scroll every fence left
    pub fn advance(&mut self, delta_ms: f64, slow_factor: f32) {
        let ndt = normalized(delta_ms);
        for obstacle in &mut self.obstacles {
            obstacle.x -= obstacle.speed * slow_factor * ndt;
        }
    }

    /// Find the first untriggered obstacle inside the leading-edge window
    /// `[character_x + trigger_distance - band, character_x + trigger_distance)`.
    /// The caller decides whether a quiz actually starts; marking happens in
    /// `mark_triggered` so an empty question bank leaves the obstacle
    /// eligible for the unanswered-collision path.
    pub fn detect_quiz_trigger(&self, character_x: f32) -> Option<ObstacleId> {
        let upper = character_x + QUIZ_TRIGGER_DISTANCE;
        let lower = upper - TRIGGER_BAND_WIDTH;
        self.obstacles
            .iter()
            .find(|o| !o.has_triggered_quiz && o.x >= lower && o.x < upper)
            .map(|o| o.id)
    }

    /// Commit the trigger. Monotonic: an obstacle triggers at most once.
    pub fn mark_triggered(&mut self, id: ObstacleId) {
        if let Some(obstacle) = self.get_mut(id) {
            obstacle.has_triggered_quiz = true;
        }
    }

    /// Remove fences fully past the left edge. Returns the removed ids so
    /// the controller can release a stale target binding.
    pub fn prune(&mut self) -> Vec<ObstacleId> {
        let mut removed = Vec::new();
        self.obstacles.retain(|o| {
            if o.x <= -FENCE_WIDTH {
                removed.push(o.id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Restart the spawn timer (a quiz just ended)
    pub fn note_quiz_end(&mut self, now_ms: f64) {
        self.last_quiz_end_ms = now_ms;
    }

    pub fn set_spawn_interval(&mut self, interval_ms: f64) {
        self.spawn_interval_ms = interval_ms;
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position_and_speed() {
        let mut field = ObstacleField::new(0.0);
        let id = field.spawn();
        let obstacle = field.get(id).unwrap();
        assert_eq!(obstacle.x, 2350.0);
        assert_eq!(obstacle.speed, SCROLL_SPEED);
        assert!(!obstacle.has_triggered_quiz);
    }

    #[test]
    fn test_spawn_waits_for_interval() {
        let mut field = ObstacleField::new(0.0);
        assert!(field.spawn_if_due(4000.0, false).is_none());
        assert!(field.spawn_if_due(5001.0, false).is_some());
    }

    #[test]
    fn test_no_spawn_while_quiz_active() {
        let mut field = ObstacleField::new(0.0);
        assert!(field.spawn_if_due(6000.0, true).is_none());
    }

    #[test]
    fn test_no_spawn_while_region_occupied() {
        let mut field = ObstacleField::new(0.0);
        field.spawn();
        // Newest fence still at the spawn point: region occupied
        assert!(field.spawn_if_due(6000.0, false).is_none());
        // Scroll it clear of the spawn region and retry
        field.advance(FIXED_TIME_STEP_MS * 130.0, 1.0);
        assert!(field.spawn_if_due(6000.0, false).is_some());
    }

    #[test]
    fn test_advance_applies_slow_factor() {
        let mut field = ObstacleField::new(0.0);
        let id = field.spawn();
        field.advance(FIXED_TIME_STEP_MS, 0.2);
        let obstacle = field.get(id).unwrap();
        assert!((obstacle.x - (2350.0 - SCROLL_SPEED * 0.2)).abs() < 1e-3);
    }

    #[test]
    fn test_trigger_window_is_leading_edge_band() {
        let mut field = ObstacleField::new(0.0);
        let id = field.spawn();
        let character_x = CHARACTER_X;

        // Way outside the band
        assert!(field.detect_quiz_trigger(character_x).is_none());

        // Walk the fence into the band: [charX + 1000, charX + 1100)
        field.get_mut(id).unwrap().x = character_x + QUIZ_TRIGGER_DISTANCE;
        assert!(field.detect_quiz_trigger(character_x).is_none());

        field.get_mut(id).unwrap().x = character_x + QUIZ_TRIGGER_DISTANCE - 1.0;
        assert_eq!(field.detect_quiz_trigger(character_x), Some(id));

        field.get_mut(id).unwrap().x = character_x + QUIZ_TRIGGER_DISTANCE - TRIGGER_BAND_WIDTH;
        assert_eq!(field.detect_quiz_trigger(character_x), Some(id));

        field.get_mut(id).unwrap().x =
            character_x + QUIZ_TRIGGER_DISTANCE - TRIGGER_BAND_WIDTH - 1.0;
        assert!(field.detect_quiz_trigger(character_x).is_none());
    }

    #[test]
    fn test_trigger_fires_once() {
        let mut field = ObstacleField::new(0.0);
        let id = field.spawn();
        field.get_mut(id).unwrap().x = CHARACTER_X + QUIZ_TRIGGER_DISTANCE - 50.0;

        let found = field.detect_quiz_trigger(CHARACTER_X).unwrap();
        field.mark_triggered(found);
        assert!(field.detect_quiz_trigger(CHARACTER_X).is_none());
    }

    #[test]
    fn test_untriggered_obstacle_survives_empty_bank() {
        // detect without mark leaves the obstacle eligible next tick
        let mut field = ObstacleField::new(0.0);
        let id = field.spawn();
        field.get_mut(id).unwrap().x = CHARACTER_X + QUIZ_TRIGGER_DISTANCE - 50.0;
        assert!(field.detect_quiz_trigger(CHARACTER_X).is_some());
        assert!(field.detect_quiz_trigger(CHARACTER_X).is_some());
    }

    #[test]
    fn test_prune_removes_offscreen() {
        let mut field = ObstacleField::new(0.0);
        let id = field.spawn();
        field.get_mut(id).unwrap().x = -FENCE_WIDTH - 1.0;
        let removed = field.prune();
        assert_eq!(removed, vec![id]);
        assert!(field.get(id).is_none());
        assert!(field.obstacles().is_empty());
    }

    #[test]
    fn test_scenario_spawn_to_trigger() {
        // Spawn at 2350, speed 8, normalized delta 1.0 per tick: the fence
        // enters the trigger band [1300, 1400) ahead of character x 300
        let mut field = ObstacleField::new(0.0);
        let id = field.spawn();
        let mut ticks = 0;
        loop {
            field.advance(FIXED_TIME_STEP_MS, 1.0);
            ticks += 1;
            if let Some(found) = field.detect_quiz_trigger(CHARACTER_X) {
                assert_eq!(found, id);
                break;
            }
            assert!(ticks < 1000, "trigger never fired");
        }
        let x = field.get(id).unwrap().x;
        assert!(x < CHARACTER_X + QUIZ_TRIGGER_DISTANCE);
        assert!(x >= CHARACTER_X + QUIZ_TRIGGER_DISTANCE - TRIGGER_BAND_WIDTH);
        // 2350 -> 1400 at 8 px/tick is ~119 ticks
        assert_eq!(ticks, 119);
    }
}
