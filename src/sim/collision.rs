//! Axis-aligned collision checks between the bird and the pipes

use glam::Vec2;

use super::state::{Collision, Field, Obstacle, ObstacleId};

/// Axis-aligned rectangle (origin is the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.origin, self.max());
        let (b_min, b_max) = (other.origin, other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

/// Bird hitbox at a given top edge
pub fn bird_rect(field: &Field, y: f32) -> Rect {
    Rect::new(field.bird_left, y, field.bird_size.x, field.bird_size.y)
}

/// Top and bottom pipe rectangles of one obstacle
pub fn pipe_rects(obstacle: &Obstacle, field: &Field) -> [Rect; 2] {
    [
        Rect::new(obstacle.x, 0.0, field.pipe_width, obstacle.top_height),
        Rect::new(
            obstacle.x,
            obstacle.bottom_top(),
            field.pipe_width,
            obstacle.bottom_height(field.height),
        ),
    ]
}

/// Check the bird's vertical position against the field edges
pub fn out_of_bounds(y: f32, field: &Field) -> Option<Collision> {
    if y < 0.0 {
        Some(Collision::Ceiling)
    } else if y > field.bird_floor() {
        Some(Collision::Floor)
    } else {
        None
    }
}

/// First obstacle the bird overlaps, if any
pub fn first_hit(bird: &Rect, obstacles: &[Obstacle], field: &Field) -> Option<ObstacleId> {
    obstacles
        .iter()
        .find(|o| pipe_rects(o, field).iter().any(|r| bird.overlaps(r)))
        .map(|o| o.id)
}

/// Whether the bird overlaps any pipe
pub fn collides(bird: &Rect, obstacles: &[Obstacle], field: &Field) -> bool {
    first_hit(bird, obstacles, field).is_some()
}

/// Full check for a bird at `y`: field edges first, then pipes
pub fn check_bird(y: f32, obstacles: &[Obstacle], field: &Field) -> Option<Collision> {
    out_of_bounds(y, field).or_else(|| {
        first_hit(&bird_rect(field, y), obstacles, field).map(Collision::Pipe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Field {
        Field::new(1024.0, 600.0).unwrap()
    }

    fn pipe(id: u64, x: f32, top_height: f32) -> Obstacle {
        Obstacle {
            id: ObstacleId(id),
            x,
            top_height,
            gap: 130.0,
            scored: false,
        }
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Sharing an edge is not an overlap
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_out_of_bounds_boundary() {
        let field = field();
        // Bottom edge at 601
        assert_eq!(out_of_bounds(573.0, &field), Some(Collision::Floor));
        // Bottom edge exactly at 600
        assert_eq!(out_of_bounds(572.0, &field), None);
        assert_eq!(out_of_bounds(0.0, &field), None);
        assert_eq!(out_of_bounds(-0.5, &field), Some(Collision::Ceiling));
    }

    #[test]
    fn test_out_of_bounds_without_obstacles() {
        let field = field();
        assert_eq!(check_bird(573.0, &[], &field), Some(Collision::Floor));
        assert_eq!(check_bird(300.0, &[], &field), None);
    }

    #[test]
    fn test_pipe_rects_derive_bottom() {
        let field = field();
        let [top, bottom] = pipe_rects(&pipe(1, 100.0, 200.0), &field);
        assert_eq!(top, Rect::new(100.0, 0.0, 52.0, 200.0));
        assert_eq!(bottom, Rect::new(100.0, 330.0, 52.0, 270.0));
    }

    #[test]
    fn test_bird_in_gap_is_safe() {
        let field = field();
        // Pipe spans the bird's column, gap 200..330, bird 250..278
        let obstacles = [pipe(1, 50.0, 200.0)];
        assert!(!collides(&bird_rect(&field, 250.0), &obstacles, &field));
    }

    #[test]
    fn test_hits_top_and_bottom_pipe() {
        let field = field();
        let obstacles = [pipe(1, 50.0, 200.0)];
        assert!(collides(&bird_rect(&field, 190.0), &obstacles, &field));
        assert!(collides(&bird_rect(&field, 310.0), &obstacles, &field));
    }

    #[test]
    fn test_pipe_out_of_column_is_ignored() {
        let field = field();
        // Bird spans x 60..98; pipe at 98..150 only touches
        let obstacles = [pipe(1, 98.0, 500.0)];
        assert!(!collides(&bird_rect(&field, 10.0), &obstacles, &field));
    }

    #[test]
    fn test_order_does_not_matter() {
        let field = field();
        let a = pipe(1, 400.0, 100.0);
        let b = pipe(2, 70.0, 400.0);
        let bird = bird_rect(&field, 100.0);
        assert!(collides(&bird, &[a.clone(), b.clone()], &field));
        assert!(collides(&bird, &[b, a], &field));
        assert_eq!(
            check_bird(100.0, &[pipe(1, 400.0, 100.0), pipe(2, 70.0, 400.0)], &field),
            Some(Collision::Pipe(ObstacleId(2)))
        );
    }
}
