use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// Integer tile coordinate. `x` grows east, `y` grows south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The 8 neighbour offsets: N, S, W, E, NW, NE, SW, SE.
pub const OFFSETS_8: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// The 3x3 block around a tile in row-major order, centre included.
pub const OFFSETS_9: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Chebyshev distance, the number of 8-connected steps between two tiles.
pub fn rl_dist(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

pub fn neighbours(p: Point) -> impl Iterator<Item = Point> {
    OFFSETS_8.iter().map(move |&(dx, dy)| p.offset(dx, dy))
}

/// Bresenham line from `from` to `to`, excluding `from` and including `to`.
/// Empty when both points coincide.
pub fn line_to(from: Point, to: Point) -> Vec<Point> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut cur = from;
    let mut line = Vec::with_capacity(dx.max(-dy) as usize);
    while cur != to {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cur.x += sx;
        }
        if e2 <= dx {
            err += dx;
            cur.y += sy;
        }
        line.push(cur);
    }
    line
}

/// First step from `from` toward `to`, followed by the two squares flanking
/// that step. An orthogonal step is flanked by its perpendicular neighbours;
/// a diagonal step by the two orthogonal squares it cuts between.
pub fn squares_in_direction(from: Point, to: Point) -> SmallVec<[Point; 3]> {
    let Some(&step) = line_to(from, to).first() else {
        return SmallVec::new();
    };
    if step.x == from.x {
        smallvec![step, step.offset(-1, 0), step.offset(1, 0)]
    } else if step.y == from.y {
        smallvec![step, step.offset(0, -1), step.offset(0, 1)]
    } else {
        smallvec![step, Point::new(from.x, step.y), Point::new(step.x, from.y)]
    }
}

/// The 3x3 block around `center` visited starting at a rotated row and
/// column, so that no neighbour is systematically favoured.
/// The first yielded point is the one at the rotation origin.
pub fn rotated_block(center: Point, start_col: i32, start_row: i32) -> impl Iterator<Item = Point> {
    (0..3).flat_map(move |i| {
        (0..3).map(move |j| {
            center.offset((i + start_col) % 3 - 1, (j + start_row) % 3 - 1)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rl_dist_is_chebyshev() {
        assert_eq!(rl_dist(Point::new(0, 0), Point::new(3, -7)), 7);
        assert_eq!(rl_dist(Point::new(2, 2), Point::new(2, 2)), 0);
        assert_eq!(rl_dist(Point::new(-1, 4), Point::new(1, 5)), 2);
    }

    #[test]
    fn neighbours_exclude_center() {
        let c = Point::new(5, 5);
        let all: Vec<_> = neighbours(c).collect();
        assert_eq!(all.len(), 8);
        assert!(!all.contains(&c));
        assert!(all.iter().all(|&p| rl_dist(p, c) == 1));
    }

    #[test]
    fn line_to_straight_and_diagonal() {
        let line = line_to(Point::new(0, 0), Point::new(3, 0));
        assert_eq!(line, vec![Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)]);

        let diag = line_to(Point::new(0, 0), Point::new(-2, 2));
        assert_eq!(diag, vec![Point::new(-1, 1), Point::new(-2, 2)]);

        assert!(line_to(Point::new(4, 4), Point::new(4, 4)).is_empty());
    }

    #[test]
    fn line_to_steps_are_adjacent() {
        let from = Point::new(1, 2);
        let to = Point::new(9, -3);
        let line = line_to(from, to);
        assert_eq!(line.len() as i32, rl_dist(from, to));
        let mut prev = from;
        for p in line {
            assert_eq!(rl_dist(prev, p), 1);
            prev = p;
        }
        assert_eq!(prev, to);
    }

    #[test]
    fn squares_in_direction_orthogonal() {
        let squares = squares_in_direction(Point::new(5, 5), Point::new(5, 0));
        assert_eq!(squares.as_slice(), &[Point::new(5, 4), Point::new(4, 4), Point::new(6, 4)]);
    }

    #[test]
    fn squares_in_direction_diagonal() {
        let squares = squares_in_direction(Point::new(5, 5), Point::new(8, 8));
        assert_eq!(squares.as_slice(), &[Point::new(6, 6), Point::new(5, 6), Point::new(6, 5)]);
    }

    #[test]
    fn squares_in_direction_same_point_is_empty() {
        assert!(squares_in_direction(Point::new(1, 1), Point::new(1, 1)).is_empty());
    }

    #[test]
    fn rotated_block_covers_all_nine() {
        let c = Point::new(10, 10);
        for sc in 0..3 {
            for sr in 0..3 {
                let mut pts: Vec<_> = rotated_block(c, sc, sr).collect();
                assert_eq!(pts.len(), 9);
                pts.sort_by_key(|p| (p.x, p.y));
                pts.dedup();
                assert_eq!(pts.len(), 9);
            }
        }
        assert_eq!(rotated_block(c, 1, 1).next(), Some(c));
    }
}
