use map_range::MapRange;
use serde::{Deserialize, Serialize};

use crate::{hands::Landmark, Point2D};

/// Size of the render surface, plus its offset within the viewport
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceGeometry {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub top: f32,
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        SurfaceGeometry {
            width: 1280.,
            height: 720.,
            left: 0.,
            top: 0.,
        }
    }
}

/// A landmark resolved to pixels: `x`,`y` in (unmirrored) render-surface space,
/// `client_x`,`client_y` in (mirrored) viewport space
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub client_x: f32,
    pub client_y: f32,
}

impl ScreenPoint {
    /// Inverse of [to_screen_point] for a position that is already in viewport space
    pub fn from_client(client_x: f32, client_y: f32, surface: &SurfaceGeometry) -> Self {
        ScreenPoint {
            x: surface.width - (client_x - surface.left),
            y: client_y - surface.top,
            client_x,
            client_y,
        }
    }

    pub fn client_position(&self) -> Point2D {
        (self.client_x, self.client_y)
    }

    /// Position relative to the surface origin, but in the mirrored orientation the
    /// user actually sees. View transforms (pan/zoom) are expressed in this space.
    pub fn view_position(&self, surface: &SurfaceGeometry) -> Point2D {
        (self.client_x - surface.left, self.client_y - surface.top)
    }
}

/// Convert a normalised landmark into surface and viewport coordinates. The
/// viewport position is mirrored horizontally, so that a front-facing camera feed
/// shown un-mirrored still moves the cursor the same way as the hand.
pub fn to_screen_point(landmark: &Landmark, surface: &SurfaceGeometry) -> ScreenPoint {
    let canvas_x = landmark.x.map_range(0. ..1., 0. ..surface.width);
    let canvas_y = landmark.y.map_range(0. ..1., 0. ..surface.height);
    ScreenPoint {
        x: canvas_x,
        y: canvas_y,
        client_x: surface.left + (surface.width - canvas_x),
        client_y: surface.top + canvas_y,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point2D,
    pub radius: f32,
}

impl Circle {
    pub fn contains(&self, p: &Point2D) -> bool {
        distance_points(&self.center, p) <= self.radius + CONTAINS_EPSILON * self.radius.max(1.)
    }
}

const CONTAINS_EPSILON: f32 = 1e-4;

pub fn distance_points(a: &Point2D, b: &Point2D) -> f32 {
    let (x1, y1) = *a;
    let (x2, y2) = *b;

    f32::sqrt(f32::powi(x1 - x2, 2) + f32::powi(y1 - y2, 2))
}

pub fn midpoint(a: &Point2D, b: &Point2D) -> Point2D {
    ((a.0 + b.0) / 2., (a.1 + b.1) / 2.)
}

fn circle_from_diameter(a: &Point2D, b: &Point2D) -> Circle {
    Circle {
        center: midpoint(a, b),
        radius: distance_points(a, b) / 2.,
    }
}

/// Circumscribed circle of a triangle; None if the points are (nearly) collinear
fn circumcircle(a: &Point2D, b: &Point2D, c: &Point2D) -> Option<Circle> {
    let (ax, ay) = *a;
    let (bx, by) = *b;
    let (cx, cy) = *c;

    let d = 2. * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < f32::EPSILON {
        return None;
    }
    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
    let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;
    let center = (ux, uy);

    Some(Circle {
        center,
        radius: distance_points(&center, a),
    })
}

/// Smallest circle covering all the given points.
///
/// Intended for the handful of fingertips on one hand, so every circle through
/// two or three of the points is simply tried. Identical points give a valid
/// circle of radius 0; empty or non-finite input gives None.
pub fn min_enclosing_circle(points: &[Point2D]) -> Option<Circle> {
    if points.is_empty() || points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return None;
    }

    let covers_all = |c: &Circle| points.iter().all(|p| c.contains(p));

    let first = Circle {
        center: points[0],
        radius: 0.,
    };
    if covers_all(&first) {
        return Some(first);
    }

    let mut best: Option<Circle> = None;
    let mut consider = |candidate: Circle| {
        if best.is_none_or(|b| candidate.radius < b.radius) && covers_all(&candidate) {
            best = Some(candidate);
        }
    };

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            consider(circle_from_diameter(&points[i], &points[j]));
            for k in (j + 1)..points.len() {
                if let Some(c) = circumcircle(&points[i], &points[j], &points[k]) {
                    consider(c);
                }
            }
        }
    }

    best
}

/// Regular grid of `samples_per_axis` x `samples_per_axis` points across the
/// circle's bounding square, keeping only those inside the circle. The centre
/// is always the first point returned.
pub fn grid_points_in_circle(circle: &Circle, samples_per_axis: usize) -> Vec<Point2D> {
    let mut points = vec![circle.center];
    if samples_per_axis < 2 || circle.radius <= 0. {
        return points;
    }

    let (cx, cy) = circle.center;
    let r = circle.radius;
    let step = 2. * r / (samples_per_axis - 1) as f32;
    for i in 0..samples_per_axis {
        for j in 0..samples_per_axis {
            let p = (cx - r + i as f32 * step, cy - r + j as f32 * step);
            if circle.contains(&p) {
                points.push(p);
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_screen_point_is_mirrored() {
        let surface = SurfaceGeometry {
            width: 640.,
            height: 480.,
            left: 10.,
            top: 20.,
        };
        let p = to_screen_point(&Landmark::new(0.25, 0.5, 0.), &surface);
        assert_eq!(p.x, 160.);
        assert_eq!(p.y, 240.);
        assert_eq!(p.client_x, 10. + 640. - 160.);
        assert_eq!(p.client_y, 260.);

        let back = ScreenPoint::from_client(p.client_x, p.client_y, &surface);
        assert_eq!(back, p);
        assert_eq!(p.view_position(&surface), (480., 240.));
    }

    #[test]
    fn test_circle_two_points() {
        let c = min_enclosing_circle(&[(0., 0.), (10., 0.)]).unwrap();
        assert!(approx(c.center.0, 5.) && approx(c.center.1, 0.));
        assert!(approx(c.radius, 5.));
    }

    #[test]
    fn test_circle_triangle() {
        // Right angle: hypotenuse is the diameter
        let c = min_enclosing_circle(&[(0., 0.), (6., 0.), (0., 8.)]).unwrap();
        assert!(approx(c.radius, 5.));
        assert!(approx(c.center.0, 3.) && approx(c.center.1, 4.));

        // Equilateral: circumcircle
        let h = 3f32.sqrt() / 2. * 10.;
        let c = min_enclosing_circle(&[(0., 0.), (10., 0.), (5., h)]).unwrap();
        assert!(approx(c.radius, 10. / 3f32.sqrt()));
    }

    #[test]
    fn test_circle_fingertips_inside() {
        let points = [(0., 0.), (4., 1.), (2., 2.), (1., 3.), (3., -1.)];
        let c = min_enclosing_circle(&points).unwrap();
        for p in points.iter() {
            assert!(c.contains(p));
        }
    }

    #[test]
    fn test_circle_degenerate() {
        assert_eq!(min_enclosing_circle(&[]), None);
        assert_eq!(min_enclosing_circle(&[(1., f32::NAN)]), None);

        let c = min_enclosing_circle(&[(3., 3.), (3., 3.), (3., 3.)]).unwrap();
        assert_eq!(c.radius, 0.);

        // Collinear points
        let c = min_enclosing_circle(&[(0., 0.), (5., 0.), (10., 0.)]).unwrap();
        assert!(approx(c.radius, 5.));
    }

    #[test]
    fn test_grid_points() {
        let circle = Circle {
            center: (50., 50.),
            radius: 10.,
        };
        let points = grid_points_in_circle(&circle, 5);
        assert_eq!(points[0], (50., 50.));
        assert!(points.iter().all(|p| circle.contains(p)));
        // Corners of the bounding square are excluded
        assert!(!points.contains(&(40., 40.)));
        assert!(points.contains(&(40., 50.)));

        let zero = Circle {
            center: (1., 1.),
            radius: 0.,
        };
        assert_eq!(grid_points_in_circle(&zero, 8), vec![(1., 1.)]);
    }

    #[test]
    fn test_midpoint_and_distance() {
        assert_eq!(midpoint(&(0., 0.), &(4., 2.)), (2., 1.));
        assert_eq!(distance_points(&(0., 0.), &(3., 4.)), 5.);
    }
}
