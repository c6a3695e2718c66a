//! Synthetic road network used when no GeoJSON file is given.
//!
//! A national highway runs east-west through a town whose departmental
//! streets form a 4 x 3 block grid south of it.  Coordinates are metres in
//! an arbitrary projected frame.
//!
//! ```text
//!   y=600  ════════════════════════════════  N-7 (national)
//!   y=400  ──┼──────┼──────┼──────┼──  ┐
//!   y=200  ──┼──────┼──────┼──────┼──  │ departmental grid
//!   y=0    ──┼──────┼──────┼──────┼──  ┘
//!          x=0    300    600    900
//! ```
//!
//! Only the avenue at x = 0 reaches the highway, so with the departmental
//! layer hidden the grid is unreachable from it.

use rl_core::{Coord, FeatureId, RoadClass, RoadFeature};

const BLOCK: f64 = 300.0;
const ROW:   f64 = 200.0;
const HIGHWAY_Y: f64 = 600.0;

pub fn build_roads() -> Vec<RoadFeature> {
    let mut roads = Vec::new();
    let mut next = 0u32;
    let mut push = |class: RoadClass, coords: Vec<Coord>| {
        roads.push(RoadFeature::new(FeatureId(next), class, coords));
        next += 1;
    };

    // Highway, digitised with a vertex every 150 m.
    push(
        RoadClass::National,
        (0..=8).map(|i| Coord::new(-300.0 + i as f64 * 150.0, HIGHWAY_Y)).collect(),
    );

    // East-west streets.
    for row in 0..3 {
        let y = row as f64 * ROW;
        push(RoadClass::Departmental, (0..4).map(|i| Coord::new(i as f64 * BLOCK, y)).collect());
    }

    // North-south avenues.
    for col in 0..4 {
        let x = col as f64 * BLOCK;
        push(RoadClass::Departmental, (0..3).map(|r| Coord::new(x, r as f64 * ROW)).collect());
    }

    // The western avenue continues north to the highway.
    push(RoadClass::Departmental, vec![Coord::new(0.0, 2.0 * ROW), Coord::new(0.0, HIGHWAY_Y)]);

    roads
}
