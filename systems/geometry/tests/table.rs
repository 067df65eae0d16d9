use proptest::prelude::*;
use sightline_core::distance;
use sightline_geometry::{TableError, VisibilityTable, SLOPE_CAPACITY};

#[test]
fn radius_twenty_matches_the_classic_table() {
    let table = VisibilityTable::build(20).expect("radius 20 fits in 128 slopes");

    assert_eq!(table.len(), 161);
    assert_eq!(table.slope_count(), 126);
    assert_eq!(table.full_circle_len(), 1149);
}

#[test]
fn radius_twenty_one_overflows_the_mask() {
    let error = VisibilityTable::build(21).expect_err("radius 21 needs too many slopes");

    match error {
        TableError::SlopeOverflow {
            radius,
            slopes,
            capacity,
        } => {
            assert_eq!(radius, 21);
            assert!(slopes > capacity);
            assert_eq!(capacity, SLOPE_CAPACITY);
        }
    }
}

#[test]
fn huge_radius_fails_without_enumerating_everything() {
    assert!(VisibilityTable::build(u32::MAX / 4).is_err());
}

#[test]
fn ordering_is_non_decreasing_in_distance() {
    let table = VisibilityTable::build(20).expect("table builds");

    for pair in table.cells().windows(2) {
        assert!(pair[0].distance() <= pair[1].distance());
    }
}

#[test]
fn successors_point_forward_and_step_one_axis() {
    let table = VisibilityTable::build(20).expect("table builds");
    let cells = table.cells();

    for (index, cell) in cells.iter().enumerate() {
        if let Some(next) = cell.next_row() {
            assert!(next > index);
            assert_eq!(cells[next].dy(), cell.dy() + 1);
            assert_eq!(cells[next].dx(), cell.dx());
        }
        if let Some(next) = cell.next_column() {
            assert!(next > index);
            assert_eq!(cells[next].dy(), cell.dy());
            assert_eq!(cells[next].dx(), cell.dx() + 1);
        }
    }
}

#[test]
fn every_entry_but_the_origin_has_a_parent() {
    let table = VisibilityTable::build(20).expect("table builds");
    let mut has_parent = vec![false; table.len()];
    has_parent[0] = true;

    for cell in table.cells() {
        for next in cell.successors() {
            has_parent[next] = true;
        }
    }

    assert!(has_parent.iter().all(|&reached| reached));
}

#[test]
fn every_entry_is_crossed_by_some_slope() {
    let table = VisibilityTable::build(20).expect("table builds");

    assert!(table.cells().iter().all(|cell| !cell.mask().is_empty()));
}

#[test]
fn slopes_are_unique_and_within_the_octant() {
    let table = VisibilityTable::build(20).expect("table builds");
    let slopes = table.slopes();

    for (index, slope) in slopes.iter().enumerate() {
        assert!(*slope > 0 && *slope <= sightline_geometry::SLOPE_SCALE);
        assert!(!slopes[index + 1..].contains(slope));
    }
}

proptest! {
    #[test]
    fn entries_match_the_distance_oracle(radius in 0u32..=20) {
        let table = VisibilityTable::build(radius).unwrap();
        for cell in table.cells() {
            prop_assert!(cell.dy() <= cell.dx());
            prop_assert_eq!(
                cell.distance(),
                distance(0, 0, cell.dy() as i32, cell.dx() as i32)
            );
            prop_assert!(cell.distance() <= radius);
        }
    }

    #[test]
    fn full_circle_matches_brute_force(radius in 0u32..=20) {
        let table = VisibilityTable::build(radius).unwrap();
        let r = radius as i32;
        let brute = (-r..=r)
            .flat_map(|y| (-r..=r).map(move |x| (y, x)))
            .filter(|&(y, x)| distance(0, 0, y, x) <= radius)
            .count();
        prop_assert_eq!(table.full_circle_len(), brute);
    }
}
