// Local search over a constructed partition: move single boundary areas
// between regions while keeping every region floor-feasible and contiguous,
// until a full pass makes no move.

use rustc_hash::{FxHashMap, FxHashSet};
use crate::floor::check_floor_excluding;
use crate::graph::Graph;
use crate::objective::move_change;

/// Counters reported by the swap phase.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SwapStats {
    pub swap_iterations: usize,
    pub total_moves: usize,
}

/// Improve `regions`/`area_to_region` in place. Only regions touched by a
/// move are reconsidered in the next pass.
pub(crate) fn swap_refine(
    regions: &mut Vec<Vec<usize>>,
    area_to_region: &mut FxHashMap<usize, usize>,
    graph: &Graph,
    attributes: &[Vec<f64>],
    floor_variable: &[f64],
    floor: f64,
) -> SwapStats {
    let num_regions = regions.len();
    let mut changed_regions = vec![true; num_regions];
    let mut stats = SwapStats::default();

    loop {
        let mut moves_made = 0;

        let region_ids: Vec<usize> =
            (0..num_regions).filter(|&r| changed_regions[r]).collect();
        changed_regions.fill(false);
        stats.swap_iterations += 1;

        for &seed in &region_ids {
            let boundary = boundary_areas(&regions[seed], graph);

            // Keep only areas whose donor region survives losing them.
            let candidates: Vec<usize> = boundary
                .into_iter()
                .filter(|&area| {
                    let donor = &regions[area_to_region[&area]];
                    check_floor_excluding(donor, area, floor_variable, floor)
                        && graph.is_connected_excluding(donor, area)
                })
                .collect();

            // Best admissible move for this seed region; ties go to the
            // later candidate, and a zero change is still accepted.
            let mut cv = 0.0;
            let mut best = None;
            for &area in &candidates {
                let change = move_change(
                    area,
                    &regions[seed],
                    &regions[area_to_region[&area]],
                    attributes,
                );
                if change <= cv {
                    cv = change;
                    best = Some(area);
                }
            }

            // A single applied move exhausts this seed's candidates for the
            // current pass.
            if let Some(area) = best {
                let old_region = area_to_region[&area];
                regions[old_region].retain(|&member| member != area);
                area_to_region.insert(area, seed);
                regions[seed].push(area);

                moves_made += 1;
                changed_regions[seed] = true;
                changed_regions[old_region] = true;
            }
        }

        stats.total_moves += moves_made;
        if moves_made == 0 {
            return stats;
        }
    }
}

/// Areas outside `members` adjacent to at least one member, in first-contact
/// order.
fn boundary_areas(members: &[usize], graph: &Graph) -> Vec<usize> {
    let member_set: FxHashSet<usize> = members.iter().copied().collect();
    let mut seen = FxHashSet::default();
    let mut boundary = Vec::new();
    for &member in members {
        for nbr in graph.neighbors(member) {
            if !member_set.contains(&nbr) && seen.insert(nbr) {
                boundary.push(nbr);
            }
        }
    }
    boundary
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use super::*;
    use crate::objective::partition_ssd;

    fn one_column(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    fn partition(assignment: &[usize], num_regions: usize) -> (Vec<Vec<usize>>, FxHashMap<usize, usize>) {
        let mut regions = vec![Vec::new(); num_regions];
        let mut area_to_region = FxHashMap::default();
        for (area, &region) in assignment.iter().enumerate() {
            regions[region].push(area);
            area_to_region.insert(area, region);
        }
        (regions, area_to_region)
    }

    #[test]
    fn test_boundary_areas() {
        // Arrange
        let graph = Graph::from_edge_list(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);

        // Act
        let boundary = boundary_areas(&[1, 2], &graph);

        // Assert
        assert_eq!(boundary, vec![0, 3]);
    }

    #[test]
    fn test_improving_move_is_applied() {
        // Arrange
        // area 2 belongs with the high cluster; the donor keeps the floor
        let graph = Graph::from_edge_list(4, &[(0, 1), (1, 2), (2, 3)]);
        let attributes = one_column(&[0.0, 0.0, 10.0, 10.0]);
        let floor_variable = [1.0; 4];
        let (mut regions, mut area_to_region) = partition(&[0, 0, 0, 1], 2);

        // Act
        let stats = swap_refine(
            &mut regions,
            &mut area_to_region,
            &graph,
            &attributes,
            &floor_variable,
            2.0,
        );

        // Assert
        assert_eq!(stats.total_moves, 1);
        assert_relative_eq!(partition_ssd(&regions, &attributes), 0.0);
        assert_eq!(regions[0], vec![0, 1]);
        assert_eq!(regions[1], vec![3, 2]);
        assert_eq!(area_to_region[&2], 1);
    }

    #[test]
    fn test_no_move_when_donor_floor_would_break() {
        // Arrange
        // the only improving moves would leave a donor below the floor
        let graph = Graph::from_edge_list(4, &[(0, 1), (1, 2), (2, 3)]);
        let attributes = one_column(&[0.0, 0.0, 10.0, 10.0]);
        let floor_variable = [1.0; 4];
        let (mut regions, mut area_to_region) = partition(&[0, 0, 0, 1], 2);
        let before = regions.clone();

        // Act
        let stats = swap_refine(
            &mut regions,
            &mut area_to_region,
            &graph,
            &attributes,
            &floor_variable,
            3.0,
        );

        // Assert
        assert_eq!(stats.total_moves, 0);
        assert_eq!(regions, before);
    }

    #[test]
    fn test_no_move_that_disconnects_donor() {
        // Arrange
        // pulling the cut area 1 out of region 0 would strand 0 from 2, even
        // though the move itself would zero the objective
        let graph = Graph::from_edge_list(4, &[(0, 1), (1, 2), (1, 3)]);
        let attributes = one_column(&[5.0, 0.0, 5.0, 0.0]);
        let floor_variable = [1.0; 4];
        let (mut regions, mut area_to_region) = partition(&[0, 0, 0, 1], 2);
        let before = regions.clone();

        // Act
        let stats = swap_refine(
            &mut regions,
            &mut area_to_region,
            &graph,
            &attributes,
            &floor_variable,
            1.0,
        );

        // Assert
        assert_eq!(stats.total_moves, 0);
        assert_eq!(regions, before);
    }

    #[test]
    fn test_swap_never_worsens_objective() {
        // Arrange
        let graph = Graph::from_edge_list(
            6,
            &[(0, 1), (1, 2), (3, 4), (4, 5), (0, 3), (1, 4), (2, 5)],
        );
        let attributes = one_column(&[0.0, 1.0, 8.0, 1.0, 9.0, 10.0]);
        let floor_variable = [1.0; 6];
        let (mut regions, mut area_to_region) = partition(&[0, 0, 0, 1, 1, 1], 2);
        let before = partition_ssd(&regions, &attributes);

        // Act
        swap_refine(
            &mut regions,
            &mut area_to_region,
            &graph,
            &attributes,
            &floor_variable,
            2.0,
        );

        // Assert
        let after = partition_ssd(&regions, &attributes);
        assert!(after <= before);
        for (region_id, region) in regions.iter().enumerate() {
            for &member in region {
                assert_eq!(area_to_region[&member], region_id);
            }
        }
    }
}
