use num_traits::Zero;
use std::ops::AddAssign;

// Calculates the total floor contribution of each region of a given
// assignment.
pub fn compute_region_floors<W>(assignment: &[usize], num_regions: usize, floor_variable: W) -> Vec<W::Item>
where
    W: IntoIterator,
    W::Item: Zero + Clone + AddAssign,
{
    let mut totals = vec![W::Item::zero(); num_regions];

    for (&region, contribution) in assignment.iter().zip(floor_variable.into_iter()) {
        if region < num_regions {
            totals[region] += contribution;
        }
    }

    totals
}

/// Whether the region meets the floor.
pub fn check_floor(region: &[usize], floor_variable: &[f64], floor: f64) -> bool {
    let mut cv = 0.0;
    for &area in region {
        cv += floor_variable[area];
    }
    cv >= floor
}

/// Whether the region still meets the floor once `leaver` is removed.
pub fn check_floor_excluding(region: &[usize], leaver: usize, floor_variable: &[f64], floor: f64) -> bool {
    let mut cv = 0.0;
    for &area in region {
        if area == leaver {
            continue;
        }
        cv += floor_variable[area];
    }
    cv >= floor
}

#[cfg(test)]
mod tests {
    use approx::assert_ulps_eq;
    use super::*;

    #[test]
    fn test_compute_region_floors() {
        // Arrange
        let assignment = [0, 0, 1, 1];
        let floor_variable = [4.0, 7.0, 5.0, 2.0];
        let num_regions = 2;

        // Act
        let totals = compute_region_floors(&assignment, num_regions, floor_variable);

        // Assert
        assert_ulps_eq!(totals[0], 11.0);
        assert_ulps_eq!(totals[1], 7.0);
    }

    #[test]
    fn test_check_floor() {
        // Arrange
        let floor_variable = [3.0, 3.0, 2.0];

        // Act and Assert
        assert!(check_floor(&[0, 1], &floor_variable, 6.0));
        assert!(!check_floor(&[0, 2], &floor_variable, 6.0));
    }

    #[test]
    fn test_check_floor_excluding() {
        // Arrange
        let floor_variable = [3.0, 3.0, 2.0];

        // Act and Assert
        assert!(check_floor_excluding(&[0, 1, 2], 2, &floor_variable, 6.0));
        assert!(!check_floor_excluding(&[0, 1, 2], 1, &floor_variable, 6.0));
        // a region reduced to nothing cannot meet a positive floor
        assert!(!check_floor_excluding(&[1], 1, &floor_variable, 1.0));
    }
}
