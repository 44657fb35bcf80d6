use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator as _;

/// Sum of squared deviations from the mean of `values`.
///
/// Computed in two passes (mean, then deviations). Empty input scores 0.
pub fn sum_of_squares(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|value| (value - mean) * (value - mean)).sum()
}

/// Within sum of squared deviations of one region: for every attribute
/// column, the squared deviations of the member rows from the region mean.
pub fn region_ssd(region: &[usize], attributes: &[Vec<f64>]) -> f64 {
    if region.is_empty() {
        return 0.0;
    }
    let num_vars = attributes[region[0]].len();
    let mut wss = 0.0;
    for m in 0..num_vars {
        let selected: Vec<f64> = region.iter().map(|&area| attributes[area][m]).collect();
        wss += sum_of_squares(&selected);
    }
    wss
}

/// Objective of a whole partition: the sum of every region's within sum of
/// squares. Regions are scored in parallel; the final sum runs in region
/// order so identical partitions always round identically.
pub fn partition_ssd(regions: &[Vec<usize>], attributes: &[Vec<f64>]) -> f64 {
    let scores: Vec<f64> = regions
        .par_iter()
        .map(|region| region_ssd(region, attributes))
        .collect();
    scores.iter().sum()
}

/// Change in the total objective if `area` leaves `donor` and joins
/// `recipient`. Negative values are improvements.
pub fn move_change(
    area: usize,
    recipient: &[usize],
    donor: &[usize],
    attributes: &[Vec<f64>],
) -> f64 {
    let current = region_ssd(recipient, attributes) + region_ssd(donor, attributes);

    let num_vars = attributes[area].len();
    let mut moved = 0.0;
    for m in 0..num_vars {
        let shrunk: Vec<f64> = donor
            .iter()
            .filter(|&&member| member != area)
            .map(|&member| attributes[member][m])
            .collect();
        moved += sum_of_squares(&shrunk);

        let mut grown: Vec<f64> = recipient.iter().map(|&member| attributes[member][m]).collect();
        grown.push(attributes[area][m]);
        moved += sum_of_squares(&grown);
    }

    moved - current
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use super::*;

    fn one_column(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn test_sum_of_squares() {
        // Arrange
        let values = [2.0, 4.0, 6.0];

        // Act
        let ssd = sum_of_squares(&values);

        // Assert
        assert_relative_eq!(ssd, 8.0);
        assert_relative_eq!(sum_of_squares(&[]), 0.0);
        assert_relative_eq!(sum_of_squares(&[5.0]), 0.0);
    }

    #[test]
    fn test_sum_of_squares_permutation_invariant() {
        // Arrange
        let forward = [1.0, 3.0, 7.0, 2.0];
        let shuffled = [7.0, 2.0, 1.0, 3.0];

        // Act and Assert
        assert_relative_eq!(sum_of_squares(&forward), sum_of_squares(&shuffled));
    }

    #[test]
    fn test_region_ssd_sums_attribute_columns() {
        // Arrange
        let attributes = vec![
            vec![2.0, 1.0],
            vec![4.0, 1.0],
            vec![6.0, 1.0],
        ];
        let region = [0, 1, 2];

        // Act
        let wss = region_ssd(&region, &attributes);

        // Assert
        // first column contributes 8, the constant column contributes 0
        assert_relative_eq!(wss, 8.0);
    }

    #[test]
    fn test_partition_ssd_is_sum_of_regions() {
        // Arrange
        let attributes = one_column(&[0.0, 0.0, 10.0, 10.0, 5.0]);
        let regions = vec![vec![0, 1], vec![2, 3], vec![4]];

        // Act
        let total = partition_ssd(&regions, &attributes);

        // Assert
        let by_hand: f64 = regions.iter().map(|r| region_ssd(r, &attributes)).sum();
        assert_relative_eq!(total, by_hand);
        assert_relative_eq!(total, 0.0);
    }

    #[test]
    fn test_move_change_matches_recomputation() {
        // Arrange
        let attributes = one_column(&[0.0, 1.0, 9.0, 10.0]);
        let recipient = vec![2, 3];
        let donor = vec![0, 1];

        // Act
        let change = move_change(1, &recipient, &donor, &attributes);

        // Assert
        let before = region_ssd(&recipient, &attributes) + region_ssd(&donor, &attributes);
        let after = region_ssd(&[2, 3, 1], &attributes) + region_ssd(&[0], &attributes);
        assert_relative_eq!(change, after - before, max_relative = 1e-9);
    }

    #[test]
    fn test_move_change_sign() {
        // Arrange
        // area 2 sits with the low cluster but belongs with the high one
        let attributes = one_column(&[0.0, 0.0, 10.0, 10.0, 10.0]);
        let donor = vec![0, 1, 2];
        let recipient = vec![3, 4];

        // Act
        let improving = move_change(2, &recipient, &donor, &attributes);
        let worsening = move_change(3, &donor, &recipient, &attributes);

        // Assert
        assert!(improving < 0.0);
        assert!(worsening > 0.0);
    }
}
