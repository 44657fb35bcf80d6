use rand::{Rng};

/// Generate a floor-variable vector where each area contributes the same amount
pub fn gen_uniform_floor_variable(num_areas: usize) -> Vec<f64> {
    vec![1.0; num_areas]
}

/// Generate a random attribute matrix with `num_vars` columns per area
pub fn gen_random_attributes(num_areas: usize, num_vars: usize, min_value: f64, max_value: f64) -> Vec<Vec<f64>> {
    if max_value < min_value {
        panic!("Max value must be greater than min value.");
    }

    let mut rng = rand::thread_rng();

    let attributes: Vec<Vec<f64>> = (0..num_areas)
        .map(|_| (0..num_vars).map(|_| rng.gen_range(min_value..max_value)).collect())
        .collect();

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_attributes_shape_and_range() {
        // Act
        let attributes = gen_random_attributes(6, 3, -1.0, 1.0);

        // Assert
        assert_eq!(attributes.len(), 6);
        for row in &attributes {
            assert_eq!(row.len(), 3);
            assert!(row.iter().all(|v| (-1.0..1.0).contains(v)));
        }
    }
}
