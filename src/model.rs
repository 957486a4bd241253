//! Deterministic K-Means clustering over normalized feature matrices

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fitted K-Means model
#[derive(Debug, Clone)]
pub struct KMeansModel {
    /// Number of clusters
    pub n_clusters: usize,
    /// Cluster assignments for training data
    pub labels: Array1<usize>,
    /// Cluster centroids in normalized space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares (inertia)
    pub inertia: f64,
}

impl KMeansModel {
    /// Predict cluster for a new normalized data point
    pub fn predict(&self, features: &Array1<f64>) -> crate::Result<usize> {
        if features.len() != self.centroids.ncols() {
            anyhow::bail!(
                "feature vector must have exactly {} dimensions, got {}",
                self.centroids.ncols(),
                features.len()
            );
        }
        Ok(nearest_centroid(&features.view(), &self.centroids))
    }

    /// Get cluster sizes
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

/// Fit K-Means on a normalized feature matrix
///
/// Centroids are initialized by sampling `n_clusters` distinct rows with a
/// generator seeded from `seed`, so identical inputs always produce identical
/// labels and centroids. The loop runs for exactly `iterations` rounds with
/// no convergence check; a cluster that loses all its members keeps its
/// previous centroid.
///
/// # Arguments
/// * `features` - Normalized feature matrix (n_students, n_features)
/// * `n_clusters` - Number of clusters (5 matches the persona set)
/// * `iterations` - Fixed number of assignment/update rounds
/// * `seed` - Seed for centroid initialization
///
/// # Returns
/// * Fitted `KMeansModel` with labels, centroids, and inertia
pub fn fit_kmeans(
    features: &Array2<f64>,
    n_clusters: usize,
    iterations: usize,
    seed: u64,
) -> crate::Result<KMeansModel> {
    if !(2..=8).contains(&n_clusters) {
        anyhow::bail!(
            "number of clusters should be between 2 and 8 for meaningful personas, got {}",
            n_clusters
        );
    }

    let n_samples = features.nrows();
    if n_samples < n_clusters {
        anyhow::bail!(
            "number of data points ({}) must be at least equal to number of clusters ({})",
            n_samples,
            n_clusters
        );
    }

    let n_features = features.ncols();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = Array2::<f64>::zeros((n_clusters, n_features));
    let sampled = rand::seq::index::sample(&mut rng, n_samples, n_clusters);
    for (cluster, row_idx) in sampled.into_iter().enumerate() {
        centroids.row_mut(cluster).assign(&features.row(row_idx));
    }

    let mut labels = Array1::<usize>::zeros(n_samples);
    for _ in 0..iterations {
        // Assignment step: ties go to the lowest centroid index
        for (i, point) in features.outer_iter().enumerate() {
            labels[i] = nearest_centroid(&point, &centroids);
        }

        // Update step: coordinate-wise member means
        let mut sums = Array2::<f64>::zeros((n_clusters, n_features));
        let mut counts = vec![0usize; n_clusters];
        for (i, point) in features.outer_iter().enumerate() {
            let mut row = sums.row_mut(labels[i]);
            row += &point;
            counts[labels[i]] += 1;
        }
        for cluster in 0..n_clusters {
            if counts[cluster] > 0 {
                let mut row = sums.row_mut(cluster);
                row /= counts[cluster] as f64;
                centroids.row_mut(cluster).assign(&row);
            }
            // Empty cluster keeps its previous centroid
        }
    }

    let inertia = compute_inertia(features, &labels, &centroids);

    Ok(KMeansModel {
        n_clusters,
        labels,
        centroids,
        inertia,
    })
}

/// Index of the nearest centroid; the first minimum wins on ties
pub(crate) fn nearest_centroid(point: &ArrayView1<f64>, centroids: &Array2<f64>) -> usize {
    let mut closest_cluster = 0;
    let mut min_distance = f64::INFINITY;
    for (cluster_idx, centroid) in centroids.outer_iter().enumerate() {
        let distance = euclidean_distance(point, &centroid);
        if distance < min_distance {
            min_distance = distance;
            closest_cluster = cluster_idx;
        }
    }
    closest_cluster
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;

    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let point = features.row(i);
            let centroid = centroids.row(cluster);
            let distance_sq = point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
            inertia += distance_sq;
        }
    }

    inertia
}

/// Calculate Euclidean distance between two points
pub(crate) fn euclidean_distance(point1: &ArrayView1<f64>, point2: &ArrayView1<f64>) -> f64 {
    point1
        .iter()
        .zip(point2.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blob_features() -> Array2<f64> {
        // Two well-separated groups in [0, 1] space
        Array2::from_shape_vec(
            (8, 2),
            vec![
                0.05, 0.10, //
                0.10, 0.05, //
                0.00, 0.00, //
                0.08, 0.12, //
                0.90, 0.95, //
                0.95, 0.85, //
                1.00, 1.00, //
                0.88, 0.92, //
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_kmeans() {
        let features = two_blob_features();
        let model = fit_kmeans(&features, 2, 40, 42).unwrap();

        assert_eq!(model.n_clusters, 2);
        assert_eq!(model.labels.len(), 8);
        assert_eq!(model.centroids.shape(), &[2, 2]);
        assert!(model.inertia >= 0.0 && model.inertia.is_finite());

        // The two blobs end up in different clusters
        assert_eq!(model.labels[0], model.labels[1]);
        assert_eq!(model.labels[4], model.labels[5]);
        assert_ne!(model.labels[0], model.labels[4]);
    }

    #[test]
    fn test_deterministic_given_seed() {
        let features = two_blob_features();
        let a = fit_kmeans(&features, 3, 40, 42).unwrap();
        let b = fit_kmeans(&features, 3, 40, 42).unwrap();

        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_final_labels_are_fixed_point_of_assignment() {
        let features = two_blob_features();
        let model = fit_kmeans(&features, 2, 40, 42).unwrap();

        for (i, point) in features.outer_iter().enumerate() {
            assert_eq!(nearest_centroid(&point, &model.centroids), model.labels[i]);
        }
    }

    #[test]
    fn test_tie_breaks_to_lowest_centroid_index() {
        let centroids =
            Array2::from_shape_vec((3, 2), vec![0.0, 1.0, 0.0, -1.0, 5.0, 5.0]).unwrap();
        let point = Array1::from(vec![0.0, 0.0]);

        // Equidistant from centroids 0 and 1
        assert_eq!(nearest_centroid(&point.view(), &centroids), 0);
    }

    #[test]
    fn test_duplicate_points_leave_no_empty_cluster_artifacts() {
        // More clusters than distinct values forces an empty cluster; its
        // centroid must stay frozen rather than collapse to NaN
        let features = Array2::from_shape_vec(
            (4, 2),
            vec![0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
        )
        .unwrap();
        let model = fit_kmeans(&features, 3, 40, 42).unwrap();

        assert!(model.centroids.iter().all(|v| v.is_finite()));
        assert!(model.labels.iter().all(|&l| l < 3));
        assert_eq!(model.cluster_sizes().iter().sum::<usize>(), 4);
    }

    #[test]
    fn test_invalid_cluster_count() {
        let features = two_blob_features();

        assert!(fit_kmeans(&features, 1, 40, 42).is_err());
        assert!(fit_kmeans(&features, 9, 40, 42).is_err());
    }

    #[test]
    fn test_insufficient_data() {
        let features = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 1.0, 1.0]).unwrap();
        assert!(fit_kmeans(&features, 3, 40, 42).is_err());
    }

    #[test]
    fn test_predict() {
        let features = two_blob_features();
        let model = fit_kmeans(&features, 2, 40, 42).unwrap();

        let near_first_blob = Array1::from(vec![0.02, 0.03]);
        let cluster = model.predict(&near_first_blob).unwrap();
        assert_eq!(cluster, model.labels[0]);

        assert!(model.predict(&Array1::from(vec![0.5])).is_err());
    }

    #[test]
    fn test_cluster_sizes() {
        let features = two_blob_features();
        let model = fit_kmeans(&features, 2, 40, 42).unwrap();

        let sizes = model.cluster_sizes();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes.iter().sum::<usize>(), 8);
    }
}
