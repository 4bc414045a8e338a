pub mod buffer;
pub mod general;


#[cfg(test)]
mod general_tests {
    use crate::general::{argsort, is_permutation, lin_interp, SortOrder};
    use approx::assert_ulps_eq;

    #[test]
    fn test_argsort_1() {
        let x: Vec<i32> = vec![3, -1, 5, 8, -2];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![4, 1, 0, 2, 3]);
    }
    #[test]
    fn test_argsort_2() {
        let x: Vec<f64> = vec![3.0, -1.0, 5.0, 8.0, -2.0];
        assert_eq!(argsort(&x, SortOrder::Descending), vec![3, 2, 0, 1, 4]);
    }
    #[test]
    fn test_argsort_stable() {
        let x: Vec<f64> = vec![1.0, 2.0, 1.0, 2.0];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![0, 2, 1, 3]);
        assert_eq!(argsort(&x, SortOrder::Descending), vec![1, 3, 0, 2]);
    }
    #[test]
    fn test_argsort_tuples() {
        let x: Vec<(u8, f64)> = vec![(1, -3.0), (0, 5.0), (1, -7.0)];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![1, 2, 0]);
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 3, 1]));
        assert!(is_permutation(&[]));
        assert!(!is_permutation(&[1, 1, 3]));
        assert!(!is_permutation(&[0, 1, 2]));
        assert!(!is_permutation(&[1, 2, 4]));
    }

    #[test]
    fn test_lin_interp_1() {
        let xp: Vec<f64> = vec![-5.0, 0.0, 5.0, 10.0];
        let fp: Vec<f64> = vec![1.0, 2.0, 1.0, 0.0];
        assert_ulps_eq!(lin_interp(-2.5, &xp, &fp), 1.5);
    }
    #[test]
    fn test_lin_interp_2() {
        let xp: Vec<f64> = vec![-5.0, 0.0, 5.0, 10.0];
        let fp: Vec<f64> = vec![1.0, 2.0, 1.0, 0.0];
        assert_ulps_eq!(lin_interp(7.5, &xp, &fp), 0.5);
    }
    #[test]
    fn test_lin_interp_clamped() {
        let xp: Vec<f64> = vec![0.0, 10.0];
        let fp: Vec<f64> = vec![1.0, 2.0];
        assert_ulps_eq!(lin_interp(-4.0, &xp, &fp), 1.0);
        assert_ulps_eq!(lin_interp(40.0, &xp, &fp), 2.0);
    }
}
