use rstest::rstest;
use rref::{reduce, reduce_with, replay, Matrix, PivotPolicy, ReduceConfig, DEFAULT_TOLERANCE};

const TOLERANCE: f64 = 1e-12;

fn reduce_vec(input: &[Vec<f64>], pivot: PivotPolicy) -> Matrix {
    let config = ReduceConfig::new(pivot, DEFAULT_TOLERANCE).unwrap();
    let m = Matrix::from_vec(input);
    let result = reduce_with(m.clone(), true, &config).unwrap();
    assert_eq!(replay(m, result.log.as_ref().unwrap()).unwrap(), result.matrix);
    result.matrix
}

fn leading_entries(m: &Matrix) -> Vec<Option<usize>> {
    (0..m.rows())
        .map(|i| m.leading_entry(i, TOLERANCE))
        .collect()
}

#[rstest]
#[case(vec![vec![2., 4., 2.], vec![3., 6., 3.]], vec![vec![1., 2., 1.], vec![0., 0., 0.]])]
#[case(
    vec![vec![1., 2., 3., 8.], vec![1., 3., 3., 10.], vec![1., 2., 4., 9.]],
    vec![vec![1., 0., 0., 1.], vec![0., 1., 0., 2.], vec![0., 0., 1., 1.]]
)]
#[case(
    vec![vec![1., 1., 1.], vec![2., -1., 5.], vec![3., 4., 2.]],
    vec![vec![1., 0., 2.], vec![0., 1., -1.], vec![0., 0., 0.]]
)]
#[case(vec![vec![2., 4., 6.]], vec![vec![1., 2., 3.]])]
#[case(vec![vec![0.], vec![-7.]], vec![vec![1.], vec![0.]])]
fn reduces_to(
    #[case] input: Vec<Vec<f64>>,
    #[case] expected: Vec<Vec<f64>>,
    #[values(PivotPolicy::FirstNonzero, PivotPolicy::LargestMagnitude)] pivot: PivotPolicy,
) {
    let result = reduce_vec(&input, pivot);
    assert!(
        result.approx_eq(&Matrix::from_vec(&expected), TOLERANCE),
        "{result}"
    );
}

#[rstest]
fn two_pivots(
    #[values(PivotPolicy::FirstNonzero, PivotPolicy::LargestMagnitude)] pivot: PivotPolicy,
) {
    let result = reduce_vec(&[vec![1., 1., 0., 3.], vec![2., 3., 4., 2.]], pivot);
    assert!(result.is_rref(TOLERANCE));
    assert_eq!(leading_entries(&result), vec![Some(0), Some(1)]);
}

#[rstest]
fn zero_row_moves_to_bottom(
    #[values(PivotPolicy::FirstNonzero, PivotPolicy::LargestMagnitude)] pivot: PivotPolicy,
) {
    let result = reduce_vec(
        &[vec![1., 1., 1.], vec![2., 2., 2.], vec![3., 4., 2.]],
        pivot,
    );
    assert!(result.is_rref(TOLERANCE));
    assert_eq!(leading_entries(&result), vec![Some(0), Some(1), None]);
}

#[test]
fn free_columns_are_skipped() {
    // The second and third columns are multiples of the first.
    let result = reduce_vec(
        &[
            vec![3., 6., 9., 5., 25., 53.],
            vec![7., 14., 21., 9., 53., 105.],
            vec![-4., -8., -12., 5., 10., 11.],
        ],
        PivotPolicy::LargestMagnitude,
    );
    assert!(result.is_rref(1e-9));
    assert_eq!(leading_entries(&result), vec![Some(0), Some(3), Some(4)]);
    assert!((result.entry(0, 1) - 2.).abs() < 1e-9);
    assert!((result.entry(0, 2) - 3.).abs() < 1e-9);
}

#[rstest]
fn large_entries_leave_no_residue_pivot(
    #[values(PivotPolicy::FirstNonzero, PivotPolicy::LargestMagnitude)] pivot: PivotPolicy,
) {
    // Rank 1: the second row is the first scaled by 1000004 / 1000005.
    let input = [vec![1000005., 2000010.], vec![1000004., 2000008.]];
    let config = ReduceConfig::new(pivot, DEFAULT_TOLERANCE).unwrap();
    let m = Matrix::from_vec(&input);
    let result = reduce_with(m.clone(), true, &config).unwrap();
    assert_eq!(replay(m, result.log.as_ref().unwrap()).unwrap(), result.matrix);

    assert!(result.matrix.is_rref(result.threshold), "{}", result.matrix);
    assert!(result
        .matrix
        .approx_eq(&Matrix::from_vec(&[vec![1., 2.], vec![0., 0.]]), 1e-6));
    assert_eq!(result.matrix.leading_entry(0, result.threshold), Some(0));
    assert!(result.matrix.is_zero_row(1, result.threshold));
}

#[test]
fn wide_matrix() {
    let input = [
        vec![4., 3., 2., -1., 4.],
        vec![5., 4., 3., -1., 4.],
        vec![-2., -2., -1., 2., -3.],
        vec![11., 6., 4., 1., 11.],
    ];
    let first = reduce_vec(&input, PivotPolicy::FirstNonzero);
    let largest = reduce_vec(&input, PivotPolicy::LargestMagnitude);
    assert!(largest.is_rref(1e-9));
    assert!(first.approx_eq(&largest, 1e-9));
}

#[test]
fn input_is_not_aliased() {
    let input = vec![vec![2., 4.], vec![1., 3.]];
    let m = Matrix::from_vec(&input);
    let result = reduce(m, false).unwrap();
    assert_eq!(input, vec![vec![2., 4.], vec![1., 3.]]);
    assert_eq!(result.matrix.to_vec(), vec![vec![1., 0.], vec![0., 1.]]);
}
