//! Index types and conversion between flat and 3-D voxel indices.
//!
//! Flat indices run fastest along `x`, then `y`, then `z`.

#[allow(non_camel_case_types)] pub type Index1_u = usize;
#[allow(non_camel_case_types)] pub type Index3_u = [usize; 3];
#[allow(non_camel_case_types)] pub type BoxDim_u = [usize; 3];

use std::ops::{Add, Div, Mul, Rem};

pub fn index3_to_1<T>([ix, iy, iz]: [T; 3], [nx, ny, _nz]: [T; 3]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    ix + (iy + iz * ny) * nx
}

#[allow(clippy::many_single_char_names)]
pub fn index1_to_3<T>(i: T, [nx, ny, _nz]: [T; 3]) -> [T; 3]
where
    T: Mul<Output = T> +
    Div<Output = T> +
    Rem<Output = T> +
    Copy
{
    let plane = nx * ny;
    let (z, in_plane) = (i / plane, i % plane);
    [in_plane % nx, in_plane / nx, z]
}

#[cfg(test)]
mod test_index_conversion {
    use super::*;
    use rstest::rstest;

    #[rstest(/**/    size   , index3 , index1,
             case([ 4, 1, 1], [3,0,0],   3),
             case([ 1, 5, 1], [0,2,0],   2),
             case([ 1, 1, 6], [0,0,4],   4),
             // x varies fastest
             case([ 2, 3, 1], [1,0,0],   1),
             case([ 2, 3, 1], [0,1,0],   2),
             case([ 2, 3, 1], [1,2,0],   5),
             case([ 2, 3, 2], [0,0,1],   6),
             case([ 2, 3, 2], [1,2,1],  11),
             // Digits of a decimal number, reversed
             case([10,10,10], [4,5,6], 654),
    )]
    fn known_conversions(size: Index3_u, index3: Index3_u, index1: Index1_u) {
        assert_eq!(index3_to_1(index3, size), index1);
        assert_eq!(index1_to_3(index1, size), index3);
    }

    use proptest::prelude::*;

    // 3-d grid dimensions, with a flat index lying inside that grid
    fn grid_and_flat_index() -> impl Strategy<Value = (Index3_u, Index1_u)> {
        [1..100_usize, 1..100_usize, 1..50_usize]
            .prop_flat_map(|n| (Just(n), 0..(n[0] * n[1] * n[2])))
    }

    proptest! {
        #[test]
        fn flat_index_survives_conversion_to_3d((n, i) in grid_and_flat_index()) {
            let [x, y, z] = index1_to_3(i, n);
            prop_assert!(x < n[0] && y < n[1] && z < n[2]);
            prop_assert_eq!(index3_to_1([x, y, z], n), i);
        }
    }
}
