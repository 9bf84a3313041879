//! Figures of merit: data fidelity and image quality measures.

use crate::{
    Result,
    types::{Intensityf32, Lengthf32, Ratiof32, Sumf64},
    image::{Image, ImageData},
    projection::ProjectionData,
    field::Field,
};

/// Poisson log-likelihood of `acquired` counts given expected counts
/// `projected`, up to a constant: `Σ y ln(p) - p`.
///
/// Bins with `y == 0` contribute `-p`; a bin with `y > 0` but `p <= 0` makes
/// the data impossible, giving `-inf`.
pub fn poisson_log_likelihood(acquired: &ProjectionData, projected: &ProjectionData) -> Result<Sumf64> {
    acquired.check_same_shape(projected)?;
    Ok(acquired.data.iter().zip(&projected.data)
       .map(|(&y, &p)| {
           let (y, p) = (y as Sumf64, p as Sumf64);
           if      y == 0.0 { -p }
           else if p <= 0.0 { Sumf64::NEG_INFINITY }
           else             { y * p.ln() - p }
       })
       .sum())
}

/// Region of interest
#[derive(Clone, Debug, PartialEq)]
pub enum Roi {
    Sphere((Lengthf32, Lengthf32, Lengthf32), Lengthf32),
    /// Infinite cylinder parallel to the z-axis
    CylinderZ((Lengthf32, Lengthf32), Lengthf32),
}

impl Roi {
    pub fn contains(&self, [x, y, z]: [Lengthf32; 3]) -> bool {
        match *self {
            Roi::Sphere((cx, cy, cz), r) => {
                let (x, y, z) = (x - cx, y - cy, z - cz);
                x*x + y*y + z*z < r*r
            }
            Roi::CylinderZ((cx, cy), r) => {
                let (x, y) = (x - cx, y - cy);
                x*x + y*y < r*r
            }
        }
    }
}

fn mean(data: &[Intensityf32]) -> Option<Intensityf32> {
    if data.is_empty() { return None }
    Some((data.iter().map(|&x| x as Sumf64).sum::<Sumf64>() / data.len() as Sumf64) as Intensityf32)
}

impl Image {

    /// Values of all voxels whose centres lie inside `roi`
    pub fn values_inside_roi(&self, roi: &Roi) -> ImageData {
        self.data.iter().copied().enumerate()
            .filter(|&(i, _)| roi.contains(self.grid.voxel_centre1(i)))
            .map(|(_, value)| value)
            .collect()
    }

    /// `None` if no voxel centre lies inside `roi`
    pub fn mean_in_roi(&self, roi: &Roi) -> Option<Intensityf32> {
        mean(&self.values_inside_roi(roi))
    }

    /// Contrast recovery coefficient of each `(roi, true activity)` pair,
    /// relative to the mean of the `background_rois`. `None` if any ROI
    /// contains no voxels.
    pub fn crcs(
        &self,
        rois           : &[(Roi, Intensityf32)],
        background_rois: &[Roi],
        background_activity: Intensityf32,
    ) -> Option<Vec<Ratiof32>> {
        let background_means = background_rois.iter()
            .map(|roi| self.mean_in_roi(roi))
            .collect::<Option<Vec<_>>>()?;
        let background_measured = mean(&background_means)?;

        rois.iter().map(|(roi, roi_activity)| {
            let roi_measured = self.mean_in_roi(roi)?;
            Some(((roi_measured / background_measured) - 1.0) /
                 ((roi_activity / background_activity) - 1.0))
        }).collect()
    }
}


#[cfg(test)]
mod test_in_roi {
    use super::*;
    use crate::ImageGrid;
    use rstest::rstest;

    // Arrange for outer voxels to be centred at +/- 100.0, when n = 10
    const MAGIC: Lengthf32 = 10.0 / 9.0 * 200.0;

    fn uniform(l: Lengthf32, n: usize) -> Image {
        Image::ones(ImageGrid::new((l, l, l), (n, n, n)).unwrap())
    }

    #[rstest(/**/  n,        centre        ,    r , expected_len,
             case(10, (  0.0,   0.0,   0.0), 173.3, 1000), // r > sqrt(3) * 100: every centre inside
             case(10, (  0.0,   0.0,   0.0), 173.2,  992), // r < sqrt(3) * 100: 8 corners missing
             case( 9, (  0.0,   0.0,   0.0), 173.2,  729), // coarser grid: outer centres closer in
             case(10, (100.0, 100.0, 100.0),   1.0,    1), // a single corner voxel
             case(10, (200.0, 200.0, 200.0), 173.2,    0), // just misses the corner
    )]
    fn voxels_inside_sphere(n: usize, centre: (Lengthf32, Lengthf32, Lengthf32), r: Lengthf32, expected_len: usize) {
        let inside = uniform(MAGIC, n).values_inside_roi(&Roi::Sphere(centre, r));
        assert_eq!(inside.len(), expected_len);
    }

    #[rstest(/**/  n,     centre    ,    r , expected_len,
             case(10, (  0.0,   0.0), 141.5, 1000), // r > sqrt(2) * 100
             case(10, (  0.0,   0.0), 141.4,  960), // 4 columns of n voxels missing
             case(10, (200.0, 200.0), 141.5,   10), // one column at a corner
             case(10, (200.0, 200.0), 141.4,    0),
    )]
    fn voxels_inside_z_cylinder(n: usize, centre: (Lengthf32, Lengthf32), r: Lengthf32, expected_len: usize) {
        let inside = uniform(MAGIC, n).values_inside_roi(&Roi::CylinderZ(centre, r));
        assert_eq!(inside.len(), expected_len);
    }

    #[test]
    fn perfect_image_has_unit_crcs() {
        let grid = ImageGrid::new((100.0, 100.0, 10.0), (50, 50, 1)).unwrap();
        let hot  = Roi::CylinderZ(( 20.0, 0.0), 8.0);
        let cold = Roi::CylinderZ((-20.0, 0.0), 8.0);
        let bg   = Roi::CylinderZ((0.0, 30.0), 8.0);
        let mut image = Image::uniform(grid, 1.0);
        for i in 0..image.data.len() {
            let p = grid.voxel_centre1(i);
            if hot .contains(p) { image[i] = 4.0 }
            if cold.contains(p) { image[i] = 0.0 }
        }
        let crcs = image.crcs(&[(hot, 4.0), (cold, 0.0)], &[bg], 1.0).unwrap();
        assert_eq!(crcs, vec![1.0, 1.0]);
    }

    #[test]
    fn empty_roi_gives_no_crc() {
        let image = uniform(10.0, 2);
        let nowhere = Roi::Sphere((100.0, 100.0, 100.0), 1.0);
        assert_eq!(image.mean_in_roi(&nowhere), None);
        assert_eq!(image.crcs(&[(nowhere.clone(), 2.0)], &[nowhere], 1.0), None);
    }
}
