//! Synthetic activity distributions, for simulation and for testing
//! reconstructions against a known truth.

use std::f32::consts::PI;

use crate::{
    types::{Intensityf32, Lengthf32},
    grid::ImageGrid,
    image::Image,
    fom::Roi,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Phantom {
    /// Region filled with `background` activity; everywhere if `None`
    pub body: Option<Roi>,
    pub background: Intensityf32,
    /// Regions with their own activity. Later features are painted over
    /// earlier ones.
    pub features: Vec<(Roi, Intensityf32)>,
    /// Regions of pure background, used as reference for contrast measurements
    pub background_rois: Vec<Roi>,
}

impl Phantom {

    /// A uniform cylinder containing a ring of six discs of increasing size:
    /// the four smallest hot (4:1), the two largest cold. Dimensions scale with
    /// the transverse size of `grid`.
    pub fn hot_cold_discs(grid: ImageGrid) -> Self {
        let [wx, wy, _] = grid.full_size();
        let scale = wx.min(wy) / 180.0;
        let polar = |r: Lengthf32, phi: f32| (r * phi.cos(), r * phi.sin());

        let step = PI / 6.0;
        let ring = 50.0 * scale;
        let (hot, cold, background) = (4.0, 0.0, 1.0);
        let features = [(4.0, hot), (6.5, hot), (8.5, hot), (11.0, hot), (14.0, cold), (18.5, cold)]
            .into_iter()
            .enumerate()
            .map(|(i, (radius, activity))| {
                let centre = polar(ring, (2 * i + 2) as f32 * step);
                (Roi::CylinderZ(centre, radius * scale), activity)
            })
            .collect();
        let background_rois = (0..6)
            .map(|i| Roi::CylinderZ(polar(ring, (2 * i + 1) as f32 * step), 4.0 * scale))
            .collect();

        Self {
            body: Some(Roi::CylinderZ((0.0, 0.0), 80.0 * scale)),
            background,
            features,
            background_rois,
        }
    }

    /// Sample the phantom at the centre of every voxel of `grid`
    pub fn render(&self, grid: ImageGrid) -> Image {
        let mut image = Image::zeros(grid);
        for (i, voxel) in image.data.iter_mut().enumerate() {
            let p = grid.voxel_centre1(i);
            if self.body.as_ref().map_or(true, |body| body.contains(p)) {
                *voxel = self.background;
            }
            for (roi, activity) in &self.features {
                if roi.contains(p) { *voxel = *activity }
            }
        }
        image
    }

    /// Contrast recovery coefficients of `image` measured in this phantom's
    /// features
    pub fn crcs(&self, image: &Image) -> Option<Vec<f32>> {
        image.crcs(&self.features, &self.background_rois, self.background)
    }
}

#[cfg(test)]
mod test_phantom {
    use super::*;
    use crate::field::Field;

    fn grid() -> ImageGrid { ImageGrid::new((180.0, 180.0, 6.0), (90, 90, 2)).unwrap() }

    #[test]
    fn outside_body_is_empty() {
        let image = Phantom::hot_cold_discs(grid()).render(grid());
        assert_eq!(image[[0, 0, 0]], 0.0);
        assert_eq!(image[[45, 45, 1]], 1.0);
    }

    #[test]
    fn rendered_phantom_recovers_its_own_contrast() {
        let phantom = Phantom::hot_cold_discs(grid());
        let crcs = phantom.crcs(&phantom.render(grid())).unwrap();
        assert_eq!(crcs, vec![1.0; 6]);
    }

    #[test]
    fn features_overwrite_background() {
        let g = ImageGrid::new((4.0, 4.0, 1.0), (4, 4, 1)).unwrap();
        let phantom = Phantom {
            body: None,
            background: 2.0,
            features: vec![(Roi::CylinderZ((-0.5, -0.5), 0.4), 7.0)],
            background_rois: vec![],
        };
        let image = phantom.render(g);
        assert_eq!(image[[1, 1, 0]], 7.0);
        assert_eq!(image.sum(), 15.0 * 2.0 + 7.0);
    }
}
