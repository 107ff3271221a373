// Synthetic spindle images: filled ellipses and discs on a noisy background,
// checked end to end against their analytic axis lengths.

#[cfg(test)]
mod tests {
    use crate::analysis::analyze_image;
    use crate::commands::run_measure;
    use crate::config::AnalysisConfig;
    use crate::export::{csv_path, read_dataset_csv, SUMMARY_FILE};
    use crate::image_io::GrayImage;
    use image::{ImageBuffer, Luma};
    use rand::prelude::*;
    use std::f64::consts::FRAC_PI_4;
    use std::path::Path;

    const BACKGROUND: f64 = 500.0;
    const SPINDLE: f64 = 3000.0;
    const NOISE: f64 = 200.0;

    /// Ellipse with semi-axis `a` along `angle` (radians from the row axis)
    /// and semi-axis `b` across it.
    #[derive(Debug, Clone, Copy)]
    struct SyntheticSpindle {
        row: f64,
        col: f64,
        a: f64,
        b: f64,
        angle: f64,
    }

    impl SyntheticSpindle {
        fn contains(&self, r: usize, c: usize) -> bool {
            let (dr, dc) = (r as f64 - self.row, c as f64 - self.col);
            let u = dr * self.angle.cos() + dc * self.angle.sin();
            let v = -dr * self.angle.sin() + dc * self.angle.cos();
            (u / self.a).powi(2) + (v / self.b).powi(2) <= 1.0
        }
    }

    fn render(width: usize, height: usize, spindles: &[SyntheticSpindle], seed: u64) -> Vec<u16> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..width * height)
            .map(|i| {
                let (r, c) = (i / width, i % width);
                let level = if spindles.iter().any(|s| s.contains(r, c)) {
                    SPINDLE
                } else {
                    BACKGROUND
                };
                let noise = (rng.gen::<f64>() - 0.5) * NOISE;
                (level + noise).clamp(0.0, 65535.0) as u16
            })
            .collect()
    }

    fn synthetic_image(width: usize, height: usize, spindles: &[SyntheticSpindle], seed: u64) -> GrayImage {
        GrayImage::new(width, height, 16, render(width, height, spindles, seed)).unwrap()
    }

    fn save_png(path: &Path, width: usize, height: usize, spindles: &[SyntheticSpindle], seed: u64) {
        let data = render(width, height, spindles, seed);
        ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width as u32, height as u32, data)
            .unwrap()
            .save(path)
            .unwrap();
    }

    fn small_config(min_region_area: usize) -> AnalysisConfig {
        AnalysisConfig {
            min_region_area,
            ..Default::default()
        }
    }

    #[test]
    fn test_axis_aligned_ellipse() {
        let spindle = SyntheticSpindle {
            row: 70.0,
            col: 60.0,
            a: 40.0,
            b: 20.0,
            angle: 0.0,
        };
        let image = synthetic_image(120, 140, &[spindle], 1);
        let analysis = analyze_image(&image, "ellipse.tif", &small_config(1000)).unwrap();

        assert_eq!(analysis.kept.len(), 1);
        let region = &analysis.kept[0];
        assert!((region.major_axis_length - 80.0).abs() < 1.5, "major {}", region.major_axis_length);
        assert!((region.minor_axis_length - 40.0).abs() < 1.5, "minor {}", region.minor_axis_length);
        assert!(region.orientation.abs() < 1e-9);
        assert!((region.y0 - 70.0).abs() < 1e-9);
        assert!((region.x0 - 60.0).abs() < 1e-9);

        let m = &analysis.measurements[0];
        assert!((m.major_axis_length - region.major_axis_length * 0.105).abs() < 1e-12);
    }

    #[test]
    fn test_rotated_ellipse_orientation() {
        let angle = std::f64::consts::PI / 6.0;
        let spindle = SyntheticSpindle {
            row: 80.0,
            col: 80.0,
            a: 45.0,
            b: 15.0,
            angle,
        };
        let image = synthetic_image(160, 160, &[spindle], 2);
        let analysis = analyze_image(&image, "tilted.tif", &small_config(1000)).unwrap();

        assert_eq!(analysis.kept.len(), 1);
        let region = &analysis.kept[0];
        assert!((region.orientation - angle).abs() < 0.02, "orientation {}", region.orientation);
        assert!((region.major_axis_length - 90.0).abs() < 2.0);
        assert!((region.minor_axis_length - 30.0).abs() < 2.0);

        // The major endpoint sits half a major axis away from the centroid.
        let axes = analysis.measurements[0].axes;
        let half = ((axes.major_end.x - axes.centroid.x).powi(2)
            + (axes.major_end.y - axes.centroid.y).powi(2))
        .sqrt();
        assert!((half - region.major_axis_length / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_disc_has_equal_axes() {
        let disc = SyntheticSpindle {
            row: 50.0,
            col: 50.0,
            a: 25.0,
            b: 25.0,
            angle: 0.0,
        };
        let image = synthetic_image(100, 100, &[disc], 3);
        let analysis = analyze_image(&image, "disc.tif", &small_config(1000)).unwrap();

        let region = &analysis.kept[0];
        assert!((region.major_axis_length - region.minor_axis_length).abs() < 1e-6);
        // Symmetric disc: mu_rc == 0, so the tie-break gives -pi/4.
        assert_eq!(region.orientation, -FRAC_PI_4);
    }

    #[test]
    fn test_small_debris_is_ignored() {
        let spindle = SyntheticSpindle {
            row: 60.0,
            col: 50.0,
            a: 40.0,
            b: 20.0,
            angle: 0.0,
        };
        let debris = SyntheticSpindle {
            row: 10.0,
            col: 110.0,
            a: 5.0,
            b: 5.0,
            angle: 0.0,
        };
        let image = synthetic_image(130, 120, &[spindle, debris], 4);
        let analysis = analyze_image(&image, "cell.tif", &small_config(1000)).unwrap();

        assert_eq!(analysis.regions_found, 2);
        assert_eq!(analysis.kept.len(), 1);
        assert!((analysis.kept[0].y0 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_dataset_run() {
        let root = tempfile::tempdir().unwrap();
        let datasets = [("ctrl", 40.0, 20.0), ("p50", 30.0, 15.0)];

        for (d, (name, a, b)) in datasets.iter().enumerate() {
            let dir = root.path().join(name);
            std::fs::create_dir(&dir).unwrap();
            for i in 0..3 {
                let spindle = SyntheticSpindle {
                    row: 60.0,
                    col: 60.0,
                    a: a + i as f64,
                    b: *b,
                    angle: 0.0,
                };
                let debris = SyntheticSpindle {
                    row: 12.0,
                    col: 105.0,
                    a: 6.0,
                    b: 6.0,
                    angle: 0.0,
                };
                let seed = (d * 10 + i) as u64;
                save_png(&dir.join(format!("cell{}.png", i)), 120, 120, &[spindle, debris], seed);
            }
        }

        let config = AnalysisConfig {
            data_root: root.path().to_path_buf(),
            output_dir: root.path().join("output"),
            datasets: vec!["ctrl".to_string(), "p50".to_string()],
            min_region_area: 1000,
            ..Default::default()
        };
        let summary = run_measure(&config).unwrap();

        assert_eq!(summary.major.counts, vec![3, 3]);
        assert!(summary.major.means[0] > summary.major.means[1]);
        assert!((summary.major.means[0] - 82.0 * 0.105).abs() < 0.2);
        assert!(summary.major.welch.unwrap().p_value < 0.05);

        let out = &config.output_dir;
        let (majors, minors) = read_dataset_csv(&csv_path(out, "ctrl")).unwrap();
        assert_eq!(majors.len(), 3);
        assert!(majors.iter().zip(&minors).all(|(major, minor)| major >= minor));

        let stats = std::fs::read_to_string(out.join(SUMMARY_FILE)).unwrap();
        assert!(stats.contains("p_major"));
        assert!(out.join("ctrl/masks/cell0.png").exists());
        assert!(out.join("p50/axes/cell2.png").exists());
        assert!(out.join("AxisLength_Major.png").exists());
        assert!(out.join("AxisLength_MinorvsMajor.png").exists());
    }
}
