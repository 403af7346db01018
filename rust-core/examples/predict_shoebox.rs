/// Example predicting the shoebox of a single reflection
///
/// Sets up a simple rotation experiment, predicts the bounding box, mask and profile of
/// one reflection and prints a slice of each through the centroid frame.
use nalgebra::{Matrix3, Vector2, Vector3};

use nave_profile::config::SupportConfig;
use nave_profile::experiment::{
    FlatPanel, FlatPanelSpec, MonochromaticBeam, Panel, RotationScan, RotationScanSpec, Scan,
    SingleAxisGoniometer,
};
use nave_profile::interfaces::{ModelTerms, MosaicitySpread, RockingCurveParams};
use nave_profile::shoebox::MaskCode;
use nave_profile::support::{PartialitySupport, ProfileSupport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Predicting the shoebox of one reflection ===\n");

    let beam = MonochromaticBeam::new(Vector3::new(0.0, 0.0, -1.0), 0.9795)?;
    let detector = vec![FlatPanel::new(FlatPanelSpec {
        fast_axis: Vector3::new(1.0, 0.0, 0.0),
        slow_axis: Vector3::new(0.0, -1.0, 0.0),
        origin: Vector3::new(-50.0, 50.0, -200.0),
        pixel_size: Vector2::new(0.1, 0.1),
        image_size: (1000, 1000),
    })?];
    let goniometer = SingleAxisGoniometer::new(Vector3::x())?;
    let scan = RotationScan::new(RotationScanSpec {
        image_range: (1, 180),
        oscillation_start: 0.0,
        oscillation_width: 0.5_f64.to_radians(),
    })?;

    let support = ProfileSupport::new(
        &beam,
        &detector,
        &goniometer,
        &scan,
        Matrix3::identity() * 0.02,
        MosaicitySpread::isotropic(0.05, 0.01, 0.001),
        SupportConfig::with_probability(0.99)?,
    )?;

    // Reflection hitting pixel (620.3, 410.7) at 30 degrees
    let panel = &detector[0];
    let mm = panel.pixel_to_millimeter(Vector2::new(620.3, 410.7));
    let s1 = (panel.d_matrix() * Vector3::new(mm.x, mm.y, 1.0)).normalize() / beam.wavelength;
    let phi0 = 30.0_f64.to_radians();

    println!("1. Bounding box:");
    let shoebox = support.predict_shoebox(0, s1, phi0)?;
    let bbox = shoebox.bbox;
    println!("   x: [{}, {})  y: [{}, {})  z: [{}, {})", bbox.x0, bbox.x1, bbox.y0, bbox.y1, bbox.z0, bbox.z1);
    println!(
        "   {} of {} voxels foreground\n",
        shoebox.count(MaskCode::FOREGROUND),
        bbox.volume()
    );

    let frame = scan.array_index_from_angle(phi0).floor() as i32;
    let k = (frame - bbox.z0) as usize;
    println!("2. Mask through frame {} (# foreground, . background):", frame);
    for row in shoebox.mask.index_axis(ndarray::Axis(0), k).rows() {
        let line: String = row
            .iter()
            .map(|m| if m.contains(MaskCode::FOREGROUND) { '#' } else { '.' })
            .collect();
        println!("   {}", line);
    }

    println!("\n3. Profile through the same frame (x10):");
    for row in shoebox.data.index_axis(ndarray::Axis(0), k).rows() {
        let line: String = row.iter().map(|p| format!("{:2.0}", p * 10.0)).collect();
        println!("   {}", line);
    }

    println!("\n4. Partiality:");
    let partiality = PartialitySupport::new(
        &beam,
        &goniometer,
        &scan,
        RockingCurveParams::new(1000.0, 0.001, 0.002),
        ModelTerms::all(),
    )?;
    let (z0, z1) = partiality.compute_frame_range(s1, phi0)?;
    println!("   diffracting frames: [{}, {})", z0, z1);
    println!(
        "   fraction recorded inside the bounding box: {:.4}",
        partiality.compute_partiality(s1, phi0, &bbox)?
    );

    Ok(())
}
