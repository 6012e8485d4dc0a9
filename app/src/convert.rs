//! Pull-based conversion: pixel buffer and settings in, ASCII STL out.
//!
//! Stages run strictly in order and each fully materializes before the next:
//! resolve working size, resample, preprocess, build the heightmap,
//! synthesize and serialize. A [`CancellationToken`] is checked between
//! stages so a newer request can supersede this one.

use litho_imaging::{
    PixelBuffer, PreprocessProfile, ResolutionPolicy, ResolutionWarning, preprocess,
    resize_to_working,
};
use litho_mesh::{HeightMap, Interpolation, Shape, StlWriter, build_heightmap, synthesize};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{ConvertError, LithoConfig};

/// Summary of a finished conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub source_width: u32,
    pub source_height: u32,
    pub working_width: u32,
    pub working_height: u32,
    pub profile: PreprocessProfile,
    pub shape: Shape,
    pub interpolation: Interpolation,
    pub triangles: usize,
    pub stl_bytes: usize,
    pub resolution_warning: Option<ResolutionWarning>,
}

/// Output of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Complete ASCII STL document.
    pub stl: Vec<u8>,
    pub report: ConversionReport,
    /// Thickness field the mesh was built from, kept for previews.
    pub heightmap: HeightMap,
}

impl Conversion {
    /// Suggested download name, `lithophane_{shape}_{w}x{h}.stl`.
    pub fn file_name(&self) -> String {
        default_file_name(
            &self.report.shape,
            self.report.working_width,
            self.report.working_height,
        )
    }
}

/// `lithophane_{kind}_{width}x{height}.stl` for a working size.
///
/// `kind` is the topology (`panel`, `sphere`, `cylinder`, `cone`), not the
/// name the shape was selected by: `frame` names a panel file and `bauble` a
/// sphere file.
pub fn default_file_name(shape: &Shape, width: u32, height: u32) -> String {
    format!("lithophane_{}_{width}x{height}.stl", shape.kind())
}

/// Convert with the default resolution policy.
pub fn convert(image: &PixelBuffer, config: &LithoConfig) -> Result<Conversion, ConvertError> {
    convert_with_token(image, config, &CancellationToken::new())
}

/// Convert, giving up with [`ConvertError::Superseded`] once `token` is cancelled.
pub fn convert_with_token(
    image: &PixelBuffer,
    config: &LithoConfig,
    token: &CancellationToken,
) -> Result<Conversion, ConvertError> {
    convert_with_policy(image, config, &ResolutionPolicy::default(), token)
}

/// Full pipeline with an explicit resolution policy.
pub fn convert_with_policy(
    image: &PixelBuffer,
    config: &LithoConfig,
    policy: &ResolutionPolicy,
    token: &CancellationToken,
) -> Result<Conversion, ConvertError> {
    config.validate()?;
    let range = config.thickness_range()?;
    let (source_width, source_height) = image.dimensions();
    info!(
        source_width,
        source_height,
        shape = config.shape.kind(),
        profile = %config.preprocess_profile,
        "Starting conversion"
    );

    let checkpoint = |stage: &'static str| {
        if token.is_cancelled() {
            debug!(stage, "Conversion superseded");
            return Err(ConvertError::Superseded);
        }
        Ok(())
    };
    checkpoint("start")?;

    let working = policy.resolve(source_width, source_height)?;
    let resized = resize_to_working(image, &working);
    checkpoint("resize")?;

    let prepared = preprocess(&resized, config.preprocess_profile, &config.filter_settings())?;
    drop(resized);
    checkpoint("preprocess")?;

    let heightmap = build_heightmap(&prepared, &range)?;
    drop(prepared);
    checkpoint("heightmap")?;

    let mut writer = StlWriter::new(Vec::new(), config.shape.solid_name())?;
    let triangles = synthesize(&heightmap, &config.shape, config.interpolation, &mut writer)?;
    let stl = writer.finish()?;
    checkpoint("mesh")?;

    let report = ConversionReport {
        source_width,
        source_height,
        working_width: working.width,
        working_height: working.height,
        profile: config.preprocess_profile,
        shape: config.shape,
        interpolation: config.interpolation,
        triangles,
        stl_bytes: stl.len(),
        resolution_warning: working.warning,
    };
    info!(
        working_width = report.working_width,
        working_height = report.working_height,
        triangles,
        stl_bytes = report.stl_bytes,
        "Conversion finished"
    );

    Ok(Conversion {
        stl,
        report,
        heightmap,
    })
}
