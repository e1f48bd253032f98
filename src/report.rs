use std::collections::BTreeMap;

use serde::Serialize;

use crate::anatomy::{plan_slices, Orientation, SliceDescriptor};
use crate::color::{emotion_colors, region_legend, Rgb};
use crate::config::EngineConfig;
use crate::data::model::AnalysisInput;
use crate::engine::{
    active_regions, aggregate, build_series, project, project_grid, rasterize, ActivationVolume,
    ActiveRegion, DenseGrid, OverlayImage, OverlayStyle, TimeSegment,
};
use crate::error::EngineResult;
use crate::mapping::{EmotionLabel, MappingTables, Region, RegionActivationMap};
use crate::metadata::RegionMetadataStore;

// ---------------------------------------------------------------------------
// Context + response shapes
// ---------------------------------------------------------------------------

/// Everything an analysis reads but never mutates.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub tables: &'a MappingTables,
    pub config: &'a EngineConfig,
    pub metadata: &'a RegionMetadataStore,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrainData {
    pub regions: RegionActivationMap,
    pub voxel_data: ActivationVolume,
    pub time_series: Vec<TimeSegment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliceOverlay {
    pub index: usize,
    pub position: i64,
    pub overlay: OverlayImage,
    pub regions: Vec<ActiveRegion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewOverlays {
    pub orientation: Orientation,
    pub num_slices: usize,
    pub dimensions: [usize; 3],
    pub slices: Vec<SliceOverlay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub emotions: AnalysisInput,
    pub brain_data: BrainData,
    pub emotion_colors: BTreeMap<EmotionLabel, Rgb>,
    pub region_legend: BTreeMap<Region, Rgb>,
    pub brain_views: BTreeMap<Orientation, ViewOverlays>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the whole pipeline for one track.
///
/// The three orientation views are built on scoped threads that share one
/// dense reconstruction of the voxel volume.
pub fn analyze(input: &AnalysisInput, ctx: AnalysisContext<'_>) -> EngineResult<AnalysisReport> {
    let weights = &ctx.tables.weights;
    let activations = aggregate(weights, &input.overall_emotions);
    let volume = rasterize(&ctx.tables.atlas, &activations, &ctx.config.raster_settings())?;
    let time_series = build_series(weights, &input.segments);

    let grid = DenseGrid::from_volume(&volume)?;
    let regions = active_regions(&activations, ctx.metadata, ctx.config.slice_region_cutoff);
    let style = ctx.config.overlay_style();

    let views = std::thread::scope(|scope| {
        let handles: Vec<_> = Orientation::ALL
            .into_iter()
            .map(|orientation| {
                let grid = &grid;
                let regions = &regions;
                let config = ctx.config;
                scope.spawn(move || build_view(grid, orientation, config, &style, regions))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(view) => view,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<EngineResult<Vec<_>>>()
    })?;

    log::info!(
        "analysis: strongest region {}, {} voxels, {} segments, {} views",
        activations
            .strongest()
            .map(|r| r.key())
            .unwrap_or("none"),
        volume.len(),
        time_series.len(),
        views.len()
    );

    Ok(AnalysisReport {
        emotions: input.clone(),
        brain_data: BrainData {
            regions: activations,
            voxel_data: volume,
            time_series,
        },
        emotion_colors: emotion_colors(weights),
        region_legend: region_legend(),
        brain_views: views.into_iter().map(|v| (v.orientation, v)).collect(),
    })
}

fn build_view(
    grid: &DenseGrid,
    orientation: Orientation,
    config: &EngineConfig,
    style: &OverlayStyle,
    regions: &[ActiveRegion],
) -> EngineResult<ViewOverlays> {
    let descriptors = plan_slices(orientation, config.anatomy_dimensions, config.slices_per_view);
    let mut slices = Vec::with_capacity(descriptors.len());
    for slice in &descriptors {
        let overlay = project_grid(grid, slice, style)?;
        slices.push(finish_slice(slice, overlay, config, regions));
    }
    log::debug!(
        "{orientation} view: {} slices, {} illuminated pixels",
        slices.len(),
        slices.iter().map(|s| s.overlay.illuminated()).sum::<usize>()
    );
    Ok(ViewOverlays {
        orientation,
        num_slices: slices.len(),
        dimensions: config.anatomy_dimensions,
        slices,
    })
}

fn finish_slice(
    slice: &SliceDescriptor,
    overlay: OverlayImage,
    config: &EngineConfig,
    regions: &[ActiveRegion],
) -> SliceOverlay {
    let overlay = if config.resample_overlays {
        let (width, height) = slice.image_extent();
        overlay.resampled(width, height)
    } else {
        overlay
    };
    SliceOverlay {
        index: slice.index,
        position: slice.position,
        overlay,
        regions: regions.to_vec(),
    }
}

/// Project a single slice at an anatomical `position`, without building the
/// full report.
pub fn single_slice(
    input: &AnalysisInput,
    orientation: Orientation,
    position: i64,
    ctx: AnalysisContext<'_>,
) -> EngineResult<SliceOverlay> {
    let activations = aggregate(&ctx.tables.weights, &input.overall_emotions);
    let volume = rasterize(&ctx.tables.atlas, &activations, &ctx.config.raster_settings())?;
    let slice = SliceDescriptor {
        orientation,
        index: 0,
        position,
        dimensions: ctx.config.anatomy_dimensions,
    };
    let overlay = project(&volume, &slice, &ctx.config.overlay_style())?;
    let regions = active_regions(&activations, ctx.metadata, ctx.config.slice_region_cutoff);
    Ok(finish_slice(&slice, overlay, ctx.config, &regions))
}
