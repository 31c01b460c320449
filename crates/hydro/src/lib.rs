//! # sedra-hydro
//!
//! Hydraulic sediment-transport pipeline: interpolates scattered
//! (x, y, depth, velocity) model output onto regular grids and derives
//! bed shear stress, Shields stress and flow competence rasters.
//!
//! The stages run strictly in order, each materializing its output
//! before the next begins:
//!
//! 1. **points** — load the scattered sample table
//! 2. **surface** — constrained-Delaunay TIN per attribute
//! 3. **rasterize** — sample each TIN onto a uniform grid
//! 4. **clip** — restrict both grids to the study boundary
//! 5. **transport** — cell-wise physical formula chain

pub mod boundary;
pub mod clip;
pub mod config;
mod maybe_rayon;
pub mod pipeline;
pub mod points;
pub mod rasterize;
pub mod surface;
pub mod transport;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::boundary::Boundary;
    pub use crate::clip::clip_to_boundary;
    pub use crate::config::{FieldNames, PhysicalConstants, PipelineConfig};
    pub use crate::pipeline::{run, run_to_dir, TransportRasters};
    pub use crate::points::{load_samples, load_samples_from_path, Sample};
    pub use crate::rasterize::rasterize;
    pub use crate::surface::{Attribute, TinSurface};
    pub use crate::transport::{
        bed_shear_stress, drag_coefficient, flow_competence, shear_velocity, shields_stress,
        transport_chain, TransportOutputs,
    };
    pub use sedra_core::prelude::*;
}
