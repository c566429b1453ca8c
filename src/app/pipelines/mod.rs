pub mod harvest_pipeline;

pub use harvest_pipeline::{plan_regions, HarvestPipeline};
