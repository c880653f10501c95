pub(crate) mod camera;
pub(crate) mod cycle;
pub(crate) mod remap;
pub(crate) mod stage;
pub(crate) mod weighted;
pub(crate) mod world;
