pub(crate) mod atlas;
pub(crate) mod fonts;
pub(crate) mod raster;
