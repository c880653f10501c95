pub(crate) mod frame;
pub(crate) mod preview;
pub(crate) mod projection;
