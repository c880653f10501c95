pub(crate) mod ease;
pub(crate) mod rate;
pub(crate) mod schedule;
pub(crate) mod timeline;
