pub(crate) mod mapper;
pub(crate) mod mask;
pub(crate) mod planner;
pub(crate) mod pool;
