//! Domain layer: query orchestration over cache and warehouse

pub mod queries;
