pub mod bounding_box;
pub mod trigger_entity;
