pub mod action;
pub mod entity;
pub mod tile;
