//! Sample fixtures for the forcedata factory.
//!
//! [`catalog`] builds a factory holding every scenario record; the file map
//! [`TEST_DATA`] names the top-level fixtures exported as JSON files.

pub mod catalog;
pub mod model;


pub use catalog::{catalog, catalog_with, register_catalog, TEST_DATA};
pub use model::{Android, Base, Device, Fixture, Friends, HairStyle, Ios};
