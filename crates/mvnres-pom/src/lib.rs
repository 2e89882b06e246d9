//! POM (Project Object Model) XML parsing.
//!
//! `reader::read_pom` turns a `pom.xml` file on disk into a raw
//! [`mvnres_core::model::Project`] — no parent inheritance, no property
//! expansion, no management resolution. Those belong to `mvnres-resolver`,
//! which consumes whatever this crate produces.

pub mod reader;
