//! Data model for the Maven dependency resolution workspace.
//!
//! `model` holds the plain value types a POM reader produces and a resolver
//! mutates (`Project`, `Dependency`, `Property`, `Path`, ...). `config` holds
//! the environment a resolution run is parameterized by (JDK/OS facts used
//! for profile activation, the local repository root, seed properties).

pub mod config;
pub mod model;
