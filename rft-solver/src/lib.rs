#![warn(clippy::todo, unused_qualifications)]

//! Radio frequency ray tracing.
//!
//! An [`Antenna`] emits root [`Wave`]s. The [`Tracer`] splits every wave that
//! hits a [`Face`] into a reflected and a refracted wave and collects the
//! result into a [`Path`] per seed. Field values of derived waves follow from
//! the Fresnel equations and are computed lazily when first queried. Receivers
//! sum the fields of all waves passing by.

pub mod antenna;
pub mod arena;
pub mod constants;
pub mod error;
pub mod face;
pub mod icosphere;
pub mod material;
pub mod math;
pub mod path;
pub mod ray;
pub mod scene;
pub mod tracer;
pub mod wave;

pub use crate::{
    antenna::{
        Antenna,
        TransmitParameters,
    },
    constants::PhysicalConstants,
    error::Error,
    face::Face,
    material::{
        Material,
        MaterialProperties,
        MaterialTable,
    },
    path::{
        Path,
        WaveRef,
    },
    ray::Ray,
    scene::RayCast,
    tracer::{
        Tracer,
        TracerConfig,
        trace,
    },
    wave::{
        Attenuation,
        EmProperties,
        Interaction,
        Wave,
    },
};
