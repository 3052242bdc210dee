//! # Sensor HAL Library
//!
//! Device discovery and lifecycle for kernel input-subsystem sensor devices.
//!
//! This library provides the core a Linux sensor stack builds on:
//! - Resolving a logical sensor name to its `/dev/input/event*` node, via a
//!   stable per-class symlink tree when the platform provides one, falling
//!   back to a scan of the raw input-device directory
//! - A uniform device handle ([`device::SensorDevice`]) owning the resolved
//!   descriptor plus an optional control-path descriptor
//! - A polymorphic sensor surface ([`sensor::Sensor`]) with default no-op
//!   control operations that concrete sensor types override

pub mod config;
pub mod device;
pub mod error;
pub mod resolver;
pub mod sensor;
