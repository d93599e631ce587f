//! Error types for heartfield.
//!
//! This module provides error types for configuration validation, GPU
//! initialization, and application startup.

use std::fmt;

/// Errors raised while validating a [`crate::FieldConfig`].
///
/// All variants are detected before any buffer is allocated or any GPU
/// resource is created, so a bad configuration fails fast.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Particle count must be at least 1.
    ParticleCount(u32),
    /// Shell fraction must lie strictly inside (0, 1).
    ShellFraction(f32),
    /// Core radial exponent must be finite and positive.
    CoreExponent(f32),
    /// Normalize factor must be finite and positive.
    NormalizeFactor(f32),
    /// The bloom threshold does not separate shell colors from core colors.
    BloomContract {
        /// Smallest max-channel value any shell particle can receive.
        shell_floor: f32,
        /// Largest max-channel value any core particle can receive.
        core_ceiling: f32,
        /// Configured bloom luminance threshold.
        threshold: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParticleCount(n) => {
                write!(f, "Particle count must be greater than zero (got {})", n)
            }
            ConfigError::ShellFraction(v) => {
                write!(f, "Shell fraction must be in (0, 1) exclusive (got {})", v)
            }
            ConfigError::CoreExponent(v) => {
                write!(f, "Core exponent must be finite and positive (got {})", v)
            }
            ConfigError::NormalizeFactor(v) => {
                write!(f, "Normalize factor must be finite and positive (got {})", v)
            }
            ConfigError::BloomContract {
                shell_floor,
                core_ceiling,
                threshold,
            } => write!(
                f,
                "Bloom threshold {} must sit between the core color ceiling {} and the shell color floor {}",
                threshold, core_ceiling, shell_floor
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the viewer application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The field configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}
