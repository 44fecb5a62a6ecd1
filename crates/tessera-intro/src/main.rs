//! Introduction programs: an empty window, or an orange quad drawn with one
//! vertex buffer, one index buffer and one shader program.
//!
//! Usage: `tessera-intro [window|geometry]` (default: geometry).

mod intro;
mod mode;

use anyhow::Result;

use tessera_engine::device::GpuInit;
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::window::{Runtime, RuntimeConfig};

use intro::{GeometryIntro, WindowIntro};
use mode::RunMode;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mode = RunMode::from_args(std::env::args().skip(1))?;
    log::info!("starting {mode} introduction");

    let config = RuntimeConfig::default();

    // Linear surface: the fragment color reaches the screen unconverted.
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    match mode {
        RunMode::Window => Runtime::run(config, gpu_init, WindowIntro),
        RunMode::Geometry => Runtime::run(config, gpu_init, GeometryIntro::default()),
    }
}
