use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /////////////////////////////////
    //configuration
    #[error("Failed to read config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        src: std::io::Error,
    },

    #[error("Failed to parse config file {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        src: serde_json::Error,
    },

    #[error("Frame rate must be a positive number, got {0}")]
    InvalidFrameRate(f64),

    /////////////////////////////////
    //replay input and capture output
    #[error("Frames directory not found: {}", .0.display())]
    FramesDirMissing(PathBuf),

    #[error("No images found in {}", .0.display())]
    NoFrames(PathBuf),

    #[error("Failed to create output directory {}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        src: std::io::Error,
    },

    /////////////////////////////////
    //detector
    #[error("Detection failed: {0}")]
    Capture(#[from] motion_capture_lib::Error),

    #[error("The detection thread panicked")]
    DetectorPanicked,
}
