use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use motion_capture_lib::{Frame, PersistError, Persister};

use crate::app::{AppError, ReplayClip};

/// Saves photos as PNG files and clips as directories of numbered PNG frames. Photos and
/// clips share one sequence number.
#[derive(Debug)]
pub struct DirPersister {
    output_dir: PathBuf,
    next_seq: u32,
}

impl DirPersister {
    pub fn new(output_dir: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(output_dir).map_err(|src| AppError::OutputDir {
            path: output_dir.to_path_buf(),
            src,
        })?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            next_seq: 0,
        })
    }

    fn take_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl Persister for DirPersister {
    type Clip = ReplayClip;

    fn save_image(&mut self, frame: Frame) -> Result<(), PersistError> {
        let seq = self.take_seq();
        let path = self.output_dir.join(format!("photo_{:05}.png", seq));

        frame
            .into_inner()
            .save(&path)
            .map_err(|e| persist_err(&path, e))?;

        info!("Saved photo to {}", path.display());
        Ok(())
    }

    fn save_video(&mut self, clip: ReplayClip) -> Result<(), PersistError> {
        let seq = self.take_seq();
        let clip_dir = self.output_dir.join(format!("clip_{:05}", seq));
        std::fs::create_dir_all(&clip_dir).map_err(|e| persist_err(&clip_dir, e))?;

        let frame_count = clip.frames.len();
        for (i, frame) in clip.frames.into_iter().enumerate() {
            let path = clip_dir.join(format!("frame_{i:05}.png"));
            frame
                .into_inner()
                .save(&path)
                .map_err(|e| persist_err(&path, e))?;
        }

        info!("Saved {frame_count} frame clip to {}", clip_dir.display());
        Ok(())
    }
}

fn persist_err(path: &Path, e: impl Display) -> PersistError {
    PersistError(format!("{}: {e}", path.display()))
}
