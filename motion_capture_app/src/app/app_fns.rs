use std::sync::Arc;

use motion_capture_lib::*;

use crate::app::*;

// * read cfg
// * load thresholds and apply overrides
// * open the replay and the output dir
// * run the detector until the replay ends

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.verbosity);

    let ret = match run_app_inner(&cfg) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<()> {
    let frames_dir = &cfg.replay_cfg.frames_dir;
    if !frames_dir.is_dir() {
        return Err(AppError::FramesDirMissing(frames_dir.clone()).into());
    }

    let config = match &cfg.config_path {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let thresholds = cfg.overrides.apply(config.thresholds);

    // debounce on footage time rather than on how fast the images can be read
    let clock = Arc::new(ReplayClock::new(cfg.replay_cfg.fps)?);
    let handle = DetectorHandle::with_clock(thresholds, clock.clone()).map_err(AppError::from)?;
    if let Some((min, max)) = cfg.overrides.sensitivity(&thresholds) {
        handle.set_sensitivity(min, max).map_err(AppError::from)?;
    }
    debug!("Detection thresholds: {:?}", handle.thresholds());

    let source = ReplaySource::new(
        frames_dir,
        clock,
        cfg.replay_cfg.detect_width,
        handle.clone(),
    )?;
    info!(
        "Replaying {} frames from {}",
        source.len(),
        frames_dir.display()
    );

    let persister = DirPersister::new(&cfg.output_dir)?;

    let detector = DetectionLoop::new(source, persister, handle.clone())
        .with_analyzer_options(config.analyzer);
    let detector_thread = detector.spawn()?;

    match cfg.session {
        SessionKindArg::Photo => handle.start_photo(),
        SessionKindArg::Video => handle.start_video(),
    }

    detector_thread
        .join()
        .map_err(|_| AppError::DetectorPanicked)?
        .map_err(AppError::from)?;

    info!(
        "{} captures saved to {}",
        handle.captures(),
        cfg.output_dir.display()
    );

    Ok(())
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        for e in fatal_err.chain().skip(1) {
            error!(target: "app-errorlog", "    caused by: {}", e);
        }
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_thread_level(LevelFilter::Debug)
        .set_thread_mode(ThreadLogMode::Names);

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("TermLogger failed to initialize");
}
