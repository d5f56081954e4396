use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};

use crate::app::*;

// replay input and capture output
const FRAMES_DIR: &str = "Frames directory";
const OUTPUT_DIR: &str = "Output directory";
const FPS: &str = "Frame rate";
const DETECT_WIDTH: &str = "Detection width";

// session
const SESSION: &str = "Session kind";

// detection configuration
const CONFIG_FILE: &str = "Config file";
const DELTA_THRESHOLD: &str = "Delta threshold";
const MIN_SIZE: &str = "Minimum size";
const MAX_SIZE: &str = "Maximum size";
const MIN_INTERVAL: &str = "Minimum interval";
const VIDEO_AFTER: &str = "Video after motion";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 13] = [
    //
    // replay input and capture output
    FRAMES_DIR,
    OUTPUT_DIR,
    FPS,
    DETECT_WIDTH,
    //
    //session
    SESSION,
    //
    //detection configuration
    CONFIG_FILE,
    DELTA_THRESHOLD,
    MIN_SIZE,
    MAX_SIZE,
    MIN_INTERVAL,
    VIDEO_AFTER,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Motion capture")
        .version(clap::crate_version!())
        .about("Replay a directory of images through the motion detector, saving a photo or a clip whenever something moves");

    clap_app = clap_app.arg(
        clap::Arg::new(FRAMES_DIR)
            .long("frames")
            .required(true)
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("Directory of images to replay as camera frames. Images are read in file name order, including subdirectories.")
            .display_order(get_ordering(FRAMES_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_DIR)
            .long("output")
            .required(true)
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("Directory that photos and clips are written to. Created if missing.")
            .display_order(get_ordering(OUTPUT_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(FPS)
            .long("fps")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .default_value("10")
            .help("Frame rate the images were captured at. Used to turn the video tail duration into a number of frames.")
            .display_order(get_ordering(FPS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DETECT_WIDTH)
            .long("detect-width")
            .num_args(1)
            .value_parser(value_parser!(u32).range(1..))
            .help("Scale frames down to this width before looking for motion. Size bounds are measured at this resolution. Photos and clips are always saved at full resolution.")
            .display_order(get_ordering(DETECT_WIDTH)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SESSION)
            .long("mode")
            .num_args(1)
            .value_parser(value_parser!(SessionKindArg))
            .default_value("photo")
            .help("Take a photo or save a video clip when motion is detected")
            .display_order(get_ordering(SESSION)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CONFIG_FILE)
            .long("config")
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("JSON file with \"thresholds\" and/or \"analyzer\" sections. The other arguments in this group override its values.")
            .display_order(get_ordering(CONFIG_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DELTA_THRESHOLD)
            .long("delta-threshold")
            .num_args(1)
            .value_parser(value_parser!(u8))
            .help("Pixels that differ from the background by more than this (0-255) count as changed")
            .display_order(get_ordering(DELTA_THRESHOLD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MIN_SIZE)
            .long("min-size")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .help("Ignore moving regions narrower or shorter than this many pixels")
            .display_order(get_ordering(MIN_SIZE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_SIZE)
            .long("max-size")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .help("Ignore moving regions wider or taller than this many pixels")
            .display_order(get_ordering(MAX_SIZE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MIN_INTERVAL)
            .long("min-interval")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Seconds to wait after a capture before accepting another detection")
            .display_order(get_ordering(MIN_INTERVAL)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VIDEO_AFTER)
            .long("video-after")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Seconds of video to keep recording after the motion")
            .display_order(get_ordering(VIDEO_AFTER)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .short('q')
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .short('v')
            .long("verbose")
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

pub fn parse_args() -> AppCfg {
    //capture the cwd once, to minimize the risk of working with two values if it is changed by the OS at runtime.
    let cwd = std::env::current_dir().expect("failed to extract cwd");

    let args = build_app().get_matches();
    cfg_from_matches(&args, &cwd)
}

fn cfg_from_matches(args: &clap::ArgMatches, cwd: &Path) -> AppCfg {
    let replay_cfg = ReplayCfg {
        frames_dir: absolutify_path(
            cwd,
            args.get_one::<PathBuf>(FRAMES_DIR)
                .expect("This argument is required"),
        ),
        fps: *args
            .get_one::<f64>(FPS)
            .expect("This argument has a default value"),
        detect_width: args.get_one::<u32>(DETECT_WIDTH).copied(),
    };

    let output_dir = absolutify_path(
        cwd,
        args.get_one::<PathBuf>(OUTPUT_DIR)
            .expect("This argument is required"),
    );

    let overrides = ThresholdOverrides {
        delta_threshold: args.get_one::<u8>(DELTA_THRESHOLD).copied(),
        min_size: args.get_one::<u32>(MIN_SIZE).copied(),
        max_size: args.get_one::<u32>(MAX_SIZE).copied(),
        min_interval: args.get_one::<f64>(MIN_INTERVAL).copied(),
        video_after: args.get_one::<f64>(VIDEO_AFTER).copied(),
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let ret = AppCfg {
        replay_cfg,
        output_dir,
        session: *args
            .get_one::<SessionKindArg>(SESSION)
            .expect("This argument has a default value"),
        config_path: args
            .get_one::<PathBuf>(CONFIG_FILE)
            .map(|p| absolutify_path(cwd, p)),
        overrides,
        verbosity,
    };

    ret
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    //get the absolute path if it is not absolute, by prepending the cwd.
    let path = if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    };

    //canonicalizing fails for paths that don't exist yet, such as a new output dir.
    let p = path.canonicalize().unwrap_or(path);

    p
}
