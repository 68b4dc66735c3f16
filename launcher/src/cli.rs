use std::path::PathBuf;

use bpaf::{batteries::verbose_by_slice, construct, long, OptionParser, Parser};
use tracing::level_filters::LevelFilter;

/// The launch options, standing in for the extras the launcher used to put
/// on the game activity's intent.
#[derive(Debug, Clone)]
pub struct Options {
    pub verbosity_level: LevelFilter,
    pub engine_lib: Option<PathBuf>,
    pub engine_args: Vec<String>,
    pub natives_dir: PathBuf,
    pub touch_overlay: bool,
    pub floating_stick: bool,
    pub stick_deadzone: f32,
    pub hide_fixed_stick: bool,
    pub tts_test: bool,
}

pub fn options() -> OptionParser<Options> {
    let verbosity_level = verbose_by_slice(
        3,
        [
            LevelFilter::OFF,
            LevelFilter::ERROR,
            LevelFilter::WARN,
            LevelFilter::INFO,
            LevelFilter::DEBUG,
            LevelFilter::TRACE,
        ],
    );

    let engine_lib = long("engine")
        .help("The engine's main shared object; without it only the overlay runs")
        .argument("FILE")
        .complete_shell(bpaf::ShellComp::File { mask: Some("*.so") })
        .optional();

    let engine_args = long("engine-arg")
        .help("Argument appended to the engine's argument vector, repeatable")
        .argument("ARG")
        .many();

    let natives_dir = long("natives")
        .help("Directory holding the engine's native libraries")
        .argument("DIR")
        .fallback(PathBuf::from("natives"));

    let touch_overlay = long("no-touch-overlay")
        .help("Do not build the touch overlay")
        .switch()
        .map(|disabled| !disabled);

    let floating_stick = long("floating-stick")
        .help("Recenter the stick under the finger on every new touch")
        .switch();

    let stick_deadzone = long("stick-deadzone")
        .help("Stick deadzone as a fraction of the base radius, clamped to [0, 0.5]")
        .argument("FRACTION")
        .fallback(0.12);

    let hide_fixed_stick = long("hide-fixed-stick")
        .help("Only draw the fixed stick while it is being touched")
        .switch();

    let tts_test = long("tts-test")
        .help("Speak a test utterance once speech synthesis is up")
        .switch();

    construct!(Options {
        verbosity_level,
        engine_lib,
        engine_args,
        natives_dir,
        touch_overlay,
        floating_stick,
        stick_deadzone,
        hide_fixed_stick,
        tts_test
    })
    .to_options()
    .descr("Host shim for the FreeSpace Open engine with on-screen touch controls")
}
