use clap::Parser;
use gesture_interaction_engine::events::InteractionKind;

// Some defaults; some of which can be overriden via CLI args
const CONFIG_FILE_PATH: &str = "./gestures.json";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Where to load engine config (gesture bindings, thresholds, scene elements)
    #[arg(long = "config", default_value_t = String::from(CONFIG_FILE_PATH))]
    pub config_path: String,

    /// Recorded hand frames: a JSON array if the file ends in .json, MessagePack otherwise
    #[arg(long = "input")]
    pub input_path: String,

    /// Where to write events, one JSON object per line; stdout if omitted
    #[arg(long = "output")]
    pub output_path: Option<String>,

    /// Only output events of this kind (can be repeated)
    #[arg(long = "kind")]
    pub kinds: Vec<InteractionKind>,

    /// Only output events targeting this element id
    #[arg(long = "target")]
    pub target: Option<usize>,

    /// Save the effective config (including defaults) back to the config path
    #[arg(long = "writeConfig")]
    pub write_config: bool,

    #[arg(long = "loglevel", default_value_t = String::from("info"))]
    pub log_level: String,
}
