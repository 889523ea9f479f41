use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Light rig inspector and attribute copy tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Scene snapshot (JSON) to operate on
    #[arg(short = 's', long = "scene", value_name = "SCENE", global = true)]
    pub scene: Option<PathBuf>,

    /// Enable logging to file (default: lightrig.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE", global = true)]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List recognised lights in the scene
    List,
    /// Print the attribute schema of a light type
    Schema {
        /// Type name, e.g. pointLight
        #[arg(value_name = "TYPE")]
        type_name: String,
    },
    /// Print the panel controls for a light
    Controls {
        #[arg(value_name = "NODE")]
        node: String,
    },
    /// List the attributes a light offers for copying
    Attrs {
        #[arg(value_name = "NODE")]
        node: String,
    },
    /// Copy attribute values from one light to others
    Copy {
        /// Source light (shape name)
        #[arg(long = "from", value_name = "NODE")]
        from: String,
        /// Attribute names, comma separated
        #[arg(long = "attrs", value_delimiter = ',', required = true)]
        attrs: Vec<String>,
        /// Destination lights, comma separated
        #[arg(long = "to", value_delimiter = ',', required = true)]
        to: Vec<String>,
        /// Print the report as JSON
        #[arg(long = "json")]
        json: bool,
        /// Write the modified scene here
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
