use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "classpath-resolver")]
#[command(about = "Resolve a JVM classpath and look up classes, packages and sources in it")]
#[command(after_help = "Environment:\n  CLASSPATH                 user classpath when --classpath is not given\n  JAVA_HOME                 default boot path and extension directories\n  CLASSPATH_RESOLVER_CURL   program used to download codebase archives (default: curl)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "PATH", global = true)]
    pub bootclasspath: Option<String>,

    #[arg(long, value_name = "DIRS", global = true)]
    pub extdirs: Option<String>,

    #[arg(long = "classpath", visible_alias = "cp", value_name = "PATH", global = true)]
    pub classpath: Option<String>,

    #[arg(long, value_name = "PATH", global = true)]
    pub sourcepath: Option<String>,

    /// Space-separated archive URLs.
    #[arg(long, value_name = "URLS", global = true)]
    pub codebase: Option<String>,

    #[arg(long, value_name = "DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Find {
        class_name: String,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    List {
        /// Dotted package name; the root package when omitted.
        package: Option<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    Entries {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    Expand {
        path: String,

        #[arg(long)]
        no_star: bool,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    Stats {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
