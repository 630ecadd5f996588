use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "featurescope",
    version,
    about = "feature activation sample viewer",
    long_about = "featurescope renders sparse-autoencoder feature activation samples, regrouping byte-level tokens so split UTF-8 characters display intact.\n\nExamples:\n  featurescope feature.json\n  featurescope feature.json --group 0 --page 3\n  featurescope feature.json -o feature.html\n  featurescope feature.yml --interactive\n\nTip: Use --config to persist view settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        value_name = "FILE",
        help_heading = "Input",
        help = "Feature document to render (JSON, or YAML by .yml/.yaml extension)."
    )]
    pub input: Option<String>,

    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.featurescope/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'g',
        long = "grp",
        visible_alias = "group",
        value_name = "INDEX",
        help_heading = "View",
        help = "Render only this sample group (0-based). Renders every group when unset."
    )]
    pub group: Option<usize>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to render (1-based, clamped to the last page)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "View",
        help = "Samples per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "sp",
        visible_alias = "show-pending",
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "View",
        help = "Render trailing token bytes that never decode instead of dropping them."
    )]
    pub show_pending: Option<bool>,

    #[arg(
        short = 'I',
        long = "it",
        visible_alias = "interactive",
        help_heading = "View",
        help = "Page through one sample group interactively (n/p/<page>/q)."
    )]
    pub interactive: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered view to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json, html). Inferred from --output when unset."
    )]
    pub output_format: Option<String>,
}
