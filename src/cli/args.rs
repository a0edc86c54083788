use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pagecollect",
    version,
    about = "drains paginated JSON collection endpoints",
    long_about = "pagecollect requests page=1, 2, 3, ... of each collection path until the server answers with a non-2xx status, and prints every record of every page in order.\n\nExamples:\n  pagecollect -o http://localhost:5000 /api/players\n  pagecollect -o http://localhost:5000 '/api/teams?year=2024' --page-size 100\n  pagecollect --config ~/.pagecollect/config.yml --out records.json\n\nTip: Use --config to persist the origin and HTTP settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv). RUST_LOG takes precedence."
    )]
    pub verbose: u8,

    #[arg(
        short = 'o',
        long = "origin",
        value_name = "URL",
        help_heading = "Input",
        help = "Origin every path is resolved against (e.g. http://localhost:5000)."
    )]
    pub origin: Option<String>,

    #[arg(
        value_name = "PATH",
        help_heading = "Input",
        help = "Collection path, optionally with its own query string (repeatable)."
    )]
    pub paths: Vec<String>,

    #[arg(
        short = 'p',
        long = "path",
        value_name = "PATH",
        action = ArgAction::Append,
        help_heading = "Input",
        help = "Collection path (repeatable, same as the positional form)."
    )]
    pub path: Vec<String>,

    #[arg(
        short = 'i',
        long = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Load paths from a file (one per line, # starts a comment)."
    )]
    pub input_file: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.pagecollect/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "page-param",
        value_name = "NAME",
        help_heading = "Pagination",
        help = "Query parameter carrying the page number (default: page)."
    )]
    pub page_param: Option<String>,

    #[arg(
        long = "page-size-param",
        value_name = "NAME",
        help_heading = "Pagination",
        help = "Query parameter carrying the page size (default: page_size)."
    )]
    pub page_size_param: Option<String>,

    #[arg(
        short = 's',
        long = "page-size",
        value_name = "N",
        help_heading = "Pagination",
        help = "Records per page to ask for; omitted from requests when unset."
    )]
    pub page_size: Option<u32>,

    #[arg(
        short = 'm',
        long = "max-pages",
        value_name = "N",
        help_heading = "Pagination",
        help = "Stop after this many pages per path."
    )]
    pub max_pages: Option<u32>,

    #[arg(
        short = 'r',
        long = "rate",
        value_name = "RPS",
        help_heading = "Performance",
        help = "Page request rate limit across all paths (requests per second)."
    )]
    pub rate: Option<u32>,

    #[arg(
        short = 't',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of paths collected at the same time."
    )]
    pub concurrency: Option<u32>,

    #[arg(
        long = "timeout",
        value_name = "SECS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Send requests through this proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "header",
        value_name = "HEADER",
        help_heading = "HTTP",
        help = "Extra request header (\"Key: Value\")."
    )]
    pub header: Option<String>,

    #[arg(
        long = "follow-redirects",
        help_heading = "HTTP",
        help = "Follow HTTP redirects (a redirect otherwise ends pagination)."
    )]
    pub follow_redirects: bool,

    #[arg(
        long = "out",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write results to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        long = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "text, json or jsonl (inferred from --out when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored summary output."
    )]
    pub no_color: bool,
}
