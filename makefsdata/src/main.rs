use clap::Parser;
use makefs_core::config::{
    DEFAULT_SERVER_AGENT, DEFAULT_TARGET_DIR, DEFAULT_TARGET_FILENAME, parse_ext_list,
};
use makefs_core::{FsConfig, generate};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert a directory of web content into an fsdata.c for the lwIP httpd",
    long_about = None
)]
struct Cli {
    /// Relative or absolute path to the files to convert
    #[arg(default_value = DEFAULT_TARGET_DIR)]
    target_dir: PathBuf,

    /// Do not process subdirectories
    #[arg(short = 's', long = "no-subdirs")]
    no_subdirs: bool,

    /// Exclude the HTTP response header from each file (headers are then
    /// created at serve time)
    #[arg(short = 'e', long = "no-header")]
    no_header: bool,

    /// Emit HTTP/1.1 response headers (HTTP/1.0 is the default)
    #[arg(long = "http11")]
    http11: bool,

    /// Target filename
    #[arg(short = 'f', long = "out", default_value = DEFAULT_TARGET_FILENAME)]
    out: PathBuf,

    /// Include a Last-Modified header based on each file's mtime
    #[arg(short = 'm', long = "last-modified")]
    last_modified: bool,

    /// Server identifier sent in the HTTP response header
    #[arg(long = "server", default_value = DEFAULT_SERVER_AGENT)]
    server: String,

    /// Comma separated list of extensions of files to exclude
    #[arg(short = 'x', long = "exclude", value_name = "EXT_LIST")]
    exclude: Option<String>,

    /// Comma separated list of extensions of files to never compress
    #[arg(long = "no-compress", value_name = "EXT_LIST")]
    no_compress: Option<String>,

    /// Deflate-compress all non-SSI files, only keeping results that are
    /// actually smaller; optional level 0-10
    #[arg(
        long = "deflate",
        value_name = "LEVEL",
        num_args = 0..=1,
        default_missing_value = "10"
    )]
    deflate: Option<u8>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = FsConfig {
        target_dir: cli.target_dir,
        process_subdirs: !cli.no_subdirs,
        include_http_header: !cli.no_header,
        use_http11: cli.http11,
        target_filename: cli.out,
        include_last_modified: cli.last_modified,
        server_id: cli.server,
        exclude_exts: cli.exclude.map(|s| parse_ext_list(&s)).unwrap_or_default(),
        ncompress_exts: cli
            .no_compress
            .map(|s| parse_ext_list(&s))
            .unwrap_or_default(),
        deflate_files: cli.deflate.is_some(),
        deflate_level: cli.deflate.unwrap_or(10),
    };

    if cfg.deflate_files {
        println!(
            "Deflating all non-SSI files with level {} (but only if size is reduced)",
            cfg.deflate_level
        );
    }

    match generate(&cfg, None) {
        Ok(outcome) if outcome.interrupted => {
            eprintln!(
                "interrupted: wrote {} files before stopping",
                outcome.files_written
            );
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
