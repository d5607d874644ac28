use clap::Parser;
use h5tracks::{Cli, H5Tracks, H5TracksError, OutputFormatter, OutputMode, UserFriendlyError};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli);

    let exit_code = run(&cli);
    process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(cli);
    }

    let h5tracks = match H5Tracks::from_cli(cli) {
        Ok(h5tracks) => h5tracks,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let Some(input_dir) = cli.input_dir.as_deref() else {
        h5tracks.output_formatter().error("No input directory given");
        return 2;
    };

    if cli.dry_run {
        return handle_dry_run(&h5tracks, input_dir);
    }

    match h5tracks.extract_tracks(input_dir) {
        Ok(report) => {
            h5tracks.output_formatter().print_extraction_report(&report);
            0
        }
        Err(e) => {
            h5tracks.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &H5TracksError) -> i32 {
    match error {
        H5TracksError::Config { .. } => 2,
        H5TracksError::RootNotFound { .. } | H5TracksError::InvalidPath { .. } => 3,
        H5TracksError::OutputWrite { .. } => 4,
        H5TracksError::Open { .. } => 5,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "h5tracks.toml".to_string());

    match H5Tracks::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  h5tracks <input-dir> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(h5tracks: &H5Tracks, input_dir: &std::path::Path) -> i32 {
    let formatter = h5tracks.output_formatter();

    formatter.info("DRY RUN MODE - No files will be opened or written");
    formatter.print_separator();

    let config = h5tracks.config();
    formatter.info("Configuration that would be used:");
    println!("  Extensions: {}", config.scan.extensions.join(", "));
    match config.scan.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }
    println!("  Skip hidden directories: {}", config.scan.skip_hidden);
    println!("  Skip unopenable: {}", config.scan.skip_unopenable);
    println!("  Song index: {}", config.source.song_index);
    println!("  Output file: {}", config.output.path.display());
    println!("  Delimiter: {:?}", config.output.delimiter);
    formatter.print_separator();

    match h5tracks.discover(input_dir) {
        Ok(paths) => {
            for path in &paths {
                println!("{}", path.display());
            }
            formatter.print_separator();
            formatter.success(&format!("Dry run found {} song files", paths.len()));
            0
        }
        Err(e) => {
            h5tracks.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &H5TracksError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
