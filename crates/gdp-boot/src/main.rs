use std::{
    io::{Write, stdout},
    thread::sleep,
    time::Duration,
};

use clap::{ArgAction, Parser};
use clap_num::maybe_hex;
use colored::Colorize;
use gdp_port::SerialTransport;
use gdp_protocol::{CommandChannel, LOG_DEPTH};
use log::LevelFilter;

use crate::{err::Error, image::bootstrap_image, logging::hexdump};

mod err;
mod image;
mod logging;

type Result<T> = core::result::Result<T, Error>;

#[derive(Parser)]
#[command(version, about = "Upload a boot image to the GDP and dump its access log")]
struct Cli {
    /// Serial port of the SBC
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = 115200)]
    baud: u32,

    /// Response timeout in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    timeout: u64,

    /// Pings before giving up on the SBC
    #[arg(short = 'r', long, default_value_t = 5)]
    ping_retries: usize,

    /// Time to let the GDP run before reading the log, in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    settle: u64,

    /// Log entries to read at most
    #[arg(short, long, default_value_t = LOG_DEPTH, value_parser=maybe_hex::<u16>)]
    log_depth: u16,

    /// Image bytes to dump before starting the GDP
    #[arg(short, long, default_value_t = 256, value_parser=maybe_hex::<usize>)]
    dump: usize,

    /// Protocol tracing, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    log!("Connecting to {}...", cli.port);
    let io = status!(SerialTransport::open(&cli.port, cli.baud))?;
    let mut channel = CommandChannel::new(io).with_timeout(Duration::from_millis(cli.timeout));

    log!("Waiting for the SBC...");
    status!(channel.wait_online(cli.ping_retries))?;

    let image = bootstrap_image()?;
    log!("Writing {} bytes image...", image.len());
    status!(channel.bulk_write(&image))?;

    let dump = &image[..cli.dump.min(image.len())];
    println!("First {} bytes of image:", dump.len());
    hexdump(&mut stdout(), dump)?;

    log!("Starting GDP...");
    status!(channel.start())?;

    sleep(Duration::from_millis(cli.settle));

    println!("Access log:");
    let entries = channel.poll_log(cli.log_depth, |entry| println!("  {entry}"))?;
    if entries.last().is_some_and(|e| e.is_fatal()) {
        println!("{}", "GDP stopped with a fatal signal".red());
    }

    Ok(())
}

fn main() -> core::result::Result<(), String> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    run(cli).map_err(|e| e.to_string())
}
