//! Crowdfund template compiler CLI.
//!
//! # Usage
//! ```text
//! crowdfund <window-minutes> <goal> <awardee-address> [OPTIONS]
//! crowdfund --inspect <base58-creation-bytes>
//! ```
//!
//! Prints the creation bytes on stdout. Informational output goes to stderr.

use crowdfund::at::disasm::{disassemble, disassemble_with_labels};
use crowdfund::at::program::{CreationBytes, WORD_SIZE};
use crowdfund::crowdfund::CrowdfundTemplate;
use crowdfund::crowdfund::errors::CompileError;
use crowdfund::crowdfund::params::Params;
use crowdfund::types::amount::Amount;
use crowdfund::types::encoding::Encode;
use crowdfund::utils::log::{self, Level};
use crowdfund::{error, info, warn};
use std::env;
use std::process;

/// Output encoding of the creation bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Format {
    Base58,
    Hex,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("crowdfund");

    let log_setup = log::init_from_env();

    let mut positional: Vec<&str> = Vec::new();
    let mut format = Format::Base58;
    let mut disasm = false;
    let mut inspect: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage(program);
                process::exit(0);
            }
            "--hex" => format = Format::Hex,
            "--disasm" => disasm = true,
            "--quiet" | "-q" => log::set_min_level(Level::Warn),
            "--inspect" => {
                i += 1;
                let Some(text) = args.get(i) else {
                    error!("--inspect requires an argument");
                    process::exit(2);
                };
                inspect = Some(text.as_str());
            }
            other if other.starts_with("--") => {
                eprintln!("Unexpected argument: {}\n", other);
                print_usage(program);
                process::exit(2);
            }
            other => positional.push(other),
        }
        i += 1;
    }

    if let Err(e) = log_setup {
        warn!("{e}, using info");
    }

    if let Some(text) = inspect {
        if !positional.is_empty() {
            print_usage(program);
            process::exit(2);
        }
        run_inspect(text);
        return;
    }

    let &[window, goal, awardee] = positional.as_slice() else {
        print_usage(program);
        process::exit(2);
    };

    let window_minutes = window.parse::<i64>().unwrap_or_else(|e| {
        usage_error(program, &format!("invalid window '{window}': {e}"));
    });
    let goal = goal.parse::<Amount>().unwrap_or_else(|e| {
        usage_error(program, &format!("invalid goal '{goal}': {e}"));
    });
    let params = Params::validate(window_minutes, goal.units(), awardee)
        .unwrap_or_else(|e| usage_error(program, &e.to_string()));

    let compiled = match CrowdfundTemplate::build(&params) {
        Ok(compiled) => compiled,
        Err(e @ CompileError::AssemblyInternalError(_)) => {
            error!("{e}");
            process::exit(1);
        }
        Err(e) => usage_error(program, &e.to_string()),
    };

    info!(
        "Window {} minutes, goal {}, awardee {}",
        params.window_minutes, params.goal, params.awardee
    );
    info!(
        "Code {} bytes, data {} bytes ({} slots)",
        compiled.code.len(),
        compiled.data.len(),
        compiled.slots.count()
    );
    info!("Code hash {}", compiled.code_hash());

    println!("Creation bytes:");
    match format {
        Format::Base58 => println!("{}", compiled.container().to_base58()),
        Format::Hex => println!("{}", to_hex(&compiled.creation_bytes())),
    }

    if disasm {
        match disassemble_with_labels(&compiled.code, &compiled.labels) {
            Ok(listing) => print!("\n{listing}"),
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        }
    }
}

/// Decodes creation bytes and prints the header, data words and disassembly.
fn run_inspect(text: &str) {
    let creation = CreationBytes::from_base58(text).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });
    let header = creation.header;

    println!("version           {}", header.version);
    println!("code pages        {}", header.code_pages);
    println!("data pages        {}", header.data_pages);
    println!("call stack pages  {}", header.call_stack_pages);
    println!("user stack pages  {}", header.user_stack_pages);
    println!("min activation    {}", header.min_activation);
    println!("code hash         {}", creation.code_hash());
    println!("total size        {}", creation.encoded_len());

    println!("\ndata:");
    for (slot, word) in creation.data.chunks_exact(WORD_SIZE).enumerate() {
        println!("@{slot:<3} {}", to_hex(word));
    }

    match disassemble(&creation.code) {
        Ok(listing) => print!("\ncode:\n{listing}"),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

const USAGE: &str = "\
USAGE:
    {program} <window-minutes> <goal> <awardee-address> [OPTIONS]
    {program} --inspect <base58-creation-bytes>

ARGS:
    <window-minutes>     Entry window length, 10 to 43200
    <goal>               Funding goal, up to 8 decimals (e.g. 10.4)
    <awardee-address>    Address paid when the goal is reached

OPTIONS:
    --hex                Print creation bytes as hex instead of Base58
    --disasm             Also print the code listing
    -q, --quiet          Only log warnings and errors
    --inspect <bytes>    Decode Base58 creation bytes and print their contents
    -h, --help           Print this help message

ENVIRONMENT:
    CROWDFUND_LOG               Minimum log level: info, warn or error
    CROWDFUND_LOG_TIMESTAMPS    Set to 0 to drop timestamps from log lines

EXAMPLES:
    {program} 1440 10.4 QLhKCGi5ZvnS9amYgdA353vzbdbWYBoxD8
    {program} 60 0.5 QLhKCGi5ZvnS9amYgdA353vzbdbWYBoxD8 --hex --disasm
";

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}

/// Prints usage and a one-line diagnostic, then exits with status 1.
fn usage_error(program: &str, message: &str) -> ! {
    print_usage(program);
    eprintln!("{message}");
    process::exit(1);
}
