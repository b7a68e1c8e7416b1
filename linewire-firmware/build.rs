//! Build script for linewire-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml at compile time
//! - Generates `link_config.rs` with the validated settings

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Baud rate range the PL011 driver accepts (mirrors linewire-hal)
const MIN_BAUDRATE: i64 = 300;
const MAX_BAUDRATE: i64 = 921_600;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Settings extracted from link.toml
struct LinkConfig {
    baudrate: i64,
    data_bits: &'static str,
    parity: &'static str,
    stop_bits: &'static str,
    greeting: String,
    prefix: String,
    prompt: String,
}

/// Validate link.toml configuration at compile time
fn validate_config() -> LinkConfig {
    // Re-run if link.toml changes
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: link.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a link.toml configuration file.           ║\n\
            ║  Please create one in the linewire-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read link.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in link.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let (baudrate, data_bits, parity, stop_bits) = validate_uart(&config);
    let (greeting, prefix, prompt) = validate_echo(&config);

    println!("cargo:warning=link.toml validated successfully");

    LinkConfig {
        baudrate,
        data_bits,
        parity,
        stop_bits,
        greeting,
        prefix,
        prompt,
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fail the build with a boxed list of errors
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn report_errors(title: &str, errors: &[String]) {
    if !errors.is_empty() {
        fail(title, errors);
    }
}

/// Validate the [uart] section, returning enum variant names for codegen
fn validate_uart(config: &toml::Value) -> (i64, &'static str, &'static str, &'static str) {
    let uart = match config.get("uart") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => fail("Invalid uart configuration", &["[uart] must be a table".to_string()]),
        None => fail(
            "Missing required sections in link.toml",
            &["Missing [uart] section".to_string()],
        ),
    };

    let mut errors = Vec::new();

    let baudrate = match uart.get("baudrate") {
        Some(toml::Value::Integer(baud)) => {
            if !(MIN_BAUDRATE..=MAX_BAUDRATE).contains(baud) {
                errors.push(format!(
                    "[uart] baudrate must be {}-{}",
                    MIN_BAUDRATE, MAX_BAUDRATE
                ));
            }
            *baud
        }
        Some(_) => {
            errors.push("[uart] baudrate must be an integer".into());
            0
        }
        None => {
            errors.push("[uart] missing 'baudrate'".into());
            0
        }
    };

    let data_bits = match uart.get("data_bits") {
        None | Some(toml::Value::Integer(8)) => "Eight",
        Some(toml::Value::Integer(7)) => "Seven",
        Some(_) => {
            errors.push("[uart] data_bits must be 7 or 8".into());
            "Eight"
        }
    };

    let parity = match uart.get("parity") {
        None => "Even",
        Some(toml::Value::String(p)) => match p.as_str() {
            "none" => "None",
            "even" => "Even",
            "odd" => "Odd",
            _ => {
                errors.push("[uart] parity must be 'none', 'even', or 'odd'".into());
                "Even"
            }
        },
        Some(_) => {
            errors.push("[uart] parity must be a string".into());
            "Even"
        }
    };

    let stop_bits = match uart.get("stop_bits") {
        None | Some(toml::Value::Integer(1)) => "One",
        Some(toml::Value::Integer(2)) => "Two",
        Some(_) => {
            errors.push("[uart] stop_bits must be 1 or 2".into());
            "One"
        }
    };

    report_errors("Invalid uart configuration", &errors);
    (baudrate, data_bits, parity, stop_bits)
}

/// Validate the optional [echo] section, filling in defaults
fn validate_echo(config: &toml::Value) -> (String, String, String) {
    let mut greeting = String::from("Hello! I'm your echo bot.\r\n");
    let mut prefix = String::from("\r\nEcho: ");
    let mut prompt = String::from("Tell me something and press enter: ");

    let echo = match config.get("echo") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => fail("Invalid echo configuration", &["[echo] must be a table".to_string()]),
        None => return (greeting, prefix, prompt),
    };

    let mut errors = Vec::new();

    for (key, slot) in [
        ("greeting", &mut greeting),
        ("prefix", &mut prefix),
        ("prompt", &mut prompt),
    ] {
        match echo.get(key) {
            Some(toml::Value::String(s)) => *slot = s.clone(),
            Some(_) => errors.push(format!("[echo] {} must be a string", key)),
            None => {}
        }
    }

    report_errors("Invalid echo configuration", &errors);
    (greeting, prefix, prompt)
}

/// Write the validated settings as Rust constants into OUT_DIR
fn generate_config(config: &LinkConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("link_config.rs")).unwrap();

    writeln!(f, "/// UART framing from link.toml").unwrap();
    writeln!(f, "pub const UART: UartConfig = UartConfig {{").unwrap();
    writeln!(f, "    baudrate: {},", config.baudrate).unwrap();
    writeln!(f, "    data_bits: DataBits::{},", config.data_bits).unwrap();
    writeln!(f, "    parity: Parity::{},", config.parity).unwrap();
    writeln!(f, "    stop_bits: StopBits::{},", config.stop_bits).unwrap();
    writeln!(f, "}};").unwrap();
    writeln!(f).unwrap();
    writeln!(f, "/// Echo strings from link.toml").unwrap();
    writeln!(f, "pub const ECHO: EchoFormat = EchoFormat {{").unwrap();
    writeln!(f, "    greeting: {:?},", config.greeting).unwrap();
    writeln!(f, "    prefix: {:?},", config.prefix).unwrap();
    writeln!(f, "    prompt: {:?},", config.prompt).unwrap();
    writeln!(f, "    ..EchoFormat::DEFAULT").unwrap();
    writeln!(f, "}};").unwrap();
}
