//! Build script for herald-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates herald.toml at compile time
//! - Checks that the CYW43 radio firmware blobs are present

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Radio firmware expected next to Cargo.toml
const CYW43_BLOBS: [&str; 2] = ["cyw43-firmware/43439A0.bin", "cyw43-firmware/43439A0_clm.bin"];

/// Keys accepted at the top level of herald.toml
const ROOT_KEYS: &[&str] = &[
    "resolume_host",
    "resolume_port",
    "text_address_path",
    "opacity_address_path",
    "connect_address_path",
    "group_address_path",
    "group_on_value",
    "auto_clear_delay_s",
    "debounce_window_ms",
    "ready_message",
    "ready_message_s",
    "display",
    "wifi",
];

fn main() {
    setup_linker();
    validate_config();
    check_radio_firmware();
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

/// Validate herald.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=herald.toml");

    let config_path = Path::new("herald.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: herald.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds herald.toml as its default configuration.   ║\n\
            ║  Please create one in the herald-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read herald.toml                               ║\n\
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
                ║  ERROR: Invalid TOML syntax in herald.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_resolume(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_wifi(&config, &mut errors);
    report("Invalid configuration in herald.toml", &errors);

    println!("cargo:warning=herald.toml validated successfully");
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

/// Panic with all collected errors, if any
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
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

fn integer_in(
    table: &toml::Value,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(v)) if range.contains(v) => {}
        Some(_) => errors.push(format!(
            "'{}' must be an integer in {}..={}",
            key,
            range.start(),
            range.end()
        )),
    }
}

fn check_address(config: &toml::Value, key: &str, required: bool, errors: &mut Vec<String>) {
    match config.get(key) {
        None if required => errors.push(format!("missing '{}'", key)),
        None => {}
        Some(toml::Value::String(path)) => {
            if !path.starts_with('/') {
                errors.push(format!("'{}' must start with '/'", key));
            } else if path.chars().any(|c| c.is_whitespace() || !c.is_ascii()) {
                errors.push(format!("'{}' must be ASCII without spaces", key));
            } else if path.len() > 128 {
                errors.push(format!("'{}' is longer than 128 bytes", key));
            }
        }
        Some(_) => errors.push(format!("'{}' must be a string", key)),
    }
}

fn validate_resolume(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(table) = config.as_table() {
        for key in table.keys() {
            if !ROOT_KEYS.contains(&key.as_str()) {
                errors.push(format!("unknown key '{}'", key));
            }
        }
    }

    match config.get("resolume_host") {
        None => errors.push("missing 'resolume_host'".to_string()),
        Some(toml::Value::String(host)) => match host.parse::<Ipv4Addr>() {
            Ok(ip) if ip.is_unspecified() => {
                errors.push("'resolume_host' must not be 0.0.0.0".to_string())
            }
            Ok(_) => {}
            Err(_) => errors.push(format!("'resolume_host' is not an IPv4 address: {}", host)),
        },
        Some(_) => errors.push("'resolume_host' must be a string".to_string()),
    }

    integer_in(config, "resolume_port", 1..=65535, errors);
    check_address(config, "text_address_path", true, errors);
    check_address(config, "opacity_address_path", true, errors);
    check_address(config, "connect_address_path", false, errors);
    check_address(config, "group_address_path", false, errors);
    integer_in(config, "group_on_value", i32::MIN as i64..=i32::MAX as i64, errors);
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    integer_in(config, "auto_clear_delay_s", 1..=65535, errors);
    integer_in(config, "debounce_window_ms", 1..=1000, errors);
    integer_in(config, "ready_message_s", 0..=65535, errors);

    match config.get("ready_message") {
        None => {}
        Some(toml::Value::String(msg)) if msg.len() <= 32 => {}
        Some(_) => errors.push("'ready_message' must be a string of at most 32 bytes".to_string()),
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display") else {
        return;
    };
    if !display.is_table() {
        errors.push("[display] must be a table".to_string());
        return;
    }
    integer_in(display, "scroll_speed_px", 1..=255, errors);
    integer_in(display, "frame_interval_ms", 1..=65535, errors);
}

fn validate_wifi(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(wifi) = config.get("wifi") else {
        println!("cargo:warning=herald.toml has no [wifi] section; the radio will not join a network");
        return;
    };

    match wifi.get("ssid") {
        Some(toml::Value::String(ssid)) if !ssid.is_empty() && ssid.len() <= 32 => {}
        _ => errors.push("[wifi] 'ssid' must be a string of 1 to 32 bytes".to_string()),
    }
    match wifi.get("password") {
        None => {}
        Some(toml::Value::String(pw)) if pw.len() <= 64 => {}
        Some(_) => errors.push("[wifi] 'password' must be a string of at most 64 bytes".to_string()),
    }
}

/// The radio blobs are not redistributed in this repository
fn check_radio_firmware() {
    let missing: Vec<String> = CYW43_BLOBS
        .iter()
        .filter(|blob| !Path::new(blob).exists())
        .map(|blob| format!("missing {}", blob))
        .collect();

    for blob in CYW43_BLOBS {
        println!("cargo:rerun-if-changed={}", blob);
    }

    if !missing.is_empty() {
        let mut errors = missing;
        errors.push("copy them from the embassy repository (cyw43-firmware/)".to_string());
        report("CYW43 radio firmware not found", &errors);
    }
}
