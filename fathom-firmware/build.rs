//! Build script for fathom-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates node.toml at compile time
//! - Generates the node configuration module included by main.rs

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fathom_core::bridge::{
    baud, BridgeId, ChannelIndex, FifoTriggers, LineFormat, Parity, StopBits, WordLength,
    CHANNELS_PER_BRIDGE,
};
use fathom_core::config::{
    BridgeConfig, BringUpTiming, ChannelConfig, ConfigFault, I2cTargetConfig, NodeConfig,
    SpiTiming,
};

/// Settings that only the firmware binary uses
struct Relay {
    bridge: BridgeId,
    channel: ChannelIndex,
    poll_ms: u32,
}

fn main() {
    setup_linker();

    let config = load_config();
    let spi_frequency = parse_spi_frequency(&config);
    let node = parse_node(&config);
    let relay = parse_relay(&config);

    if let Err(fault) = node.validate() {
        fail("Invalid node configuration", &[describe_fault(&fault)]);
    }

    generate(&node, spi_frequency, &relay);

    println!("cargo:warning=node.toml validated successfully");
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse node.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");

    if !config_path.exists() {
        fail(
            "node.toml not found!",
            &[
                "The firmware requires a node.toml configuration file".to_string(),
                "in the fathom-firmware directory.".to_string(),
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read node.toml", &[e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in node.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    }
}

/// Abort the build with a boxed error report
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
            .map(|e| format!("║  • {:<62} ║", truncate(e)))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn truncate(line: &str) -> String {
    if line.chars().count() > 62 {
        format!("{}...", line.chars().take(59).collect::<String>())
    } else {
        line.to_string()
    }
}

fn table<'a>(config: &'a toml::Value, name: &str, errors: &mut Vec<String>) -> Option<&'a toml::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => {
            errors.push(format!("Missing [{}] section", name));
            None
        }
    }
}

fn integer(
    table: &toml::Table,
    section: &str,
    key: &str,
    max: i64,
    errors: &mut Vec<String>,
) -> u32 {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if (0..=max).contains(v) => *v as u32,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be 0-{}", section, key, max));
            0
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

fn parse_spi_frequency(config: &toml::Value) -> u32 {
    let mut errors = Vec::new();
    let frequency = table(config, "spi", &mut errors)
        .map(|spi| integer(spi, "spi", "frequency", 62_500_000, &mut errors))
        .unwrap_or(0);

    if frequency == 0 && errors.is_empty() {
        errors.push("[spi] frequency must be non-zero".to_string());
    }
    if !errors.is_empty() {
        fail("Invalid SPI configuration", &errors);
    }
    frequency
}

fn parse_node(config: &toml::Value) -> NodeConfig {
    let mut errors = Vec::new();
    let mut node = NodeConfig::default();

    if let Some(spi) = table(config, "spi", &mut errors) {
        node.spi = SpiTiming {
            write_setup_us: integer(spi, "spi", "write_setup_us", 1000, &mut errors),
            read_setup_us: integer(spi, "spi", "read_setup_us", 1000, &mut errors),
            hold_us: integer(spi, "spi", "hold_us", 1000, &mut errors),
        };
    }

    if let Some(bring_up) = table(config, "bring_up", &mut errors) {
        node.bring_up = BringUpTiming {
            reset_settle_ms: integer(bring_up, "bring_up", "reset_settle_ms", 1000, &mut errors),
            pll_lock_ms: integer(bring_up, "bring_up", "pll_lock_ms", 1000, &mut errors),
            final_settle_ms: integer(bring_up, "bring_up", "final_settle_ms", 1000, &mut errors),
        };
    }

    if let Some(i2c) = table(config, "i2c", &mut errors) {
        node.i2c = I2cTargetConfig {
            address: integer(i2c, "i2c", "address", 0x7F, &mut errors) as u8,
            register: integer(i2c, "i2c", "register", 0xFF, &mut errors) as u8,
            timeout_ms: integer(i2c, "i2c", "timeout_ms", 10_000, &mut errors),
        };
    }

    if let Some(bridges) = table(config, "bridge", &mut errors) {
        for id in BridgeId::ALL {
            let name = bridge_name(id);
            match bridges.get(name) {
                Some(toml::Value::Table(t)) => {
                    *node.bridge_mut(id) = parse_bridge(name, t, &mut errors);
                }
                Some(_) => errors.push(format!("[bridge.{}] must be a table", name)),
                None => errors.push(format!("Missing [bridge.{}] section", name)),
            }
        }
        for name in bridges.keys() {
            if !["a", "b", "c"].contains(&name.as_str()) {
                errors.push(format!("Unknown bridge '{}' (expected a, b or c)", name));
            }
        }
    }

    if !errors.is_empty() {
        fail("Invalid configuration in node.toml", &errors);
    }
    node
}

fn parse_bridge(name: &str, bridge: &toml::Table, errors: &mut Vec<String>) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    let section = format!("bridge.{}", name);

    match bridge.get("baud") {
        Some(toml::Value::Array(rates)) if rates.len() == CHANNELS_PER_BRIDGE => {
            for (i, rate) in rates.iter().enumerate() {
                match rate.as_integer().map(|r| (r, baud::from_setting(r))) {
                    Some((_, Some(rate))) => config.channels[i].baud_rate = rate,
                    Some((r, None)) => errors.push(format!(
                        "[{}] channel {} baud {} is not supported",
                        section, i, r
                    )),
                    None => errors.push(format!("[{}] baud entries must be integers", section)),
                }
            }
        }
        Some(_) => errors.push(format!(
            "[{}] baud must list {} rates",
            section, CHANNELS_PER_BRIDGE
        )),
        None => errors.push(format!("[{}] missing 'baud'", section)),
    }

    match bridge.get("format") {
        Some(toml::Value::Array(formats)) if formats.len() == CHANNELS_PER_BRIDGE => {
            for (i, format) in formats.iter().enumerate() {
                match format.as_str().and_then(parse_format) {
                    Some(line) => config.channels[i].line = line,
                    None => errors.push(format!(
                        "[{}] channel {} format must look like \"8N1\"",
                        section, i
                    )),
                }
            }
        }
        Some(_) => errors.push(format!(
            "[{}] format must list {} entries",
            section, CHANNELS_PER_BRIDGE
        )),
        // Optional, defaults to 8N1
        None => {}
    }

    config
}

/// Parse a "8N1"-style line format
fn parse_format(s: &str) -> Option<LineFormat> {
    let mut chars = s.chars();
    let word_length = match chars.next()? {
        '5' => WordLength::Five,
        '6' => WordLength::Six,
        '7' => WordLength::Seven,
        '8' => WordLength::Eight,
        _ => return None,
    };
    let parity = match chars.next()?.to_ascii_uppercase() {
        'N' => Parity::None,
        'O' => Parity::Odd,
        'E' => Parity::Even,
        _ => return None,
    };
    let stop_bits = match chars.next()? {
        '1' => StopBits::One,
        '2' => StopBits::Two,
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(LineFormat {
        word_length,
        parity,
        stop_bits,
    })
}

fn parse_relay(config: &toml::Value) -> Relay {
    let mut errors = Vec::new();
    let mut relay = Relay {
        bridge: BridgeId::A,
        channel: ChannelIndex::CH0,
        poll_ms: 5,
    };

    if let Some(t) = table(config, "relay", &mut errors) {
        match t.get("bridge").and_then(|b| b.as_str()) {
            Some("a") => relay.bridge = BridgeId::A,
            Some("b") => relay.bridge = BridgeId::B,
            Some("c") => relay.bridge = BridgeId::C,
            _ => errors.push("[relay] bridge must be \"a\", \"b\" or \"c\"".to_string()),
        }
        let channel = integer(t, "relay", "channel", 3, &mut errors);
        match ChannelIndex::new(channel as u8) {
            Ok(c) => relay.channel = c,
            Err(_) => errors.push("[relay] channel must be 0-3".to_string()),
        }
        relay.poll_ms = integer(t, "relay", "poll_ms", 1000, &mut errors);
        if relay.poll_ms == 0 {
            errors.push("[relay] poll_ms must be non-zero".to_string());
        }
    }

    if !errors.is_empty() {
        fail("Invalid relay configuration", &errors);
    }
    relay
}

fn bridge_name(id: BridgeId) -> &'static str {
    match id {
        BridgeId::A => "a",
        BridgeId::B => "b",
        BridgeId::C => "c",
    }
}

fn describe_fault(fault: &ConfigFault) -> String {
    match fault {
        ConfigFault::BadHeader => "bad header".to_string(),
        ConfigFault::UnsupportedBaudRate {
            bridge,
            channel,
            baud,
        } => format!(
            "bridge {} channel {}: unsupported baud {}",
            bridge_name(*bridge),
            channel.get(),
            baud
        ),
        ConfigFault::FifoTrigger { bridge, channel } => format!(
            "bridge {} channel {}: FIFO trigger out of range",
            bridge_name(*bridge),
            channel.get()
        ),
        ConfigFault::I2cAddress(addr) => format!("I2C address {:#04x} is not 7-bit", addr),
    }
}

/// Write `$OUT_DIR/node_config.rs`
fn generate(node: &NodeConfig, spi_frequency: u32, relay: &Relay) {
    let mut out = String::new();

    writeln!(out, "// Generated by build.rs from node.toml. Do not edit.").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "use fathom_core::bridge::{{BridgeId, ChannelIndex, FifoTriggers, LineFormat, Parity, StopBits, WordLength}};").unwrap();
    writeln!(out, "use fathom_core::config::{{BridgeConfig, BringUpTiming, ChannelConfig, I2cTargetConfig, NodeConfig, SpiTiming, CONFIG_MAGIC, CONFIG_VERSION}};").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "/// SPI clock (Hz)").unwrap();
    writeln!(out, "pub const SPI_FREQUENCY: u32 = {};", spi_frequency).unwrap();
    writeln!(out, "/// Port that receives terminal bytes").unwrap();
    writeln!(out, "pub const RELAY_BRIDGE: BridgeId = BridgeId::{:?};", relay.bridge).unwrap();
    writeln!(
        out,
        "pub const RELAY_CHANNEL: ChannelIndex = ChannelIndex::CH{};",
        relay.channel.get()
    )
    .unwrap();
    writeln!(out, "/// Bridge polling period (ms)").unwrap();
    writeln!(out, "pub const RELAY_POLL_MS: u64 = {};", relay.poll_ms).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "pub fn node_config() -> NodeConfig {{").unwrap();
    writeln!(out, "    NodeConfig {{").unwrap();
    writeln!(out, "        magic: CONFIG_MAGIC,").unwrap();
    writeln!(out, "        version: CONFIG_VERSION,").unwrap();
    writeln!(out, "        bridges: [").unwrap();
    for bridge in &node.bridges {
        writeln!(out, "            BridgeConfig {{").unwrap();
        writeln!(out, "                channels: [").unwrap();
        for channel in &bridge.channels {
            writeln!(out, "                    {},", channel_literal(channel)).unwrap();
        }
        writeln!(out, "                ],").unwrap();
        writeln!(out, "            }},").unwrap();
    }
    writeln!(out, "        ],").unwrap();
    writeln!(
        out,
        "        spi: SpiTiming {{ write_setup_us: {}, read_setup_us: {}, hold_us: {} }},",
        node.spi.write_setup_us, node.spi.read_setup_us, node.spi.hold_us
    )
    .unwrap();
    writeln!(
        out,
        "        bring_up: BringUpTiming {{ reset_settle_ms: {}, pll_lock_ms: {}, final_settle_ms: {} }},",
        node.bring_up.reset_settle_ms, node.bring_up.pll_lock_ms, node.bring_up.final_settle_ms
    )
    .unwrap();
    writeln!(
        out,
        "        i2c: I2cTargetConfig {{ address: {:#04x}, register: {:#04x}, timeout_ms: {} }},",
        node.i2c.address, node.i2c.register, node.i2c.timeout_ms
    )
    .unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("node_config.rs"), out).unwrap();
}

fn channel_literal(channel: &ChannelConfig) -> String {
    let FifoTriggers { rx, tx } = channel.fifo;
    format!(
        "ChannelConfig {{ baud_rate: {}, line: LineFormat {{ word_length: WordLength::{:?}, parity: Parity::{:?}, stop_bits: StopBits::{:?} }}, fifo: FifoTriggers {{ rx: {}, tx: {} }} }}",
        channel.baud_rate,
        channel.line.word_length,
        channel.line.parity,
        channel.line.stop_bits,
        rx,
        tx
    )
}
