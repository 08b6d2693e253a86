//! Print a snapshot of every zone of the system zone database, or of the zone matching a name.
//!
//! Usage: `cargo run --example list_zones -- [--no-dst] [NAME]`

use tz_resolver::{ResolverConfig, TimezoneResolver, ZoneSnapshot};

fn print_snapshot(snapshot: &ZoneSnapshot) {
    println!(
        "{:<48} {:<8} dst={:<5} offset={:>5} system_offset={:>5} {}",
        snapshot.full_name(),
        snapshot.name(),
        snapshot.is_dst(),
        snapshot.utc_offset_minutes(),
        snapshot.system_time_offset_minutes(),
        snapshot.local_time()
    );
}

fn main() -> tz_resolver::Result<()> {
    env_logger::init();

    let mut config = ResolverConfig::default();
    let mut name = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-dst" => config.consider_dst = false,
            _ => name = Some(arg),
        }
    }

    let resolver = TimezoneResolver::system();

    match name {
        Some(name) => match resolver.find_by_name(&name, None, config)? {
            Some(snapshot) => print_snapshot(&snapshot),
            None => println!("no zone named {name}"),
        },
        None => resolver.list_all(None, config)?.iter().for_each(print_snapshot),
    }

    Ok(())
}
