use ovs::{Ovs, PortField, Recorder, Tools};

/// Prints the flows that would drop TCP traffic to a port range, without touching the host.
///
/// Usage: `cargo run --example port_range -- 1000 1999`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    let mut args = std::env::args().skip(1);
    let low = ovs::parse_int(&args.next().unwrap_or_else(|| "1000".to_string()))?;
    let high = ovs::parse_int(&args.next().unwrap_or_else(|| "1999".to_string()))?;

    let ovs = Ovs::with_executor(Tools::default(), Recorder::new());
    let n = ovs.add_port_range_flows(
        "br0",
        "priority=100,tcp",
        PortField::TcpDst,
        u16::try_from(low)?,
        u16::try_from(high)?,
        "drop",
    )?;

    println!("{n} flows for ports {low}-{high}:");
    for line in ovs.executor().lines() {
        println!("  {line}");
    }

    Ok(())
}
