use rand::Rng;

use ovs::{decompose_ports, MaskedValue, Ovs, PortField, Recorder, Reply, Tools};

/// Parses a `0xVALUE/0xMASK` match value back into its parts.
fn parse_masked(s: &str) -> (u16, u16) {
    let (value, mask) = s.split_once('/').unwrap();
    let value = u16::from_str_radix(value.trim_start_matches("0x"), 16).unwrap();
    let mask = u16::from_str_radix(mask.trim_start_matches("0x"), 16).unwrap();
    (value, mask)
}

fn installed_masks(lines: &[String]) -> Vec<(u16, u16)> {
    lines
        .iter()
        .map(|line| {
            let m = line.split("tcp_dst=").nth(1).unwrap();
            parse_masked(m.split(',').next().unwrap())
        })
        .collect()
}

#[test]
fn installed_flows_match_exactly_the_range() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let a: u16 = rng.gen();
        let b: u16 = rng.gen();
        let (low, high) = (a.min(b), a.max(b));

        let ovs = Ovs::with_executor(Tools::default(), Recorder::new());
        let n = ovs
            .add_port_range_flows("br0", "priority=10,tcp", PortField::TcpDst, low, high, "drop")
            .unwrap();

        let masks = installed_masks(&ovs.executor().lines());
        assert_eq!(masks.len(), n);

        // Sampled ports: the boundaries, their neighbours and a few random ones.
        let mut ports = vec![low, high, low.saturating_sub(1), high.saturating_add(1)];
        ports.extend((0..32).map(|_| rng.gen::<u16>()));

        for port in ports {
            let hits = masks.iter().filter(|(value, mask)| port & mask == *value).count();
            let expected = usize::from((low..=high).contains(&port));
            assert_eq!(hits, expected, "port {port} in {low}-{high}");
        }
    }
}

#[test]
fn port_rule_masking_matches_cover() {
    let cover = decompose_ports(1000, 1999).unwrap();
    let masks = ovs::port_rule_masking(1000, 1999).unwrap();

    let rendered: Vec<_> = cover.iter().map(MaskedValue::to_string).collect();
    assert_eq!(masks, rendered);
    assert_eq!(cover.iter().map(MaskedValue::size).sum::<u128>(), 1000);
}

#[test]
fn bridge_setup_sequence() {
    let recorder = Recorder::new()
        .stdout("")
        .stdout("")
        .stdout("")
        .reply(Reply::Stdout(" 1(eth1): addr:52:54:00:12:34:56\n LOCAL(br0): addr:52:54:00:12:34:57\n".into()));
    let ovs = Ovs::with_executor(Tools::default().with_sudo("sudo"), recorder);

    ovs.create_bridge("br0", true).unwrap();
    ovs.add_port("br0", "eth1", 1).unwrap();
    let ports = ovs.list_all_of_ports("br0").unwrap();

    assert_eq!(ports.get("eth1"), Some(&1));
    assert_eq!(
        ovs.executor().lines(),
        [
            "sudo ovs-vsctl --may-exist add-br br0 -- set-fail-mode br0 secure",
            "sudo ip link set br0 up",
            "sudo ovs-vsctl --may-exist add-port br0 eth1 -- set interface eth1 ofport_request=1",
            "sudo ovs-ofctl show br0",
        ]
    );
}
