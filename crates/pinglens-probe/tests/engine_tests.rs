use pinglens_probe::{PingSettings, ProbeEngine, ProbeError, RoundError, SystemPingEngine};

#[test]
fn rejects_bad_settings() {
    let zero_timeout = PingSettings {
        timeout_secs: 0.0,
        ..PingSettings::default()
    };
    assert!(matches!(
        SystemPingEngine::new(zero_timeout),
        Err(ProbeError::Setup(_))
    ));

    let zero_ttl = PingSettings {
        ttl: 0,
        ..PingSettings::default()
    };
    assert!(SystemPingEngine::new(zero_ttl).is_err());
}

#[test]
fn registration_keeps_order_and_rejects_duplicates() {
    let mut engine = SystemPingEngine::new(PingSettings::default()).unwrap();
    let first = engine.add_target("127.0.0.1").unwrap();
    let second = engine.add_target("::1").unwrap();
    assert_eq!(first.address, "127.0.0.1");
    assert_eq!(second.address, "::1");
    assert!(matches!(
        engine.add_target("127.0.0.1"),
        Err(ProbeError::Duplicate { .. })
    ));

    let hosts: Vec<&str> = engine.replies().iter().map(|r| r.hostname.as_str()).collect();
    assert_eq!(hosts, vec!["127.0.0.1", "::1"]);
    assert!(engine.replies().iter().all(|r| r.latency_ms.is_none()));
}

#[test]
fn missing_binary_is_fatal() {
    let mut engine =
        SystemPingEngine::with_program("/nonexistent/pinglens-ping", PingSettings::default())
            .unwrap();
    engine.add_target("127.0.0.1").unwrap();
    assert!(matches!(engine.issue_round(), Err(RoundError::Fatal(_))));
}

#[cfg(unix)]
#[test]
fn silent_child_counts_as_timeout() {
    let mut engine = SystemPingEngine::with_program("true", PingSettings::default()).unwrap();
    engine.add_target("127.0.0.1").unwrap();
    engine.issue_round().unwrap();
    engine.issue_round().unwrap();

    let reply = &engine.replies()[0];
    assert_eq!(reply.sequence, 2);
    assert!(reply.latency_ms.is_none());
    assert_eq!(reply.to_sample(0).target_index, 0);
}

#[cfg(unix)]
#[test]
fn replies_carry_configured_qos() {
    let settings = PingSettings {
        qos: 0xb8,
        ..PingSettings::default()
    };
    let mut engine = SystemPingEngine::with_program("true", settings).unwrap();
    engine.add_target("127.0.0.1").unwrap();
    assert_eq!(engine.replies()[0].qos, 0xb8);
    engine.issue_round().unwrap();
    assert_eq!(engine.replies()[0].to_sample(0).qos, 0xb8);
}
