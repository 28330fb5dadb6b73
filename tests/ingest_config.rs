// tests/ingest_config.rs
use std::collections::BTreeMap;
use std::path::Path;

use feed_ingress::config::{self, Config, RedisConfig, SinkDescriptor};

fn testdata(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/testdata")
        .join(name)
}

fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn empty_config_loads_to_defaults() {
    let cfg = config::load(&testdata("empty.yaml")).unwrap();
    assert_eq!(cfg, Config::default());
    assert!(cfg.feeds.is_empty());
    assert!(cfg.outputs.is_empty());
    assert_eq!(cfg.redis.host, "");
}

#[test]
fn all_providers_config_loads_every_field() {
    let cfg = config::load(&testdata("all-providers.yaml")).unwrap();
    let expected = Config {
        feeds: vec!["example.com/feed.xml".to_string()],
        outputs: vec![
            SinkDescriptor {
                kind: "s3".into(),
                config: options(&[
                    ("endpoint", "https://s3.example.com"),
                    ("region", "test-region"),
                    ("accesskeyid", "test-key"),
                    ("accesssecret", "test-secret"),
                    ("bucket", "test-bucket"),
                    (
                        "keyformat",
                        "{{ published_parsed.utc.year }}/{{ published_parsed.utc.month }}/{{ published_parsed.utc.day }}",
                    ),
                ]),
            },
            SinkDescriptor {
                kind: "file".into(),
                config: options(&[(
                    "pathformat",
                    "./data/{{ published_parsed.utc.year }}/{{ published_parsed.utc.month }}/{{ published_parsed.utc.day }}",
                )]),
            },
            SinkDescriptor {
                kind: "kafka".into(),
                config: options(&[("broker", "127.0.0.1:9092"), ("topic", "feeds")]),
            },
            SinkDescriptor {
                kind: "discord".into(),
                config: options(&[("url", "https://discord.example.com/webhook")]),
            },
        ],
        redis: RedisConfig {
            host: "127.0.0.1:6379".into(),
        },
    };
    assert_eq!(cfg, expected);
}

#[test]
fn config_load_is_idempotent() {
    let path = testdata("all-providers.yaml");
    assert_eq!(config::load(&path).unwrap(), config::load(&path).unwrap());
}

#[test]
fn config_survives_a_yaml_round_trip() {
    let cfg = config::load(&testdata("all-providers.yaml")).unwrap();
    let serialized = serde_yaml::to_string(&cfg).unwrap();
    let reloaded: Config = serde_yaml::from_str(&serialized).unwrap();
    assert_eq!(cfg, reloaded);
}

#[tokio::test]
async fn all_providers_config_builds_four_sinks_in_declared_order() {
    let cfg = config::load(&testdata("all-providers.yaml")).unwrap();
    let sinks = feed_ingress::build_sinks(&cfg.outputs).unwrap();
    let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["s3", "file", "kafka", "discord"]);
}
