// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - command line parsing and the render pipeline

#[cfg(test)]
mod tests {
    use super::super::{
        build_chain, format_endpoints, load_config, load_endpoints, render_endpoints, Cli,
        Command, OutputFormat,
    };
    use clap::Parser;
    use dnsource::config::SourceConfig;
    use dnsource::endpoint::{Endpoint, RecordType, Targets, Ttl};
    use dnsource::source::{Source, StaticSource};
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_render_command() {
        let cli = Cli::try_parse_from([
            "dnsource",
            "render",
            "--endpoints",
            "endpoints.yaml",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Render {
                endpoints,
                config,
                format,
                metrics,
            } => {
                assert_eq!(endpoints, PathBuf::from("endpoints.yaml"));
                assert!(config.is_none());
                assert_eq!(format, OutputFormat::Json);
                assert!(!metrics);
            }
            Command::Watch { .. } => panic!("expected render command"),
        }
    }

    #[test]
    fn test_render_requires_endpoints_file() {
        assert!(Cli::try_parse_from(["dnsource", "render"]).is_err());
    }

    #[test]
    fn test_parse_watch_command_defaults() {
        let cli = Cli::try_parse_from(["dnsource", "watch"]).unwrap();

        match cli.command {
            Command::Watch {
                config,
                interval_secs,
            } => {
                assert!(config.is_none());
                assert_eq!(interval_secs, 60);
            }
            Command::Render { .. } => panic!("expected watch command"),
        }
    }

    #[test]
    fn test_load_config_defaults_without_file() {
        assert_eq!(load_config(None).unwrap(), SourceConfig::default());
    }

    #[test]
    fn test_load_endpoints_list_layout() {
        let file = write_temp(
            r#"
- dnsName: www.example.com
  recordType: A
  targets: ["192.0.2.1"]
- dnsName: alias.example.com
  recordType: CNAME
  targets: ["www.example.com"]
"#,
        );

        let endpoints = load_endpoints(file.path()).unwrap();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[1].record_type, RecordType::Cname);
    }

    #[test]
    fn test_load_endpoints_spec_layout() {
        let file = write_temp(
            r#"{"endpoints": [{"dnsName": "www.example.com", "recordType": "A", "targets": ["192.0.2.1"]}]}"#,
        );

        let endpoints = load_endpoints(file.path()).unwrap();

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].dns_name, "www.example.com");
    }

    #[test]
    fn test_load_endpoints_rejects_garbage() {
        let file = write_temp("just a string");

        assert!(load_endpoints(file.path()).is_err());
    }

    #[test]
    fn test_build_chain_rejects_invalid_config() {
        let config = SourceConfig {
            exclude_target_nets: vec!["not-a-cidr".to_string()],
            ..Default::default()
        };

        assert!(build_chain(StaticSource::default(), &config).is_err());
    }

    #[test]
    fn test_build_chain_rejects_invalid_nat64_prefix() {
        let config = SourceConfig {
            nat64_prefixes: vec!["192.0.2.0/24".to_string()],
            ..Default::default()
        };

        assert!(build_chain(StaticSource::default(), &config).is_err());
    }

    #[tokio::test]
    async fn test_build_chain_adds_nat64_companions() {
        let config = SourceConfig {
            nat64_prefixes: vec!["2001:db8::/96".to_string()],
            ..Default::default()
        };
        let aaaa =
            Endpoint::new("www.example.com", RecordType::Aaaa, ["2001:db8::c000:22a"]).unwrap();
        let chain = build_chain(StaticSource::new(vec![aaaa]), &config).unwrap();

        let endpoints = chain.endpoints().await.unwrap();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[1].record_type, RecordType::A);
        assert_eq!(endpoints[1].targets, Targets::new(["192.0.2.42"]));
    }

    #[tokio::test]
    async fn test_build_chain_applies_every_wrapper() {
        let config = SourceConfig {
            exclude_target_nets: vec!["192.168.100.0/24".to_string()],
            default_ttl: 300,
            owner_id: Some("cluster-a".to_string()),
            ..Default::default()
        };
        let a = Endpoint::new("www.example.com", RecordType::A, ["1.2.3.4", "192.168.100.10"])
            .unwrap();
        let chain = build_chain(StaticSource::new(vec![a.clone(), a]), &config).unwrap();

        let endpoints = chain.endpoints().await.unwrap();

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].targets, Targets::new(["1.2.3.4"]));
        assert_eq!(endpoints[0].record_ttl, Ttl(300));
        assert!(endpoints[0].is_owned_by("cluster-a"));
    }

    #[tokio::test]
    async fn test_render_endpoints_merges_the_chain_output() {
        let endpoints = vec![
            Endpoint::new("example.com", RecordType::A, ["3.3.3.3"]).unwrap(),
            Endpoint::new("example.com", RecordType::A, ["1.1.1.1"]).unwrap(),
            Endpoint::new("example.com", RecordType::A, ["2.2.2.2"]).unwrap(),
        ];

        let rendered = render_endpoints(endpoints, &SourceConfig::default())
            .await
            .unwrap();

        assert_eq!(rendered.len(), 1);
        assert_eq!(
            rendered[0].targets,
            Targets::new(["1.1.1.1", "2.2.2.2", "3.3.3.3"])
        );
    }

    #[test]
    fn test_format_endpoints() {
        let endpoints =
            vec![Endpoint::new("www.example.com", RecordType::A, ["192.0.2.1"]).unwrap()];

        let json = format_endpoints(&endpoints, OutputFormat::Json).unwrap();
        assert!(json.contains("\"dnsName\": \"www.example.com\""));

        let yaml = format_endpoints(&endpoints, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("dnsName: www.example.com"));
        assert!(yaml.contains("recordType: A"));
    }
}
