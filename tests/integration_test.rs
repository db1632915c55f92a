// file: tests/integration_test.rs
// version: 2.1.0
// guid: z6a7b8c9-d0e1-2345-6789-012345zabcde

//! Integration tests for the provisioning pipeline

mod common;

use common::*;
use tempfile::TempDir;
use vsftpd_provisioner::{
    config::loader::ConfigLoader,
    logging::{InstallLog, LogLevel},
    provision::{EnvCredentials, Phase, Sequencer},
    system::RecordingSystem,
    ProvisionError, Result,
};

#[tokio::test]
async fn test_end_to_end_ubuntu_2204() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);
    let config = config_rooted_at(root);

    let mut sequencer = sequencer(
        root,
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::new(),
        "alice",
    );
    sequencer.run().await?;

    let successes: Vec<&str> = sequencer
        .log()
        .records()
        .iter()
        .filter(|r| r.level == LogLevel::Success)
        .map(|r| r.message.as_str())
        .collect();
    for phase in Phase::ALL {
        let prefix = format!("{} completed", phase);
        assert!(
            successes.iter().any(|m| m.starts_with(&prefix)),
            "missing SUCCESS record for {}",
            phase
        );
    }

    let written = std::fs::read_to_string(&config.paths.vsftpd_config)?;
    assert!(written.lines().any(|l| l == "chroot_local_user=YES"));
    assert!(written.lines().any(|l| l == "ssl_enable=YES"));

    assert_eq!(files_in(&config.paths.backup_dir).len(), 1);
    assert_eq!(std::fs::read_to_string(&config.paths.userlist_file)?, "alice\n");

    let report = sequencer.report();
    assert!(report.succeeded());
    assert_eq!(report.username.as_deref(), Some("alice"));
    assert_eq!(report.target.as_ref().map(|t| t.to_string()).as_deref(), Some("ubuntu 22.04"));

    let journal = std::fs::read_to_string(&config.paths.log_file)?;
    assert!(!journal.contains(GOOD_PASSWORD));
    Ok(())
}

#[tokio::test]
async fn test_commands_run_in_phase_order() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);

    let mut sequencer = sequencer(
        root,
        FixedProbe::ubuntu("24.04", 1000),
        RecordingSystem::new(),
        "alice",
    );
    sequencer.run().await?;

    let lines = sequencer.system().command_lines();
    let position = |needle: &str| {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("{} was never run", needle))
    };

    assert!(position("apt-get update") < position("install -y vsftpd"));
    assert!(position("install -y vsftpd") < position("openssl req"));
    assert!(position("openssl req") < position("restart fail2ban"));
    assert!(position("restart fail2ban") < position("ufw --force enable"));
    assert!(position("ufw --force enable") < position("useradd"));
    assert!(position("useradd") < position("restart vsftpd"));
    assert_eq!(lines.last().map(String::as_str), Some("systemctl enable vsftpd"));

    let useradds = lines.iter().filter(|l| l.starts_with("useradd")).count();
    assert_eq!(useradds, 1);
    Ok(())
}

#[tokio::test]
async fn test_certificate_validity_and_key_mode() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);
    let config = config_rooted_at(root);

    let mut sequencer = sequencer(
        root,
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::new(),
        "alice",
    );
    sequencer.run().await?;

    let lines = sequencer.system().command_lines();
    let openssl = lines
        .iter()
        .find(|l| l.starts_with("openssl req"))
        .unwrap();
    assert!(openssl.contains("-x509"));
    assert!(openssl.contains("-days 365"));
    assert!(lines.contains(&format!("chmod 600 {}", config.paths.key_file.display())));
    Ok(())
}

#[tokio::test]
async fn test_unsupported_os_changes_nothing() {
    for (id, version) in [("ubuntu", "20.04"), ("debian", "12"), ("ubuntu", "22.10")] {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let config = config_rooted_at(root);
        let probe = FixedProbe {
            id: id.to_string(),
            version_id: version.to_string(),
            ..FixedProbe::ubuntu("22.04", 1000)
        };

        let mut sequencer = sequencer(root, probe, RecordingSystem::new(), "alice");
        let err = sequencer.run().await.unwrap_err();

        assert!(err.is_precondition());
        assert_eq!(err.exit_code(), 1);
        assert!(sequencer.system().is_untouched());
        assert!(!config.paths.vsftpd_config.exists());
        assert!(!config.paths.backup_dir.exists());

        let only_log: Vec<_> = walk(root);
        assert_eq!(only_log, vec![config.paths.log_file.clone()]);

        let journal = std::fs::read_to_string(&config.paths.log_file).unwrap();
        assert!(journal.contains("[ERROR]"));
    }
}

#[tokio::test]
async fn test_low_disk_space_stops_before_packages() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);

    let mut sequencer = sequencer(
        root,
        FixedProbe::ubuntu("22.04", 499),
        RecordingSystem::new(),
        "alice",
    );
    let err = sequencer.run().await.unwrap_err();

    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("499"));
    assert!(!sequencer
        .system()
        .command_lines()
        .iter()
        .any(|l| l.starts_with("apt-get")));
    assert!(sequencer.report().completed_phases.is_empty());
}

#[tokio::test]
async fn test_non_root_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let probe = FixedProbe {
        uid: 1000,
        ..FixedProbe::ubuntu("22.04", 1000)
    };

    let mut sequencer = sequencer(root, probe, RecordingSystem::new(), "alice");
    let err = sequencer.run().await.unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::PhaseFailed {
            phase: Phase::Prerequisites,
            ..
        }
    ));
    assert!(err.to_string().contains("root"));
    assert!(sequencer.system().is_untouched());
}

#[tokio::test]
async fn test_missing_password_variable_does_not_mask_non_root() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_rooted_at(temp_dir.path());
    let log = InstallLog::open(&config.paths.log_file, false).unwrap();
    let probe = FixedProbe {
        uid: 1000,
        ..FixedProbe::ubuntu("22.04", 1000)
    };

    let mut sequencer = Sequencer::new(
        config,
        RecordingSystem::new(),
        Box::new(probe),
        Box::new(EnvCredentials::new(
            "alice",
            "VSFTPD_PROVISIONER_PASSWORD_NEVER_SET",
        )),
        log,
        false,
    );
    let err = sequencer.run().await.unwrap_err();

    assert!(err.is_precondition());
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_two_runs_keep_distinct_backups() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);
    let config = config_rooted_at(root);

    sequencer(
        root,
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::new(),
        "alice",
    )
    .run()
    .await?;
    let first_config = std::fs::read_to_string(&config.paths.vsftpd_config)?;

    let mut second = sequencer(
        root,
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::new(),
        "bob",
    );
    second.run().await?;

    let backups = files_in(&config.paths.backup_dir);
    assert_eq!(backups.len(), 2);
    assert_ne!(backups[0], backups[1]);

    let second_backup = second.report().backup_path.clone().unwrap();
    assert_eq!(std::fs::read_to_string(second_backup)?, first_config);

    // The allow-list is append-only across runs
    assert_eq!(
        std::fs::read_to_string(&config.paths.userlist_file)?,
        "alice\nbob\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_command_failure_halts_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);
    let config = config_rooted_at(root);
    let system = RecordingSystem::new().fail_when(
        "install -y vsftpd",
        100,
        "E: Unable to locate package vsftpd",
    );

    let mut sequencer = sequencer(root, FixedProbe::ubuntu("22.04", 1000), system, "alice");
    let err = sequencer.run().await.unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert!(matches!(
        err,
        ProvisionError::PhaseFailed {
            phase: Phase::ServerPackages,
            ..
        }
    ));
    assert!(err.to_string().contains("Unable to locate package"));

    let lines = sequencer.system().command_lines();
    assert!(!lines.iter().any(|l| l.starts_with("openssl")));
    assert!(!lines.iter().any(|l| l.starts_with("useradd")));
    assert_eq!(
        std::fs::read_to_string(&config.paths.vsftpd_config).unwrap(),
        STOCK_VSFTPD_CONF
    );

    let report = sequencer.report();
    assert_eq!(
        report.completed_phases,
        vec![Phase::Prerequisites, Phase::SystemPreparation]
    );
    assert_eq!(
        report.failure.as_ref().map(|f| f.phase),
        Some(Phase::ServerPackages)
    );
    assert!(sequencer
        .log()
        .records()
        .iter()
        .any(|r| r.level == LogLevel::Error && r.message.contains("partially configured")));
}

#[tokio::test]
async fn test_invalid_username_is_input_error() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);
    let config = config_rooted_at(root);

    let mut sequencer = sequencer(
        root,
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::new(),
        "",
    );
    let err = sequencer.run().await.unwrap_err();

    match &err {
        ProvisionError::PhaseFailed { phase, source } => {
            assert_eq!(*phase, Phase::AccountCreation);
            assert!(matches!(**source, ProvisionError::InputError(_)));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!config.paths.userlist_file.exists());
    assert!(!sequencer
        .system()
        .command_lines()
        .iter()
        .any(|l| l.contains("vsftpd") && l.starts_with("systemctl")));
}

#[tokio::test]
async fn test_fresh_host_without_config_makes_no_backup() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);
    let config = config_rooted_at(root);
    std::fs::remove_file(&config.paths.vsftpd_config)?;

    let mut sequencer = sequencer(
        root,
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::new(),
        "alice",
    );
    sequencer.run().await?;

    assert!(files_in(&config.paths.backup_dir).is_empty());
    assert!(sequencer.report().backup_path.is_none());
    assert!(config.paths.vsftpd_config.exists());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_touches_nothing() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);
    let config = config_rooted_at(root);

    let mut sequencer = sequencer(
        root,
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::dry_run(),
        "alice",
    );
    sequencer.run().await?;

    assert!(!sequencer.system().commands().is_empty());
    assert!(!sequencer.system().file_operations().is_empty());
    assert_eq!(
        std::fs::read_to_string(&config.paths.vsftpd_config)?,
        STOCK_VSFTPD_CONF
    );
    assert!(!config.paths.backup_dir.exists());
    assert!(!config.paths.userlist_file.exists());
    Ok(())
}

#[tokio::test]
async fn test_loaded_config_drives_rendered_files() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_host(root);

    let yaml = format!(
        r#"
paths:
  vsftpd_config: {root}/etc/vsftpd.conf
  userlist_file: {root}/etc/vsftpd.userlist
  backup_dir: {root}/etc/vsftpd/backups
  log_file: {root}/var/log/vsftpd-provisioner.log
  cert_file: {root}/etc/ssl/certs/vsftpd.pem
  key_file: {root}/etc/ssl/private/vsftpd.key
  fail2ban_jail: {root}/etc/fail2ban/jail.d/vsftpd.conf
  pam_password_file: {root}/etc/pam.d/common-password
  home_root: {root}/home
server:
  max_clients: 10
  pasv_min_port: 30000
  pasv_max_port: 30100
"#,
        root = root.display()
    );
    let config_path = root.join("provisioner.yaml");
    tokio::fs::write(&config_path, yaml).await?;

    let config = ConfigLoader::new().load_or_default(config_path.to_str())?;
    let mut sequencer = sequencer_with_config(
        config.clone(),
        FixedProbe::ubuntu("22.04", 1000),
        RecordingSystem::new(),
        "alice",
    );
    sequencer.run().await?;

    let written = std::fs::read_to_string(&config.paths.vsftpd_config)?;
    assert!(written.lines().any(|l| l == "max_clients=10"));
    assert!(written.lines().any(|l| l == "pasv_min_port=30000"));
    assert!(sequencer
        .system()
        .command_lines()
        .contains(&"ufw allow 30000:30100/tcp".to_string()));
    Ok(())
}

fn walk(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                files.extend(walk(&path));
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}
