//! Test policy fixtures
//!
//! The `init_t` / `httpd_t` / `httpd_exec_t` family of policies used across
//! the integration tests.

use sepolgraph_policy::{Policy, PolicyBuilder};

pub const INIT: &str = "init_t";
pub const HTTPD: &str = "httpd_t";
pub const HTTPD_EXEC: &str = "httpd_exec_t";

/// Builder with the three base types declared
pub fn fixture_builder(version: u32) -> PolicyBuilder {
    super::init_tracing();
    let mut b = PolicyBuilder::new().with_version(version);
    for name in [INIT, HTTPD, HTTPD_EXEC] {
        b.declare_type(name).unwrap();
    }
    b
}

/// init_t -> httpd_t through httpd_exec_t
///
/// `allow init_t httpd_t : process transition;`
/// `allow init_t httpd_exec_t : file execute;`
/// `allow httpd_t httpd_exec_t : file { execute entrypoint };`
/// `type_transition init_t httpd_exec_t : process httpd_t;` (optional)
pub fn fixture_httpd_policy(version: u32, with_type_transition: bool) -> Policy {
    let mut b = fixture_builder(version);
    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    b.allow(INIT, HTTPD_EXEC, "file", &["execute"]).unwrap();
    b.allow(HTTPD, HTTPD_EXEC, "file", &["execute", "entrypoint"])
        .unwrap();
    if with_type_transition {
        b.type_transition(INIT, HTTPD_EXEC, "process", HTTPD)
            .unwrap();
    }
    b.build()
}

/// httpd policy plus a log type and access rules from httpd_t
pub fn fixture_httpd_with_logs(version: u32) -> Policy {
    let mut b = fixture_builder(version);
    b.declare_type("httpd_log_t").unwrap();
    b.declare_type("etc_t").unwrap();
    b.declare_attribute("logfile").unwrap();
    b.assign("httpd_log_t", "logfile").unwrap();
    b.alias(HTTPD, "apache_t").unwrap();

    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    b.allow(INIT, HTTPD_EXEC, "file", &["execute"]).unwrap();
    b.allow(HTTPD, HTTPD_EXEC, "file", &["execute", "entrypoint"])
        .unwrap();
    b.type_transition(INIT, HTTPD_EXEC, "process", HTTPD)
        .unwrap();
    b.allow(HTTPD, "logfile", "file", &["append", "open"]).unwrap();
    b.allow(HTTPD, "etc_t", "file", &["read"]).unwrap();
    b.build()
}

/// Two daemons started from init_t, one of them through an attribute
///
/// `sshd_t` is reached through `daemon_domain`, so its process transition
/// rule is written against an attribute.
pub fn fixture_daemons_policy(version: u32) -> Policy {
    let mut b = fixture_builder(version);
    b.declare_type("sshd_t").unwrap();
    b.declare_type("sshd_exec_t").unwrap();
    b.declare_attribute("init_domain").unwrap();
    b.declare_type("initrc_t").unwrap();
    b.assign(INIT, "init_domain").unwrap();
    b.assign("initrc_t", "init_domain").unwrap();

    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    b.allow(INIT, HTTPD_EXEC, "file", &["execute"]).unwrap();
    b.allow(HTTPD, HTTPD_EXEC, "file", &["entrypoint"]).unwrap();
    b.type_transition(INIT, HTTPD_EXEC, "process", HTTPD)
        .unwrap();

    b.allow("init_domain", "sshd_t", "process", &["transition"])
        .unwrap();
    b.allow("init_domain", "sshd_exec_t", "file", &["execute"])
        .unwrap();
    b.allow("sshd_t", "sshd_exec_t", "file", &["entrypoint"])
        .unwrap();
    b.type_transition("init_domain", "sshd_exec_t", "process", "sshd_t")
        .unwrap();
    b.build()
}
