//! Policy fixtures for unit tests

use sepolgraph_policy::{Policy, PolicyBuilder};

/// Policy declaring `init_t`, `httpd_t` and `httpd_exec_t`, with rules added
/// by `rules`
pub(crate) fn policy_with(version: u32, rules: impl FnOnce(&mut PolicyBuilder)) -> Policy {
    let mut b = PolicyBuilder::new().with_version(version);
    b.declare_type("init_t").unwrap();
    b.declare_type("httpd_t").unwrap();
    b.declare_type("httpd_exec_t").unwrap();
    rules(&mut b);
    b.build()
}

/// init_t -> httpd_t through httpd_exec_t
pub(crate) fn httpd_policy(version: u32, with_type_transition: bool) -> Policy {
    policy_with(version, |b| {
        b.allow("init_t", "httpd_t", "process", &["transition"]).unwrap();
        b.allow("init_t", "httpd_exec_t", "file", &["execute"]).unwrap();
        b.allow("httpd_t", "httpd_exec_t", "file", &["execute", "entrypoint"])
            .unwrap();
        if with_type_transition {
            b.type_transition("init_t", "httpd_exec_t", "process", "httpd_t")
                .unwrap();
        }
    })
}
