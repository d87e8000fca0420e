#![allow(dead_code)]

use std::fmt::Write;

/// Builder that renders build-file text, to keep test setup readable.
#[derive(Debug, Default, Clone)]
pub struct FabfileBuilder {
    text: String,
}

impl FabfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name <- deps { actions; }`
    pub fn rule(self, name: &str, deps: &[&str], actions: &[&str]) -> Self {
        self.rule_with_aliases(name, &[], deps, actions)
    }

    /// `name, alias... <- deps { actions; }`
    pub fn rule_with_aliases(
        mut self,
        name: &str,
        aliases: &[&str],
        deps: &[&str],
        actions: &[&str],
    ) -> Self {
        let mut header = name.to_string();
        for alias in aliases {
            header.push_str(", ");
            header.push_str(alias);
        }
        if !deps.is_empty() {
            header.push_str(" <- ");
            header.push_str(&deps.join(" "));
        }

        let _ = writeln!(self.text, "{header} {{");
        for action in actions {
            let _ = writeln!(self.text, "    {action};");
        }
        let _ = writeln!(self.text, "}}");
        self
    }

    /// `NAME := body;`
    pub fn macro_def(mut self, name: &str, body: &str) -> Self {
        let _ = writeln!(self.text, "{name} := {body};");
        self
    }

    /// Append raw text.
    pub fn raw(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self.text.push('\n');
        self
    }

    pub fn build(self) -> String {
        self.text
    }
}

/// The three-rule chain used throughout the tests:
/// `foo <- bar`, `bar <- baz`, `baz <- qux`, echoing 3, 2, 1.
pub fn chain_fabfile() -> String {
    FabfileBuilder::new()
        .rule("foo", &["bar"], &["echo 3"])
        .rule("bar", &["baz"], &["echo 2"])
        .rule("baz", &["qux"], &["echo 1"])
        .build()
}

/// `top` depends on `left` and `right`, which both depend on `base`.
pub fn diamond_fabfile() -> String {
    FabfileBuilder::new()
        .rule("top", &["left", "right"], &["echo top"])
        .rule("left", &["base"], &["echo left"])
        .rule("right", &["base"], &["echo right"])
        .rule("base", &[], &["echo base"])
        .build()
}
