//! The command primitive every plan is built from.
//!
//! A [`Command`] is a trusted program name plus untrusted arguments. The
//! arguments are only ever turned into shell text through [`quote`], which
//! is the single place shell-safety is decided.

use serde::{Deserialize, Serialize};

/// An ordered sequence of commands, executed strictly in order.
pub type Plan = Vec<Command>;

/// Characters that force an argument into single quotes.
const SHELL_METACHARACTERS: &[char] = &[
    ' ', '\t', '\n', '\'', '"', '$', '`', '\\', '|', '&', ';', '<', '>', '(', ')', '#', '~',
    '*', '?', '[', ']', '{', '}', '!',
];

/// An executable program with arguments and a human-readable description.
///
/// The description is shown to operators and written to logs, so it must
/// never carry secret material even when the arguments do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Command {
    program: String,
    args: Vec<String>,
    description: String,
}

impl Command {
    /// Create a command from a program, its arguments and a description.
    pub fn new<I, S>(program: &str, args: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            description: description.into(),
        }
    }

    /// Create a `bash -c <script>` command.
    pub fn bash(script: String, description: impl Into<String>) -> Self {
        Self::new("bash", ["-c".to_string(), script], description)
    }

    /// Program name (never quoted).
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, unquoted.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Human-readable annotation.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Render the command as a single shell-ready string.
    pub fn shell(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().map(|arg| quote(arg)));
        parts.join(" ")
    }
}

/// Trace each command description of a freshly built plan.
pub(crate) fn trace_plan(planner: &str, plan: &[Command]) {
    for (n, cmd) in plan.iter().enumerate() {
        log::trace!("{planner}: step {}: {}", n + 1, cmd.description());
    }
}

/// Quote `arg` so a POSIX shell evaluates it back to exactly `arg`.
///
/// Arguments free of metacharacters pass through unchanged. Everything else
/// is wrapped in single quotes, with embedded single quotes written as
/// `'\''`.
pub fn quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    if !arg.contains(SHELL_METACHARACTERS) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as Process;

    #[test]
    fn test_quote_known_values() {
        assert_eq!(quote(""), "''");
        assert_eq!(quote("simple"), "simple");
        assert_eq!(quote("needs space"), "'needs space'");
        assert_eq!(quote("d'quote"), r"'d'\''quote'");
        assert_eq!(quote("/dev/nvme0n1p2"), "/dev/nvme0n1p2");
        assert_eq!(quote("--index=1"), "--index=1");
        assert_eq!(quote("a|b"), "'a|b'");
        assert_eq!(quote("#root"), "'#root'");
        assert_eq!(quote("~"), "'~'");
        assert_eq!(quote("*.efi"), "'*.efi'");
        assert_eq!(quote("x86_64-efi"), "x86_64-efi");
    }

    #[test]
    fn test_hash_label_survives_shell() {
        let cmd = Command::new("printf", ["[%s]", "#root", "/dev/sda1"], "print label");
        let output = Process::new("sh")
            .args(["-c", &cmd.shell()])
            .output()
            .expect("sh should run");
        assert_eq!(String::from_utf8_lossy(&output.stdout), "[#root][/dev/sda1]");
    }

    #[test]
    fn test_quote_round_trips_through_sh() {
        let samples = [
            "",
            "plain",
            "with space",
            "it's",
            "''",
            "$(rm -rf /)",
            "`id`",
            "tab\there",
            "new\nline",
            "back\\slash",
            "semi;colon & amp | pipe",
            "<redir> (sub)",
            "\"double\"",
            "PARTUUID=$ROOT_UUID / ext4",
            "#root",
            "~root",
            "~",
            "*",
            "/*",
            "a?c",
            "[abc]",
            "{a,b}",
            "!!",
            "x#y",
        ];
        for sample in samples {
            // run from / so an unquoted glob would expand to real entries
            let script = format!("cd /; printf %s {}", quote(sample));
            let output = Process::new("sh")
                .args(["-c", &script])
                .output()
                .expect("sh should run");
            assert!(output.status.success(), "sh failed for {sample:?}");
            assert_eq!(String::from_utf8_lossy(&output.stdout), sample);
        }
    }

    #[test]
    fn test_shell_quotes_each_arg() {
        let cmd = Command::new(
            "sgdisk",
            ["-c", "1:EFI System", "/dev/sda"],
            "label partition 1",
        );
        assert_eq!(cmd.shell(), "sgdisk -c '1:EFI System' /dev/sda");
    }

    #[test]
    fn test_shell_without_args() {
        let cmd = Command::new("sync", Vec::<String>::new(), "flush");
        assert_eq!(cmd.shell(), "sync");
    }

    #[test]
    fn test_bash_wraps_script() {
        let cmd = Command::bash("echo hi | cat".to_string(), "say hi");
        assert_eq!(cmd.program(), "bash");
        assert_eq!(cmd.args(), ["-c", "echo hi | cat"]);
        assert_eq!(cmd.shell(), "bash -c 'echo hi | cat'");
    }

    #[test]
    fn test_serializes_with_pascal_case_fields() {
        let cmd = Command::new("mkdir", ["-p", "/mnt/efi"], "ensure ESP mount point exists");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"Program":"mkdir","Args":["-p","/mnt/efi"],"Description":"ensure ESP mount point exists"}"#
        );
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
