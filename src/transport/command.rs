// ABOUTME: Typed remote command construction and shell quoting.
// ABOUTME: Operator-supplied values never reach the remote shell unquoted.

/// A remote command assembled from a program and discrete arguments.
/// Rendering quotes every part, so there is no interpolation surface for
/// operator input (repository URL, branch, release name).
#[derive(Debug, Clone)]
pub struct RemoteCommand {
    program: String,
    args: Vec<String>,
    sudo: bool,
}

impl RemoteCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            sudo: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Prefix the command with sudo. No-op when `enabled` is false, so call
    /// sites can pass `target.needs_sudo()` straight through.
    pub fn sudo(mut self, enabled: bool) -> Self {
        self.sudo = enabled;
        self
    }

    /// Render the single-quoted command line sent over the wire.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        if self.sudo {
            parts.push("sudo".to_string());
        }
        parts.push(shell_quote(&self.program));
        parts.extend(self.args.iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }
}

/// Output from a command execution, local or remote.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: u32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Single-quote a string for POSIX shells. Strings made only of safe
/// characters pass through unquoted to keep rendered commands readable.
pub fn shell_quote(s: &str) -> String {
    let safe = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '=' | ',' | '@')
    };
    if !s.is_empty() && s.chars().all(safe) {
        return s.to_string();
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}
