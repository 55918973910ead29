//! Structured-step shell renderer
//!
//! Compiled steps are structured values (program + argument list); this
//! module is the single place where they become shell text for the
//! elevation boundary. Every argument is quoted, and steps are joined
//! with a hard AND so the first non-zero exit aborts the rest of the
//! sequence.

use sealpatch_types::{CompiledStep, Invocation};

/// Quote one argument for POSIX sh. Wraps in single quotes and escapes
/// embedded single quotes, so no interpolation hazard survives.
#[must_use]
pub fn sh_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b'.' | b'-' | b'_' | b'='))
    {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Render a single invocation as a quoted command line.
#[must_use]
pub fn render_invocation(invocation: &Invocation) -> String {
    let mut line = sh_quote(&invocation.program);
    for arg in &invocation.args {
        line.push(' ');
        line.push_str(&sh_quote(arg));
    }
    line
}

/// Render a compiled sequence into the exact script handed to the
/// privileged boundary. Each step echoes its label first so the
/// captured output doubles as textual progress, matching the exit-code
/// semantics of the underlying utilities.
#[must_use]
pub fn render_script(steps: &[CompiledStep]) -> String {
    steps
        .iter()
        .map(|step| {
            format!(
                "echo {} && {}",
                sh_quote(&step.label),
                render_invocation(&step.invocation)
            )
        })
        .collect::<Vec<_>>()
        .join(" && ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealpatch_types::StepKind;

    #[test]
    fn plain_paths_are_left_unquoted() {
        assert_eq!(sh_quote("/System/Volumes/Update/mnt1"), "/System/Volumes/Update/mnt1");
        assert_eq!(sh_quote("--update-all"), "--update-all");
    }

    #[test]
    fn spaces_and_quotes_are_neutralized() {
        assert_eq!(sh_quote("My Kext.kext"), "'My Kext.kext'");
        assert_eq!(sh_quote("it's"), r"'it'\''s'");
        assert_eq!(sh_quote(""), "''");
    }

    #[test]
    fn injection_attempts_stay_inert() {
        let quoted = sh_quote("Foo.kext; rm -rf /");
        assert_eq!(quoted, "'Foo.kext; rm -rf /'");
    }

    #[test]
    fn script_joins_steps_with_hard_and() {
        let steps = vec![
            CompiledStep::new(
                StepKind::RebuildKernelCache,
                "Rebuilding kernel collections",
                Invocation::new("kmutil", ["create", "--volume-root", "/Volumes/m"]),
            ),
            CompiledStep::new(
                StepKind::SealSnapshot,
                "Sealing boot snapshot",
                Invocation::new("bless", ["--mount", "/Volumes/m", "--bootefi"]),
            ),
        ];

        let script = render_script(&steps);
        assert_eq!(
            script,
            "echo 'Rebuilding kernel collections' && kmutil create --volume-root /Volumes/m \
             && echo 'Sealing boot snapshot' && bless --mount /Volumes/m --bootefi"
        );
    }
}
