use std::fmt;

use super::combinators::is_quoted;

// ── AST types ──────────────────────────────────────────────────────────────

/// Which standard stream a redirection replaces.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum RedirectRole {
    /// `<file`: read stdin from file
    Input,
    /// `>file`: truncate-write stdout to file
    Output,
    /// `>>file`: append stdout to file
    AppendOutput,
}

impl RedirectRole {
    pub const ALL: [RedirectRole; 3] = [
        RedirectRole::Input,
        RedirectRole::Output,
        RedirectRole::AppendOutput,
    ];

    pub fn operator(self) -> &'static str {
        match self {
            RedirectRole::Input => "<",
            RedirectRole::Output => ">",
            RedirectRole::AppendOutput => ">>",
        }
    }
}

impl fmt::Display for RedirectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectRole::Input => write!(f, "input"),
            RedirectRole::Output => write!(f, "output"),
            RedirectRole::AppendOutput => write!(f, "append"),
        }
    }
}

/// At most one path per role. Setting a role twice keeps only the later path.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Redirections {
    input: Option<String>,
    output: Option<String>,
    append: Option<String>,
}

impl Redirections {
    fn slot(&mut self, role: RedirectRole) -> &mut Option<String> {
        match role {
            RedirectRole::Input => &mut self.input,
            RedirectRole::Output => &mut self.output,
            RedirectRole::AppendOutput => &mut self.append,
        }
    }

    /// Store `path` for `role`, handing back whatever it replaced.
    pub fn set(&mut self, role: RedirectRole, path: impl Into<String>) -> Option<String> {
        self.slot(role).replace(path.into())
    }

    pub fn get(&self, role: RedirectRole) -> Option<&str> {
        match role {
            RedirectRole::Input => self.input.as_deref(),
            RedirectRole::Output => self.output.as_deref(),
            RedirectRole::AppendOutput => self.append.as_deref(),
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none() && self.append.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RedirectRole, &str)> {
        RedirectRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|path| (role, path)))
    }
}

/// One command of a pipeline. A line is parsed into a chain of stages linked
/// through `next`; the line-level flags live on the first stage.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Stage {
    pub name: String,
    /// Argument vector; element 0 is always `name` for a non-empty stage.
    pub args: Vec<String>,
    pub redirects: Redirections,
    pub background: bool,
    pub auto_complete: bool,
    pub next: Option<Box<Stage>>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Stage {
            args: vec![name.clone()],
            name,
            ..Stage::default()
        }
    }

    /// An empty program name means there is nothing to run.
    pub fn is_noop(&self) -> bool {
        self.name.is_empty()
    }

    pub fn iter(&self) -> Stages<'_> {
        Stages { next: Some(self) }
    }

    /// Number of stages in the chain starting here (always ≥ 1).
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Human-readable dump of the whole chain, used by `SHELLAX_DEBUG`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let pad = "\t".repeat(depth);
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        out.push_str(&format!("{pad}Command: <{}>\n", self.name));
        out.push_str(&format!("{pad}\tIs Background: {}\n", yes_no(self.background)));
        out.push_str(&format!("{pad}\tNeeds Auto-complete: {}\n", yes_no(self.auto_complete)));
        out.push_str(&format!("{pad}\tRedirects:\n"));
        for role in RedirectRole::ALL {
            out.push_str(&format!(
                "{pad}\t\t{}: {}\n",
                role,
                self.redirects.get(role).unwrap_or("N/A")
            ));
        }
        out.push_str(&format!("{pad}\tArguments ({}):\n", self.args.len()));
        for (i, arg) in self.args.iter().enumerate() {
            out.push_str(&format!("{pad}\t\tArg {}: {}\n", i, arg));
        }
        if let Some(next) = &self.next {
            out.push_str(&format!("{pad}\tPiped to:\n"));
            next.dump_into(out, depth + 1);
        }
    }

    fn fmt_segment(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in self.args.iter().skip(1) {
            if needs_quoting(arg) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        for (role, path) in self.redirects.iter() {
            // A glued `>out&` at the end of a line would lose its `&`.
            if path.ends_with(['&', '?']) {
                write!(f, " {} \"{}\"", role.operator(), path)?;
            } else {
                write!(f, " {}{}", role.operator(), path)?;
            }
        }
        Ok(())
    }
}

/// Renders the chain back into a command line that parses to the same chain.
impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            stage.fmt_segment(f)?;
        }
        if self.auto_complete {
            f.write_str(" ?")?;
        } else if self.background {
            f.write_str(" &")?;
        }
        Ok(())
    }
}

/// An argument that would be read back as an operator, or lose its quotes,
/// gets wrapped in one extra layer of double quotes.
fn needs_quoting(arg: &str) -> bool {
    arg == "|"
        || arg == "&"
        || arg.starts_with(['<', '>'])
        || arg.ends_with(['&', '?'])
        || is_quoted(arg)
}

pub struct Stages<'a> {
    next: Option<&'a Stage>,
}

impl<'a> Iterator for Stages<'a> {
    type Item = &'a Stage;

    fn next(&mut self) -> Option<&'a Stage> {
        let current = self.next?;
        self.next = current.next.as_deref();
        Some(current)
    }
}
